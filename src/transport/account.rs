use serde::Deserialize;
use serde_json::{Map, Value};

use super::money::{TransportCount, TransportId, TransportMoney};
use super::{Envelope, TransportError};
use crate::domain::{
    Acknowledgement, BalanceSnapshot, BalanceSummary, Currency, TokenInfo, Transaction,
    TransactionKind, TransactionPage, TransactionQuery,
};

#[derive(Debug, Clone, Deserialize)]
struct BalanceJson {
    currency: String,
    balance: TransportMoney,
    credit_limit: TransportMoney,
    segment_price: TransportMoney,
}

#[derive(Debug, Clone, Deserialize)]
struct TransactionPageJson {
    data: Vec<TransactionJson>,
    current_page: TransportCount,
    last_page: TransportCount,
    #[serde(default)]
    per_page: Option<TransportCount>,
    #[serde(default)]
    total: Option<TransportCount>,
}

#[derive(Debug, Clone, Deserialize)]
struct TransactionJson {
    id: TransportId,
    #[serde(rename = "type")]
    kind: String,
    amount: TransportMoney,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TokenJson {
    id: TransportId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    abilities: Vec<String>,
    #[serde(default)]
    last_used_at: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AcknowledgementJson {
    #[serde(default)]
    message: Option<String>,
}

/// Query pairs for `GET balance/transactions`; unset filters are omitted.
pub fn encode_transaction_query(query: &TransactionQuery) -> Vec<(String, String)> {
    let mut params = vec![
        ("per_page".to_owned(), query.per_page.to_string()),
        ("page".to_owned(), query.page.to_string()),
    ];
    if let Some(kind) = query.kind.as_ref() {
        params.push((TransactionKind::FIELD.to_owned(), kind.as_str().to_owned()));
    }
    if let Some(start) = query.start_date {
        params.push(("start_date".to_owned(), start.format("%Y-%m-%d").to_string()));
    }
    if let Some(end) = query.end_date {
        params.push(("end_date".to_owned(), end.format("%Y-%m-%d").to_string()));
    }
    params
}

pub fn decode_balance(json: &str) -> Result<BalanceSnapshot, TransportError> {
    let parsed: Envelope<BalanceJson> = serde_json::from_str(json)?;
    let data = parsed.data;
    Ok(BalanceSnapshot {
        currency: Currency::new(data.currency)?,
        balance: data.balance.into_money()?,
        credit_limit: data.credit_limit.into_money()?,
        segment_price: data.segment_price.into_money()?,
    })
}

pub fn decode_balance_summary(json: &str) -> Result<BalanceSummary, TransportError> {
    let parsed: Envelope<Map<String, Value>> = serde_json::from_str(json)?;
    Ok(BalanceSummary::new(parsed.data))
}

pub fn decode_transactions(json: &str) -> Result<TransactionPage, TransportError> {
    let parsed: Envelope<TransactionPageJson> = serde_json::from_str(json)?;
    let page = parsed.data;

    let transactions = page
        .data
        .into_iter()
        .map(|txn| {
            Ok(Transaction {
                id: txn.id.into_string(),
                kind: TransactionKind::from_wire(&txn.kind),
                amount: txn.amount.into_money()?,
                description: txn.description,
                created_at: txn.created_at,
            })
        })
        .collect::<Result<Vec<_>, TransportError>>()?;

    Ok(TransactionPage {
        transactions,
        current_page: saturating_u32(page.current_page),
        last_page: saturating_u32(page.last_page),
        per_page: page.per_page.map(saturating_u32),
        total: page.total.map(|it| it.0),
    })
}

pub fn decode_tokens(json: &str) -> Result<Vec<TokenInfo>, TransportError> {
    let parsed: Envelope<Vec<TokenJson>> = serde_json::from_str(json)?;
    Ok(parsed
        .data
        .into_iter()
        .map(|token| TokenInfo {
            id: token.id.into_string(),
            name: token.name,
            abilities: token.abilities,
            last_used_at: token.last_used_at,
            created_at: token.created_at,
        })
        .collect())
}

/// Decode a payload-less `{success, message}` response.
pub fn decode_acknowledgement(json: &str) -> Result<Acknowledgement, TransportError> {
    let parsed: AcknowledgementJson = serde_json::from_str(json)?;
    Ok(Acknowledgement {
        message: parsed.message,
    })
}

fn saturating_u32(count: TransportCount) -> u32 {
    u32::try_from(count.0).unwrap_or(u32::MAX)
}
