use serde_json::{Map, Value};

use crate::domain::request::TransactionKind;
use crate::domain::value::{Currency, MessageId, Money};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Gateway acknowledgement of an accepted message.
pub struct Delivery {
    pub id: MessageId,
    /// Gateway status string (`queued`, `sent`, ...), preserved as-is.
    pub status: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub currency: Currency,
    pub balance: Money,
    pub credit_limit: Money,
    pub segment_price: Money,
}

#[derive(Debug, Clone, PartialEq)]
/// Account-wide balance summary.
///
/// The gateway does not publish a fixed schema for this endpoint, so the `data`
/// object is kept as returned.
pub struct BalanceSummary(Map<String, Value>);

impl BalanceSummary {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub amount: Money,
    pub description: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One page of transaction history.
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: Option<u32>,
    pub total: Option<u64>,
}

impl TransactionPage {
    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// API token registered for the account (`GET /tokens`).
pub struct TokenInfo {
    pub id: String,
    pub name: Option<String>,
    pub abilities: Vec<String>,
    pub last_used_at: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Success envelope without a payload worth typing.
pub struct Acknowledgement {
    pub message: Option<String>,
}
