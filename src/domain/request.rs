use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::validation::ValidationError;
use crate::domain::value::{MessageText, RawPhoneNumber};

/// Default cap on the number of messages in one batch.
pub const MAX_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One outgoing SMS.
///
/// Built with [`Message::new`] and the consuming `with_*`/`schedule`/`as_test` methods;
/// immutable afterwards.
pub struct Message {
    recipient: RawPhoneNumber,
    body: MessageText,
    metadata: BTreeMap<String, String>,
    is_test: bool,
    scheduled_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(recipient: RawPhoneNumber, body: MessageText) -> Self {
        Self {
            recipient,
            body,
            metadata: BTreeMap::new(),
            is_test: false,
            scheduled_at: None,
        }
    }

    /// Validate raw strings and build a message in one step.
    pub fn try_new(
        recipient: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(RawPhoneNumber::new(recipient)?, MessageText::new(body)?))
    }

    /// Attach an opaque metadata entry passed through to the gateway.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Mark the message as a test send (not delivered, not billed).
    pub fn as_test(mut self, is_test: bool) -> Self {
        self.is_test = is_test;
        self
    }

    /// Ask the gateway to deliver at `at` instead of immediately.
    pub fn schedule(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    pub fn recipient(&self) -> &RawPhoneNumber {
        &self.recipient
    }

    pub fn body(&self) -> &MessageText {
        &self.body
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn is_test(&self) -> bool {
        self.is_test
    }

    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        self.scheduled_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Direction of a balance transaction (`type`).
pub enum TransactionKind {
    Debit,
    Credit,
    /// Any value this crate does not know, preserved verbatim.
    Other(String),
}

impl TransactionKind {
    /// Query/response field name used by SignalBridge (`type`).
    pub const FIELD: &'static str = "type";

    pub fn as_str(&self) -> &str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
            Self::Other(value) => value,
        }
    }

    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "debit" => Self::Debit,
            "credit" => Self::Credit,
            _ => Self::Other(value.to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Filters for the transaction history (`GET /balance/transactions`).
pub struct TransactionQuery {
    pub per_page: u32,
    pub page: u32,
    pub kind: Option<TransactionKind>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            per_page: 15,
            page: 1,
            kind: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl TransactionQuery {
    /// Check paging values before they reach the gateway.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page == 0 {
            return Err(ValidationError::InvalidPage { field: "page" });
        }
        if self.per_page == 0 {
            return Err(ValidationError::InvalidPage { field: "per_page" });
        }
        Ok(())
    }
}
