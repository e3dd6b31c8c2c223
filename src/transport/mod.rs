//! Transport layer: JSON wire shapes (serialization/deserialization).

mod account;
mod batch;
mod money;
mod send_sms;

use serde::Deserialize;

use crate::domain::ValidationError;

pub use account::{
    decode_acknowledgement, decode_balance, decode_balance_summary, decode_tokens,
    decode_transactions, encode_transaction_query,
};
pub use batch::{decode_batch_results, encode_batch};
pub use send_sms::{decode_delivery, encode_message};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response has an invalid value: {0}")]
    InvalidValue(#[from] ValidationError),

    #[error("batch response has {actual} results for {expected} messages")]
    BatchLengthMismatch { expected: usize, actual: usize },
}

/// Standard `{success, message, data}` response wrapper.
#[derive(Debug, Clone, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    message: Option<String>,
    data: T,
}
