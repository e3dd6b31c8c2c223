//! Typed Rust client for the SignalBridge SMS gateway.
//!
//! The crate has three layers: `domain` holds validated types, segmentation and the
//! failure taxonomy; a private transport layer owns the JSON wire shapes; `client`
//! sends requests, classifies responses, and dispatches batches.
//!
//! ```rust,no_run
//! use signalbridge::{Message, SignalBridgeClient, SignalBridgeClientBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), signalbridge::SignalBridgeError> {
//!     let client: SignalBridgeClient = SignalBridgeClientBuilder::from_env()?.build()?;
//!
//!     let message = Message::try_new("256700000001", "Your code is 4821")?;
//!     let delivery = client.send_one(&message).await?;
//!     println!("{} {}", delivery.id.as_str(), delivery.status);
//!
//!     let batch = vec![
//!         Message::try_new("256700000001", "hello")?,
//!         Message::try_new("256700000002", "hello")?,
//!     ];
//!     let result = client.send_batch(&batch).await?;
//!     for (idx, failure) in result.failures() {
//!         eprintln!("message {idx} failed: {failure}");
//!     }
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    BASE_URL_ENV, HttpResponse, SignalBridgeClient, SignalBridgeClientBuilder, SignalBridgeError,
    TOKEN_ENV, classify, classify_batch_item,
};
pub use domain::{
    Acknowledgement, ApiToken, BalanceSnapshot, BalanceSummary, BatchResult, CostEstimate,
    Currency, Delivery, Encoding, Failure, FailureKind, FieldErrors, MAX_BATCH_SIZE,
    MAX_MESSAGE_LENGTH, Message, MessageId, MessageText, Money, PhoneNumber, RawPhoneNumber,
    Segmentation, SendOutcome, TokenInfo, Transaction, TransactionKind, TransactionPage,
    TransactionQuery, ValidationError, estimate_cost, segment,
};
