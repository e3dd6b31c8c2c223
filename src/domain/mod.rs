//! Domain layer: strong types with validation and invariants (no I/O).

mod outcome;
mod request;
mod response;
mod segment;
mod validation;
mod value;

pub use outcome::{BatchResult, Failure, FailureKind, FieldErrors, SendOutcome};
pub use request::{MAX_BATCH_SIZE, Message, TransactionKind, TransactionQuery};
pub use response::{
    Acknowledgement, BalanceSnapshot, BalanceSummary, Delivery, TokenInfo, Transaction,
    TransactionPage,
};
pub use segment::{
    CostEstimate, Encoding, MAX_MESSAGE_LENGTH, Segmentation, estimate_cost,
    estimate_cost_with_limit, segment, segment_text, segment_with_limit,
};
pub use validation::ValidationError;
pub use value::{ApiToken, Currency, MessageId, MessageText, Money, PhoneNumber, RawPhoneNumber};
