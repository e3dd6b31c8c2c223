use crate::domain::response::Delivery;
use crate::domain::validation::ValidationError;
use crate::domain::value::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Closed set of failure causes a gateway call can end in.
pub enum FailureKind {
    ServiceUnavailable,
    InsufficientBalance,
    Validation,
    NoClient,
    Generic,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Field-level validation messages in the order the gateway reported them.
pub struct FieldErrors(Vec<(String, Vec<String>)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for a single field with a single message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, vec![message.into()]);
        errors
    }

    /// Append messages for `field`, merging with an earlier entry of the same name.
    pub fn push(&mut self, field: impl Into<String>, messages: Vec<String>) {
        let field = field.into();
        match self.0.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => existing.extend(messages),
            None => self.0.push((field, messages)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    /// First field and its first message.
    pub fn first(&self) -> Option<(&str, &str)> {
        self.0.iter().find_map(|(field, messages)| {
            messages
                .first()
                .map(|message| (field.as_str(), message.as_str()))
        })
    }

    /// First message of the first field, e.g. for a one-line error banner.
    pub fn first_error(&self) -> Option<&str> {
        self.first().map(|(_, message)| message)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// A classified gateway failure with its structured payload.
pub enum Failure {
    /// Transport failure (DNS, TLS, timeout, refused connection) or a 5xx response.
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// The account cannot cover the send. Amounts are `None` when the gateway omitted them.
    #[error("insufficient balance: {message}")]
    InsufficientBalance {
        message: String,
        current_balance: Option<Money>,
        required_balance: Option<Money>,
        segments: Option<u32>,
    },

    /// The gateway rejected one or more fields.
    #[error("validation failed: {message}")]
    Validation { message: String, errors: FieldErrors },

    /// Credentials are unknown or not linked to a client account.
    #[error("no client: {message}")]
    NoClient { message: String },

    /// Anything else; `status_code` is `None` for failures that never reached HTTP.
    #[error("gateway error (status {status_code:?}): {message}")]
    Generic {
        message: String,
        status_code: Option<u16>,
    },
}

impl Failure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ServiceUnavailable { .. } => FailureKind::ServiceUnavailable,
            Self::InsufficientBalance { .. } => FailureKind::InsufficientBalance,
            Self::Validation { .. } => FailureKind::Validation,
            Self::NoClient { .. } => FailureKind::NoClient,
            Self::Generic { .. } => FailureKind::Generic,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::ServiceUnavailable { message }
            | Self::InsufficientBalance { message, .. }
            | Self::Validation { message, .. }
            | Self::NoClient { message }
            | Self::Generic { message, .. } => message.as_str(),
        }
    }

    /// Whether repeating the same call later may succeed without caller action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }

    /// Placeholder for batch items a caller chose not to send.
    pub fn cancelled() -> Self {
        Self::Generic {
            message: "cancelled".to_owned(),
            status_code: None,
        }
    }

    /// Validation errors, if this is a [`Failure::Validation`].
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationError> for Failure {
    /// Local precondition failures are reported like gateway-side validation.
    fn from(value: ValidationError) -> Self {
        let message = value.to_string();
        let field = value.field().unwrap_or("message");
        Self::Validation {
            errors: FieldErrors::single(field, message.clone()),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of one message send.
pub enum SendOutcome {
    Sent(Delivery),
    Failed(Failure),
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Sent(_))
    }

    /// Failure kind, or `None` for a successful send.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Sent(_) => None,
            Self::Failed(failure) => Some(failure.kind()),
        }
    }

    pub fn delivery(&self) -> Option<&Delivery> {
        match self {
            Self::Sent(delivery) => Some(delivery),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Sent(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<Delivery, Failure> {
        match self {
            Self::Sent(delivery) => Ok(delivery),
            Self::Failed(failure) => Err(failure),
        }
    }
}

impl From<Result<Delivery, Failure>> for SendOutcome {
    fn from(value: Result<Delivery, Failure>) -> Self {
        match value {
            Ok(delivery) => Self::Sent(delivery),
            Err(failure) => Self::Failed(failure),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Aggregated outcome of a batch.
///
/// Invariant: `results[i]` belongs to input message `i`, and
/// `total == results.len() == successful + failed`.
pub struct BatchResult {
    successful: usize,
    failed: usize,
    results: Vec<SendOutcome>,
}

impl BatchResult {
    /// Build a result from per-message outcomes, deriving the counters.
    pub fn from_outcomes(results: Vec<SendOutcome>) -> Self {
        let successful = results.iter().filter(|it| it.is_success()).count();
        Self {
            failed: results.len() - successful,
            successful,
            results,
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn successful(&self) -> usize {
        self.successful
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn results(&self) -> &[SendOutcome] {
        &self.results
    }

    pub fn into_results(self) -> Vec<SendOutcome> {
        self.results
    }

    /// Index and failure of every message that did not go through.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &Failure)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(idx, outcome)| outcome.failure().map(|failure| (idx, failure)))
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
