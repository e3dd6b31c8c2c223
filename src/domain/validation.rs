use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    TooLong { field: &'static str, max: usize, actual: usize },
    TooManyMessages { max: usize, actual: usize },
    InvalidPhoneNumber { input: String },
    InvalidMoney { input: String },
    NegativePrice { price: String },
    InvalidPage { field: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::TooLong { field, max, actual } => {
                write!(f, "{field} is too long: {actual} characters (max {max})")
            }
            Self::TooManyMessages { max, actual } => {
                write!(f, "too many messages in batch: {actual} (max {max})")
            }
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::InvalidMoney { input } => write!(f, "invalid decimal amount: {input}"),
            Self::NegativePrice { price } => {
                write!(f, "price per segment must not be negative: {price}")
            }
            Self::InvalidPage { field } => write!(f, "{field} must be at least 1"),
        }
    }
}

impl ValidationError {
    /// Name of the offending field, when the error concerns a single field.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } | Self::InvalidPage { field } => {
                Some(*field)
            }
            _ => None,
        }
    }
}

impl std::error::Error for ValidationError {}
