use serde::Deserialize;
use serde::de::Error as DeError;

use crate::domain::{Money, ValidationError};

/// Money-like value returned by SignalBridge as either JSON string or JSON number.
///
/// For numbers, the raw JSON token is preserved so that `10.00` is parsed exactly
/// instead of going through `f64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMoney(String);

impl TransportMoney {
    pub fn into_money(self) -> Result<Money, ValidationError> {
        self.0.parse()
    }
}

impl<'de> Deserialize<'de> for TransportMoney {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: Box<serde_json::value::RawValue> = Deserialize::deserialize(deserializer)?;
        let token = raw.get();

        match token.as_bytes().first().copied() {
            Some(b'"') => {
                let parsed = serde_json::from_str::<String>(token).map_err(D::Error::custom)?;
                Ok(Self(parsed))
            }
            Some(b'-' | b'0'..=b'9') => Ok(Self(token.to_owned())),
            _ => Err(D::Error::custom(
                "expected money field to be JSON string or number",
            )),
        }
    }
}

/// Identifier returned as either JSON string or JSON integer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TransportId {
    String(String),
    Number(serde_json::Number),
}

impl TransportId {
    pub fn into_string(self) -> String {
        match self {
            Self::String(value) => value,
            Self::Number(value) => value.to_string(),
        }
    }
}

/// Count returned as either JSON integer or numeric string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportCount(pub u64);

impl<'de> Deserialize<'de> for TransportCount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            String(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Self(value)),
            Raw::String(value) => value
                .trim()
                .parse()
                .map(Self)
                .map_err(|_| D::Error::custom("expected a non-negative integer")),
        }
    }
}
