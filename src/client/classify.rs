//! Maps HTTP exchanges onto the closed [`Failure`] taxonomy.
//!
//! Rules are checked in order and the first match wins:
//! 1. transport failure → `ServiceUnavailable`
//! 2. `402`, an insufficient-balance code, or a `balance` field error → `InsufficientBalance`
//! 3. `422` or any field-level `errors` → `Validation`
//! 4. `401`/`403` or a no-client code → `NoClient`
//! 5. `5xx` → `ServiceUnavailable`
//! 6. `2xx` → accepted
//! 7. anything else → `Generic`

use std::error::Error as StdError;

use serde_json::Value;

use crate::domain::{Failure, FieldErrors, Money};

const INSUFFICIENT_BALANCE_CODES: &[&str] = &["insufficient_balance", "insufficient_funds"];
const NO_CLIENT_CODES: &[&str] = &["no_client", "unauthorized", "unauthenticated"];

const DEFAULT_INSUFFICIENT_BALANCE: &str = "Insufficient balance";
const DEFAULT_VALIDATION: &str = "Validation error";
const DEFAULT_NO_CLIENT: &str = "No client associated with your account";
const DEFAULT_UNAVAILABLE: &str = "SMS service is currently unavailable";
const DEFAULT_GENERIC: &str = "SignalBridge API error";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raw HTTP response: status code and body text, whatever the status.
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body parsed as JSON, or `None` when it is empty or not JSON.
    pub fn json(&self) -> Option<Value> {
        if self.body.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.body).ok()
    }
}

/// Classify the result of one HTTP exchange.
///
/// `Ok(())` means the gateway accepted the request (2xx without field errors); every other
/// combination of transport failure, status, and body maps to exactly one [`Failure`].
/// The function is pure: identical inputs always give identical outputs.
pub fn classify(
    exchange: Result<&HttpResponse, &(dyn StdError + Send + Sync)>,
) -> Result<(), Failure> {
    let response = match exchange {
        Ok(response) => response,
        Err(err) => return Err(transport_failure(err)),
    };

    let status = response.status;
    let json = response.json();
    let body = json.as_ref();
    let code = body_code(body);
    let code = code.as_deref();

    if status == 402
        || code.is_some_and(|it| INSUFFICIENT_BALANCE_CODES.contains(&it))
        || errors_mention(body, "balance")
    {
        return Err(insufficient_balance(body));
    }

    let errors = field_errors(body, status == 422);
    if status == 422 || !errors.is_empty() {
        return Err(Failure::Validation {
            message: body_message(body).unwrap_or_else(|| DEFAULT_VALIDATION.to_owned()),
            errors,
        });
    }

    if matches!(status, 401 | 403) || code.is_some_and(|it| NO_CLIENT_CODES.contains(&it)) {
        return Err(Failure::NoClient {
            message: body_message(body).unwrap_or_else(|| DEFAULT_NO_CLIENT.to_owned()),
        });
    }

    if status >= 500 {
        return Err(Failure::ServiceUnavailable {
            message: body_message(body).unwrap_or_else(|| DEFAULT_UNAVAILABLE.to_owned()),
        });
    }

    if (200..=299).contains(&status) {
        return Ok(());
    }

    Err(Failure::Generic {
        message: body_message(body).unwrap_or_else(|| raw_or_default(&response.body)),
        status_code: Some(status),
    })
}

/// DNS, TLS, connect, and timeout errors: the request may never have reached the gateway.
pub(crate) fn transport_failure(err: &(dyn StdError + Send + Sync)) -> Failure {
    Failure::ServiceUnavailable {
        message: err.to_string(),
    }
}

/// Classify a rejected item of a gateway batch response, which carries no HTTP status.
pub fn classify_batch_item(item: &Value) -> Failure {
    let body = Some(item);
    let code = body_code(body);
    let code = code.as_deref();

    if code.is_some_and(|it| INSUFFICIENT_BALANCE_CODES.contains(&it))
        || errors_mention(body, "balance")
    {
        return insufficient_balance(body);
    }

    let errors = field_errors(body, false);
    if !errors.is_empty() {
        return Failure::Validation {
            message: body_message(body).unwrap_or_else(|| DEFAULT_VALIDATION.to_owned()),
            errors,
        };
    }

    if code.is_some_and(|it| NO_CLIENT_CODES.contains(&it)) {
        return Failure::NoClient {
            message: body_message(body).unwrap_or_else(|| DEFAULT_NO_CLIENT.to_owned()),
        };
    }

    Failure::Generic {
        message: body_message(body).unwrap_or_else(|| DEFAULT_GENERIC.to_owned()),
        status_code: None,
    }
}

fn insufficient_balance(body: Option<&Value>) -> Failure {
    Failure::InsufficientBalance {
        message: body_message(body).unwrap_or_else(|| DEFAULT_INSUFFICIENT_BALANCE.to_owned()),
        current_balance: lookup(body, "current_balance").and_then(value_money),
        required_balance: lookup(body, "required_balance").and_then(value_money),
        segments: lookup(body, "segments").and_then(value_count),
    }
}

/// Field from `body.data`, falling back to the top level of `body`.
fn lookup<'a>(body: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    let body = body?;
    body.get("data")
        .and_then(|data| data.get(key))
        .or_else(|| body.get(key))
        .filter(|value| !value.is_null())
}

fn body_message(body: Option<&Value>) -> Option<String> {
    body?
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|it| !it.is_empty())
        .map(str::to_owned)
}

fn body_code(body: Option<&Value>) -> Option<String> {
    let body = body?;
    ["code", "error_code"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(|code| code.trim().to_ascii_lowercase())
}

fn errors_mention(body: Option<&Value>, field: &str) -> bool {
    body.and_then(|it| it.get("errors"))
        .and_then(Value::as_object)
        .is_some_and(|errors| errors.contains_key(field))
}

/// Field-level errors from `errors`. A bare string or array has no field, so it is only
/// collected (under `errors`) when the status already says validation.
fn field_errors(body: Option<&Value>, unkeyed: bool) -> FieldErrors {
    let mut errors = FieldErrors::new();
    match body.and_then(|it| it.get("errors")) {
        Some(Value::Object(fields)) => {
            for (field, messages) in fields {
                errors.push(field.as_str(), messages_of(messages));
            }
        }
        Some(Value::Array(items)) if unkeyed && !items.is_empty() => {
            errors.push("errors", items.iter().map(text_of).collect());
        }
        Some(Value::String(message)) if unkeyed && !message.trim().is_empty() => {
            errors.push("errors", vec![message.clone()]);
        }
        _ => {}
    }
    errors
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(text_of).collect(),
        Value::Null => Vec::new(),
        other => vec![text_of(other)],
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn value_money(value: &Value) -> Option<Money> {
    match value {
        Value::String(text) => text.parse().ok(),
        Value::Number(number) => number.to_string().parse().ok(),
        _ => None,
    }
}

fn value_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|it| u32::try_from(it).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn raw_or_default(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_GENERIC.to_owned()
    } else {
        trimmed.to_owned()
    }
}
