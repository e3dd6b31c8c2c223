use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::send_sms::{DeliveryJson, MessagePayload};
use super::{Envelope, TransportError};
use crate::domain::{Delivery, Message};

#[derive(Debug, Clone, Serialize)]
struct BatchPayload<'a> {
    messages: Vec<MessagePayload<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_test: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct BatchJson {
    results: Vec<Value>,
}

/// JSON body for `POST sms/send-batch`.
pub fn encode_batch(messages: &[Message], is_test: bool) -> Result<Value, TransportError> {
    let payload = BatchPayload {
        messages: messages.iter().map(MessagePayload::from_message).collect(),
        is_test,
    };
    Ok(serde_json::to_value(payload)?)
}

/// Decode per-message results of the batch endpoint, in request order.
///
/// Accepted items become `Ok(Delivery)`; rejected items are returned as raw JSON so the
/// caller can classify them.
pub fn decode_batch_results(
    json: &str,
    expected: usize,
) -> Result<Vec<Result<Delivery, Value>>, TransportError> {
    let parsed: Envelope<BatchJson> = serde_json::from_str(json)?;
    let results = parsed.data.results;
    if results.len() != expected {
        return Err(TransportError::BatchLengthMismatch {
            expected,
            actual: results.len(),
        });
    }
    results.into_iter().map(decode_item).collect()
}

fn decode_item(item: Value) -> Result<Result<Delivery, Value>, TransportError> {
    let success = item.get("success").and_then(Value::as_bool);
    if success == Some(false) {
        return Ok(Err(item));
    }

    let message = item
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned);
    let payload = item
        .get("data")
        .filter(|data| data.is_object())
        .unwrap_or(&item);

    match DeliveryJson::deserialize(payload) {
        Ok(delivery) => Ok(Ok(delivery.into_delivery(message)?)),
        Err(_) if success.is_none() => Ok(Err(item)),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn encode_batch_wraps_message_payloads() {
        let messages = vec![
            Message::try_new("256700000001", "one").unwrap(),
            Message::try_new("256700000002", "two")
                .unwrap()
                .with_metadata("student_id", "bob"),
        ];
        let body = encode_batch(&messages, true).unwrap();
        assert_eq!(
            body,
            json!({
                "messages": [
                    {"recipient": "256700000001", "message": "one"},
                    {"recipient": "256700000002", "message": "two", "metadata": {"student_id": "bob"}}
                ],
                "is_test": true
            })
        );

        let body = encode_batch(&messages[..1], false).unwrap();
        assert!(body.get("is_test").is_none());
    }

    #[test]
    fn decode_mixed_results_preserves_order() {
        let json = r#"
        {
          "success": true,
          "data": {
            "total": 3,
            "successful": 2,
            "failed": 1,
            "results": [
              {"success": true, "data": {"id": 1, "status": "queued"}},
              {"success": false, "message": "Invalid recipient", "errors": {"recipient": ["bad"]}},
              {"id": "3", "status": "sent"}
            ]
          }
        }
        "#;

        let items = decode_batch_results(json, 3).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap().id.as_str(), "1");
        assert_eq!(
            items[1].as_ref().unwrap_err()["message"],
            json!("Invalid recipient")
        );
        assert_eq!(items[2].as_ref().unwrap().status, "sent");
    }

    #[test]
    fn decode_rejects_length_mismatch() {
        let json = r#"{"data": {"results": [{"id": 1, "status": "queued"}]}}"#;
        assert!(matches!(
            decode_batch_results(json, 2),
            Err(TransportError::BatchLengthMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn decode_flags_successful_item_without_id() {
        let json = r#"{"data": {"results": [{"success": true, "data": {"status": "queued"}}]}}"#;
        assert!(matches!(
            decode_batch_results(json, 1),
            Err(TransportError::Json(_))
        ));

        let json = r#"{"data": {"results": [{"message": "rejected"}]}}"#;
        let items = decode_batch_results(json, 1).unwrap();
        assert!(items[0].is_err());
    }
}
