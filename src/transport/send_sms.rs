use std::collections::BTreeMap;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use super::money::TransportId;
use super::{Envelope, TransportError};
use crate::domain::{Delivery, Message, MessageId};

#[derive(Debug, Clone, Serialize)]
pub(super) struct MessagePayload<'a> {
    recipient: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_test: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduled_at: Option<String>,
}

impl<'a> MessagePayload<'a> {
    pub(super) fn from_message(message: &'a Message) -> Self {
        Self {
            recipient: message.recipient().raw(),
            message: message.body().as_str(),
            metadata: Some(message.metadata()).filter(|it| !it.is_empty()),
            is_test: message.is_test(),
            scheduled_at: message
                .scheduled_at()
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct DeliveryJson {
    id: TransportId,
    status: String,
}

impl DeliveryJson {
    pub(super) fn into_delivery(self, message: Option<String>) -> Result<Delivery, TransportError> {
        Ok(Delivery {
            id: MessageId::new(self.id.into_string())?,
            status: self.status,
            message,
        })
    }
}

/// JSON body for `POST sms/send`. Absent optional fields are omitted, never sent as `null`.
pub fn encode_message(message: &Message) -> Result<serde_json::Value, TransportError> {
    Ok(serde_json::to_value(MessagePayload::from_message(message))?)
}

pub fn decode_delivery(json: &str) -> Result<Delivery, TransportError> {
    let parsed: Envelope<DeliveryJson> = serde_json::from_str(json)?;
    parsed.data.into_delivery(parsed.message)
}
