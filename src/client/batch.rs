use futures::stream::{self, StreamExt};

use super::{
    HttpMethod, SEND_BATCH_PATH, SignalBridgeClient, SignalBridgeError, classify_batch_item,
    protocol_error,
};
use crate::domain::{BatchResult, Failure, Message, SendOutcome, ValidationError};

const BATCH_FIELD: &str = "messages";

impl SignalBridgeClient {
    /// Send every message with [`SignalBridgeClient::send_one`] and collect the outcomes.
    ///
    /// Only an empty batch or one larger than `max_batch_size` fails as a whole, before any
    /// request is made. Individual failures are recorded in their slot and never abort the
    /// batch. `results()[i]` always belongs to `messages[i]`, also when
    /// `batch_concurrency` is above 1 and sends complete out of order.
    pub async fn send_batch(&self, messages: &[Message]) -> Result<BatchResult, SignalBridgeError> {
        self.check_batch(messages)?;

        let outcomes = if self.batch_concurrency <= 1 {
            let mut outcomes = Vec::with_capacity(messages.len());
            for message in messages {
                outcomes.push(self.send_outcome(message).await);
            }
            outcomes
        } else {
            let mut slots: Vec<Option<SendOutcome>> = vec![None; messages.len()];
            let finished: Vec<(usize, SendOutcome)> = stream::iter(messages.iter().enumerate())
                .map(|(idx, message)| async move { (idx, self.send_outcome(message).await) })
                .buffer_unordered(self.batch_concurrency)
                .collect()
                .await;

            for (idx, outcome) in finished {
                slots[idx] = Some(outcome);
            }
            fill_untried(slots)
        };

        Ok(finish(outcomes))
    }

    /// Submit all messages in one call to the gateway batch endpoint.
    ///
    /// Bodies over `max_message_length` are not sent; their slots hold a `Validation`
    /// failure. Rejected items are classified with [`classify_batch_item`]. A failure of the
    /// request itself is returned as the error of this call.
    pub async fn submit_batch(
        &self,
        messages: &[Message],
        is_test: bool,
    ) -> Result<BatchResult, SignalBridgeError> {
        self.check_batch(messages)?;

        let mut slots = Vec::with_capacity(messages.len());
        let mut accepted = Vec::with_capacity(messages.len());
        for message in messages {
            match self.check_length(message) {
                Ok(()) => {
                    accepted.push(message.clone());
                    slots.push(None);
                }
                Err(err) => slots.push(Some(SendOutcome::Failed(Failure::from(err)))),
            }
        }

        if !accepted.is_empty() {
            let payload = crate::transport::encode_batch(&accepted, is_test).map_err(protocol_error)?;
            let response = self
                .call(
                    HttpMethod::Post,
                    SEND_BATCH_PATH,
                    &[],
                    Some(payload),
                    Some(self.batch_timeout),
                )
                .await?;
            let items = crate::transport::decode_batch_results(&response.body, accepted.len())
                .map_err(protocol_error)?;

            let mut items = items.into_iter();
            for slot in slots.iter_mut().filter(|slot| slot.is_none()) {
                *slot = items.next().map(|item| match item {
                    Ok(delivery) => SendOutcome::Sent(delivery),
                    Err(raw) => SendOutcome::Failed(classify_batch_item(&raw)),
                });
            }
        }

        Ok(finish(fill_untried(slots)))
    }

    fn check_batch(&self, messages: &[Message]) -> Result<(), ValidationError> {
        if messages.is_empty() {
            return Err(ValidationError::Empty { field: BATCH_FIELD });
        }
        if messages.len() > self.max_batch_size {
            return Err(ValidationError::TooManyMessages {
                max: self.max_batch_size,
                actual: messages.len(),
            });
        }
        Ok(())
    }

    /// [`SignalBridgeClient::send_one`] with every error folded into a [`SendOutcome`].
    ///
    /// Protocol and configuration errors become `Generic` failures without a status code.
    pub async fn send_outcome(&self, message: &Message) -> SendOutcome {
        match self.send_one(message).await {
            Ok(delivery) => SendOutcome::Sent(delivery),
            Err(err) => SendOutcome::Failed(into_failure(err)),
        }
    }
}

/// Fold a single-call error into the per-item taxonomy.
fn into_failure(err: SignalBridgeError) -> Failure {
    match err {
        SignalBridgeError::Gateway(failure) => failure,
        SignalBridgeError::Validation(err) => Failure::from(err),
        other => Failure::Generic {
            message: other.to_string(),
            status_code: None,
        },
    }
}

fn fill_untried(slots: Vec<Option<SendOutcome>>) -> Vec<SendOutcome> {
    slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| SendOutcome::Failed(Failure::cancelled())))
        .collect()
}

fn finish(outcomes: Vec<SendOutcome>) -> BatchResult {
    let result = BatchResult::from_outcomes(outcomes);
    tracing::debug!(
        total = result.total(),
        successful = result.successful(),
        failed = result.failed(),
        "SignalBridge batch finished"
    );
    result
}
