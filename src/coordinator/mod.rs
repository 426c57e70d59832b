//! # Coordinator
//!
//! Wires the two external event sources to the translator and the channel.
//!
//! ```text
//! form closed (R) ──► translate(R) ──► send(D) ──► Delivered | DeliveryFailed
//!                          └──────────► TranslationFailed
//! message arrived (P) ─────────────────────────► MessageReceived
//! ```
//!
//! The coordinator keeps no state besides its collaborators. Each form
//! submission walks `Idle → Translating → Sending → {Delivered, Failed}` (or
//! stops at `TranslationFailed`) independently of every other one. Exactly one
//! send is issued per submission; failures are reported, never retried. Several
//! sends may be in flight at once.

pub mod events;

pub use events::*;

use crate::channel::{ChannelError, DeliveryOutcome, FailureReason, MessageChannel};
use crate::model::{InboundMessage, RawResponse};
use crate::translator::{SettingsTranslator, TranslationError};
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

/// What became of one form submission.
#[derive(Debug)]
pub enum Submission {
    /// The form closed without a response.
    Dismissed,
    /// Translation failed; no send was issued.
    Rejected(TranslationError),
    /// One send was issued; its outcome is pending.
    InFlight(PendingDelivery),
}

impl Submission {
    /// Waits for the delivery outcome, if a send was issued.
    pub async fn outcome(self) -> Option<DeliveryOutcome> {
        match self {
            Submission::InFlight(pending) => Some(pending.outcome().await),
            _ => None,
        }
    }
}

/// Handle to a delivery whose outcome is being awaited in the background.
///
/// The matching event is emitted whether or not this handle is awaited.
#[derive(Debug)]
pub struct PendingDelivery {
    inner: Pending,
}

#[derive(Debug)]
enum Pending {
    Task(JoinHandle<DeliveryOutcome>),
    Ready(DeliveryOutcome),
}

impl PendingDelivery {
    pub async fn outcome(self) -> DeliveryOutcome {
        match self.inner {
            Pending::Task(handle) => handle
                .await
                .unwrap_or(DeliveryOutcome::Failed(FailureReason::ChannelClosed)),
            Pending::Ready(outcome) => outcome,
        }
    }
}

#[derive(Clone)]
pub struct Coordinator<C: MessageChannel> {
    translator: SettingsTranslator,
    channel: C,
    events: EventSink,
}

impl<C: MessageChannel> Coordinator<C> {
    pub fn new(translator: SettingsTranslator, channel: C, events: EventSink) -> Self {
        Self {
            translator,
            channel,
            events,
        }
    }

    /// Installs the coordinator as the channel's inbound handler.
    pub async fn attach(&self) -> Result<(), ChannelError> {
        let events = self.events.clone();
        self.channel
            .set_handler(Box::new(move |message| report(&events, message)))
            .await
    }

    /// Handles the serialized response of a closed settings form.
    #[instrument(skip_all)]
    pub async fn form_response(&self, response: &str) -> Submission {
        match RawResponse::parse(response) {
            Ok(Some(raw)) => self.form_closed(raw).await,
            Ok(None) => {
                self.events.emit(BridgeEvent::FormDismissed);
                Submission::Dismissed
            }
            Err(e) => self.reject(TranslationError::from(e)),
        }
    }

    /// Handles a closed settings form: translate, then send once.
    #[instrument(skip_all)]
    pub async fn form_closed(&self, raw: RawResponse) -> Submission {
        debug!(phase = "translating", raw = %raw.as_json(), "Form closed");
        let dict = match self.translator.translate(&raw) {
            Ok(dict) => dict,
            Err(error) => return self.reject(error),
        };

        let tuples = dict.len();
        debug!(phase = "sending", tuples, "Settings translated");
        let receipt = match self.channel.send(dict).await {
            Ok(receipt) => receipt,
            Err(e) => {
                debug!(error = %e, "Channel unavailable");
                let reason = FailureReason::ChannelClosed;
                self.events.emit(BridgeEvent::DeliveryFailed {
                    reason: reason.clone(),
                });
                return Submission::InFlight(PendingDelivery {
                    inner: Pending::Ready(DeliveryOutcome::Failed(reason)),
                });
            }
        };

        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            let outcome = receipt.await;
            match &outcome {
                DeliveryOutcome::Delivered => events.emit(BridgeEvent::Delivered { tuples }),
                DeliveryOutcome::Failed(reason) => events.emit(BridgeEvent::DeliveryFailed {
                    reason: reason.clone(),
                }),
            }
            outcome
        });

        Submission::InFlight(PendingDelivery {
            inner: Pending::Task(handle),
        })
    }

    /// Reports a message from the peer. No validation, no further processing.
    pub fn message_arrived(&self, message: InboundMessage) {
        report(&self.events, message);
    }

    fn reject(&self, error: TranslationError) -> Submission {
        self.events.emit(BridgeEvent::TranslationFailed {
            error: error.clone(),
        });
        Submission::Rejected(error)
    }
}

fn report(events: &EventSink, message: InboundMessage) {
    events.emit(BridgeEvent::MessageReceived { message });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mock::{create_mock_channel, expect_send, MockChannel};
    use crate::model::{KeyEntry, KeySchema, Value, ValueType};
    use serde_json::json;
    use std::sync::Arc;

    fn translator() -> SettingsTranslator {
        SettingsTranslator::new(Arc::new(
            KeySchema::new(vec![
                KeyEntry::new("brightness", 1, ValueType::Int),
                KeyEntry::new("name", 2, ValueType::String),
            ])
            .unwrap(),
        ))
    }

    #[tokio::test]
    async fn delivered_submission_emits_delivered() {
        let mut mock = MockChannel::new();
        mock.expect_send().return_delivered();
        let (events, mut stream) = EventSink::new();
        let coordinator = Coordinator::new(translator(), mock.client(), events);

        let outcome = coordinator
            .form_closed(RawResponse::new(json!({"brightness": 80})))
            .await
            .outcome()
            .await;

        assert_eq!(outcome, Some(DeliveryOutcome::Delivered));
        assert_eq!(stream.recv().await, Some(BridgeEvent::Delivered { tuples: 1 }));
        assert_eq!(mock.sent()[0].get(1), Some(&Value::Int(80)));
        mock.verify();
    }

    #[tokio::test]
    async fn translation_failure_skips_send() {
        let mock = MockChannel::new();
        let (events, mut stream) = EventSink::new();
        let coordinator = Coordinator::new(translator(), mock.client(), events);

        let submission = coordinator
            .form_closed(RawResponse::new(json!({"brightness": "high"})))
            .await;

        assert!(matches!(submission, Submission::Rejected(_)));
        assert!(matches!(
            stream.recv().await,
            Some(BridgeEvent::TranslationFailed { .. })
        ));
        assert_eq!(mock.send_count(), 0);
    }

    #[tokio::test]
    async fn too_large_is_reported_once_without_retry() {
        let mut mock = MockChannel::new();
        let too_large = FailureReason::PayloadTooLarge { size: 300, max: 128 };
        mock.expect_send().return_failed(too_large.clone());
        let (events, mut stream) = EventSink::new();
        let coordinator = Coordinator::new(translator(), mock.client(), events);

        let outcome = coordinator
            .form_closed(RawResponse::new(json!({"brightness": 1})))
            .await
            .outcome()
            .await;

        assert_eq!(outcome, Some(DeliveryOutcome::Failed(too_large.clone())));
        assert_eq!(
            stream.recv().await,
            Some(BridgeEvent::DeliveryFailed { reason: too_large })
        );
        assert_eq!(mock.send_count(), 1);
        mock.verify();
    }

    #[tokio::test]
    async fn outcome_is_not_known_when_form_closed_returns() {
        let (client, mut receiver) = create_mock_channel(4);
        let (events, mut stream) = EventSink::new();
        let coordinator = Coordinator::new(translator(), client, events);

        let submission = coordinator
            .form_closed(RawResponse::new(json!({"name": "Ada"})))
            .await;
        let (dict, responder) = expect_send(&mut receiver).await.unwrap();
        assert_eq!(dict.get(2), Some(&Value::Str("Ada".into())));

        // Nothing is reported until the channel answers.
        assert!(stream.try_recv().is_err());
        responder.send(DeliveryOutcome::Delivered).unwrap();

        assert_eq!(submission.outcome().await, Some(DeliveryOutcome::Delivered));
        assert_eq!(stream.recv().await, Some(BridgeEvent::Delivered { tuples: 1 }));
    }

    #[tokio::test]
    async fn every_submission_sends_exactly_once() {
        let mut mock = MockChannel::new();
        for n in 0..5 {
            if n % 2 == 0 {
                mock.expect_send().return_delivered();
            } else {
                mock.expect_send().return_failed(FailureReason::Busy);
            }
        }
        let (events, mut stream) = EventSink::new();
        let coordinator = Coordinator::new(translator(), mock.client(), events);

        for n in 0..5 {
            coordinator
                .form_closed(RawResponse::new(json!({"brightness": n})))
                .await
                .outcome()
                .await;
        }

        let mut outcomes = Vec::new();
        for _ in 0..5 {
            outcomes.push(stream.recv().await.unwrap());
        }
        assert_eq!(
            outcomes
                .iter()
                .filter(|e| matches!(e, BridgeEvent::Delivered { .. }))
                .count(),
            3
        );
        assert_eq!(
            outcomes
                .iter()
                .filter(|e| matches!(e, BridgeEvent::DeliveryFailed { .. }))
                .count(),
            2
        );
        assert!(stream.try_recv().is_err());
        assert_eq!(mock.send_count(), 5);
        let sent: Vec<_> = mock.sent().iter().map(|d| d.get(1).cloned()).collect();
        assert_eq!(sent, (0..5).map(|n| Some(Value::Int(n))).collect::<Vec<_>>());
        mock.verify();
    }

    #[tokio::test]
    async fn concurrent_submissions_resolve_independently() {
        let (client, mut receiver) = create_mock_channel(4);
        let (events, mut stream) = EventSink::new();
        let coordinator = Coordinator::new(translator(), client, events);

        let first = coordinator
            .form_closed(RawResponse::new(json!({"brightness": 1})))
            .await;
        let second = coordinator
            .form_closed(RawResponse::new(json!({"name": "Ada"})))
            .await;

        let (first_dict, first_responder) = expect_send(&mut receiver).await.unwrap();
        let (second_dict, second_responder) = expect_send(&mut receiver).await.unwrap();
        assert_eq!(first_dict.get(1), Some(&Value::Int(1)));
        assert_eq!(second_dict.get(2), Some(&Value::Str("Ada".into())));

        // Answer out of order.
        second_responder
            .send(DeliveryOutcome::Failed(FailureReason::Busy))
            .unwrap();
        assert_eq!(
            second.outcome().await,
            Some(DeliveryOutcome::Failed(FailureReason::Busy))
        );
        assert_eq!(
            stream.recv().await,
            Some(BridgeEvent::DeliveryFailed {
                reason: FailureReason::Busy
            })
        );

        first_responder.send(DeliveryOutcome::Delivered).unwrap();
        assert_eq!(first.outcome().await, Some(DeliveryOutcome::Delivered));
        assert_eq!(stream.recv().await, Some(BridgeEvent::Delivered { tuples: 1 }));

        // No retry of the failed one, nothing else queued.
        assert!(receiver.try_recv().is_err());
        assert!(stream.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_channel_is_a_delivery_failure() {
        let (client, receiver) = create_mock_channel(4);
        drop(receiver);
        let (events, mut stream) = EventSink::new();
        let coordinator = Coordinator::new(translator(), client, events);

        let outcome = coordinator
            .form_closed(RawResponse::new(json!({"brightness": 3})))
            .await
            .outcome()
            .await;

        assert_eq!(
            outcome,
            Some(DeliveryOutcome::Failed(FailureReason::ChannelClosed))
        );
        assert_eq!(
            stream.recv().await,
            Some(BridgeEvent::DeliveryFailed {
                reason: FailureReason::ChannelClosed
            })
        );
    }

    #[tokio::test]
    async fn blank_and_malformed_responses() {
        let mock = MockChannel::new();
        let (events, mut stream) = EventSink::new();
        let coordinator = Coordinator::new(translator(), mock.client(), events);

        assert!(matches!(
            coordinator.form_response("").await,
            Submission::Dismissed
        ));
        assert_eq!(stream.recv().await, Some(BridgeEvent::FormDismissed));

        assert!(matches!(
            coordinator.form_response("{not json").await,
            Submission::Rejected(TranslationError::MalformedResponse(_))
        ));
        assert!(matches!(
            stream.recv().await,
            Some(BridgeEvent::TranslationFailed { .. })
        ));
        assert_eq!(mock.send_count(), 0);
    }

    #[tokio::test]
    async fn attached_coordinator_reports_inbound_messages() {
        let mock = MockChannel::new();
        let (events, mut stream) = EventSink::new();
        let coordinator = Coordinator::new(translator(), mock.client(), events);
        coordinator.attach().await.unwrap();

        // Keys unknown to the schema are reported as-is.
        let message = InboundMessage::new().with(999, "hello");
        assert!(mock.deliver(message.clone()));
        assert_eq!(
            stream.recv().await,
            Some(BridgeEvent::MessageReceived { message })
        );
    }
}
