//! Observability events emitted at the coordinator boundary.
//!
//! Every outcome the bridge can reach ends up here, logged through `tracing`
//! and, when someone subscribed, forwarded on an unbounded channel.

use crate::channel::FailureReason;
use crate::model::InboundMessage;
use crate::translator::TranslationError;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// The peer accepted the dictionary.
    Delivered { tuples: usize },
    /// The send was attempted and not delivered. Never retried.
    DeliveryFailed { reason: FailureReason },
    /// A submitted value had the wrong type; nothing was sent.
    TranslationFailed { error: TranslationError },
    /// The form closed without a submission; nothing was sent.
    FormDismissed,
    /// The peer sent a message.
    MessageReceived { message: InboundMessage },
}

/// Receiving end of an [`EventSink`].
pub type EventStream = mpsc::UnboundedReceiver<BridgeEvent>;

#[derive(Debug, Clone, Default)]
pub struct EventSink {
    subscriber: Option<mpsc::UnboundedSender<BridgeEvent>>,
}

impl EventSink {
    /// A sink whose events are logged and also forwarded to the returned stream.
    pub fn new() -> (Self, EventStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                subscriber: Some(tx),
            },
            rx,
        )
    }

    /// A sink that only logs.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: BridgeEvent) {
        match &event {
            BridgeEvent::Delivered { tuples } => info!(tuples, "Message sent successfully"),
            BridgeEvent::DeliveryFailed { reason } => warn!(%reason, "Message failed"),
            BridgeEvent::TranslationFailed { error } => {
                warn!(%error, "Settings rejected, nothing sent")
            }
            BridgeEvent::FormDismissed => info!("Settings form dismissed"),
            BridgeEvent::MessageReceived { message } => {
                let payload = serde_json::to_string(message).unwrap_or_default();
                info!(tuples = message.len(), %payload, "Got message")
            }
        }
        if let Some(subscriber) = &self.subscriber {
            // A dropped stream only means nobody is listening any more.
            let _ = subscriber.send(event);
        }
    }
}
