//! # Channel Client
//!
//! The handle the rest of the bridge uses to talk to the channel actor.

use super::error::{ChannelError, DeliveryOutcome, FailureReason};
use super::message::{ChannelRequest, MessageHandler};
use crate::model::{InboundMessage, SettingsDictionary};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// Future resolving to the [`DeliveryOutcome`] of one send.
///
/// The outcome is written by the channel actor after the transport answers, so
/// a receipt is never ready at the moment `send` returns. If the actor goes away
/// first the receipt resolves to `Failed(ChannelClosed)`.
#[derive(Debug)]
pub struct DeliveryReceipt {
    outcome: oneshot::Receiver<DeliveryOutcome>,
}

impl DeliveryReceipt {
    pub(crate) fn new(outcome: oneshot::Receiver<DeliveryOutcome>) -> Self {
        Self { outcome }
    }
}

impl Future for DeliveryReceipt {
    type Output = DeliveryOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.outcome)
            .poll(cx)
            .map(|r| r.unwrap_or(DeliveryOutcome::Failed(FailureReason::ChannelClosed)))
    }
}

/// Cheap, cloneable handle to a [`ChannelActor`](super::ChannelActor).
#[derive(Clone, Debug)]
pub struct ChannelClient {
    sender: mpsc::Sender<ChannelRequest>,
}

impl ChannelClient {
    pub fn new(sender: mpsc::Sender<ChannelRequest>) -> Self {
        Self { sender }
    }

    /// Enqueues `dict` for delivery and returns its receipt.
    #[instrument(skip_all, fields(tuples = dict.len()))]
    pub async fn send(&self, dict: SettingsDictionary) -> Result<DeliveryReceipt, ChannelError> {
        debug!(?dict, "Sending request");
        let (respond_to, outcome) = oneshot::channel();
        self.sender
            .send(ChannelRequest::Send { dict, respond_to })
            .await
            .map_err(|_| ChannelError::ActorClosed)?;
        Ok(DeliveryReceipt::new(outcome))
    }

    /// Replaces the inbound handler. Returns once the actor has installed it, so
    /// every message processed afterwards goes to the new handler.
    #[instrument(skip_all)]
    pub async fn set_handler(&self, handler: MessageHandler) -> Result<(), ChannelError> {
        let (respond_to, installed) = oneshot::channel();
        self.sender
            .send(ChannelRequest::SetHandler {
                handler,
                respond_to,
            })
            .await
            .map_err(|_| ChannelError::ActorClosed)?;
        installed.await.map_err(|_| ChannelError::ActorDropped)
    }

    /// Closure-friendly form of [`set_handler`](Self::set_handler).
    pub async fn on_receive<F>(&self, handler: F) -> Result<(), ChannelError>
    where
        F: Fn(InboundMessage) + Send + Sync + 'static,
    {
        self.set_handler(Box::new(handler)).await
    }
}
