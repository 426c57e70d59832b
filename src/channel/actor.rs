//! # Channel Actor
//!
//! The server half of the message channel. It owns the inbound frame queue and
//! the single handler slot and processes requests sequentially in one task, so
//! the slot never needs a lock. The transport belongs to a separate outbound
//! task, so the two directions never wait on each other.

use super::client::ChannelClient;
use super::codec;
use super::error::{DeliveryOutcome, FailureReason};
use super::message::{ChannelRequest, MessageHandler, Response};
use super::transport::{Inbound, Transport};
use crate::model::SettingsDictionary;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Dependencies injected when the actor starts running.
///
/// Like any actor context this is late-bound: the actor and its client can be
/// created before the link to the companion exists.
pub struct ChannelContext<T: Transport> {
    pub transport: T,
    pub inbound: Inbound,
}

impl<T: Transport> ChannelContext<T> {
    pub fn new(transport: T, inbound: Inbound) -> Self {
        Self { transport, inbound }
    }
}

/// A frame that passed the local checks, waiting for the transport.
struct Outgoing {
    frame: Vec<u8>,
    tuples: usize,
    respond_to: Response<DeliveryOutcome>,
}

/// Delivers outbound dictionaries and dispatches inbound ones.
///
/// ## Operations
///
/// * **Send**:
///     1. Encodes the dictionary into one frame.
///     2. Rejects frames over the outbox size with `PayloadTooLarge`.
///     3. Queues the frame for the outbound task, which hands frames to the
///        transport one at a time in submission order.
///     4. The outbound task resolves the caller's receipt with the outcome.
///
/// * **SetHandler**: replaces the handler slot; the previous handler is dropped.
///
/// * **Inbound frame**: decodes it and calls the current handler once. Frames
///   that do not decode, or that arrive while no handler is installed, are
///   logged and dropped.
///
/// A transmit that never completes holds up later sends only. Inbound frames
/// and handler changes keep flowing.
pub struct ChannelActor {
    receiver: mpsc::Receiver<ChannelRequest>,
    handler: Option<MessageHandler>,
    outbox_size: usize,
}

impl ChannelActor {
    /// Creates a new `ChannelActor` and its associated `ChannelClient`.
    ///
    /// * `buffer_size` - capacity of the request queue.
    /// * `outbox_size` - largest encoded frame this side will hand to the transport.
    pub fn new(buffer_size: usize, outbox_size: usize) -> (Self, ChannelClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            handler: None,
            outbox_size,
        };
        (actor, ChannelClient::new(sender))
    }

    /// Runs the event loop until every client is dropped.
    ///
    /// Frames already queued for the transport are still transmitted after the
    /// loop exits; the outbound task ends once its queue is drained.
    pub async fn run<T: Transport>(mut self, context: ChannelContext<T>) {
        let ChannelContext {
            transport,
            mut inbound,
        } = context;
        let (outbox, queue) = mpsc::unbounded_channel();
        tokio::spawn(transmit_in_order(transport, queue));

        let mut inbound_open = true;
        info!(outbox_size = self.outbox_size, "Channel started");

        loop {
            tokio::select! {
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle_request(request, &outbox),
                    None => break,
                },
                frame = inbound.recv(), if inbound_open => match frame {
                    Some(frame) => self.dispatch(&frame),
                    None => {
                        info!("Inbound link closed");
                        inbound_open = false;
                    }
                },
            }
        }

        info!("Channel shutdown");
    }

    fn handle_request(
        &mut self,
        request: ChannelRequest,
        outbox: &mpsc::UnboundedSender<Outgoing>,
    ) {
        match request {
            ChannelRequest::Send { dict, respond_to } => {
                debug!(?dict, "Send");
                let tuples = dict.len();
                match self.prepare(&dict) {
                    Ok(frame) => {
                        let outgoing = Outgoing {
                            frame,
                            tuples,
                            respond_to,
                        };
                        // Only fails if the outbound task panicked.
                        if let Err(mpsc::error::SendError(outgoing)) = outbox.send(outgoing) {
                            let _ = outgoing
                                .respond_to
                                .send(DeliveryOutcome::Failed(FailureReason::ChannelClosed));
                        }
                    }
                    Err(reason) => {
                        warn!(tuples, %reason, "Delivery failed");
                        let _ = respond_to.send(DeliveryOutcome::Failed(reason));
                    }
                }
            }
            ChannelRequest::SetHandler {
                handler,
                respond_to,
            } => {
                let replaced = self.handler.replace(handler).is_some();
                debug!(replaced, "Handler installed");
                let _ = respond_to.send(());
            }
        }
    }

    /// Encodes `dict` and applies the outbox limit.
    fn prepare(&self, dict: &SettingsDictionary) -> Result<Vec<u8>, FailureReason> {
        let frame = codec::encode(dict.as_map())
            .map_err(|e| FailureReason::Encoding(e.to_string()))?;
        if frame.len() > self.outbox_size {
            return Err(FailureReason::PayloadTooLarge {
                size: frame.len(),
                max: self.outbox_size,
            });
        }
        Ok(frame)
    }

    fn dispatch(&self, frame: &[u8]) {
        let message = match codec::decode(frame) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, bytes = frame.len(), "Dropped malformed inbound frame");
                return;
            }
        };
        match &self.handler {
            Some(handler) => {
                debug!(tuples = message.len(), "Inbound message");
                handler(message);
            }
            None => warn!(tuples = message.len(), "No handler installed, inbound message dropped"),
        }
    }
}

/// Hands queued frames to the transport one at a time and resolves each receipt.
async fn transmit_in_order<T: Transport>(
    transport: T,
    mut queue: mpsc::UnboundedReceiver<Outgoing>,
) {
    while let Some(Outgoing {
        frame,
        tuples,
        respond_to,
    }) = queue.recv().await
    {
        let outcome: DeliveryOutcome = transport.transmit(frame).await.into();
        match &outcome {
            DeliveryOutcome::Delivered => info!(tuples, "Delivered"),
            DeliveryOutcome::Failed(reason) => warn!(tuples, %reason, "Delivery failed"),
        }
        let _ = respond_to.send(outcome);
    }
}
