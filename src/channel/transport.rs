//! # Transport Seam
//!
//! Everything below the message-channel abstraction (radio, pairing, encryption)
//! belongs to the host platform. The channel actor only needs something that can
//! push one encoded frame to the peer and say whether it got there; inbound
//! frames arrive separately on an mpsc receiver handed to the actor at `run`
//! time.
//!
//! [`InMemoryTransport`] and [`Peer`] form a loopback companion used by the demo
//! binary and the tests.

use super::codec;
use super::error::FailureReason;
use crate::model::InboundMessage;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::warn;

/// Inbox and outbox size a watch app opens its message channel with.
pub const DEFAULT_INBOX_SIZE: usize = 128;

/// Capacity of the peer → phone frame queue.
const INBOUND_QUEUE: usize = 32;

/// Receiving end of the peer → phone direction.
pub type Inbound = mpsc::Receiver<Vec<u8>>;

#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Pushes one encoded frame to the peer.
    async fn transmit(&self, frame: Vec<u8>) -> Result<(), FailureReason>;
}

#[derive(Debug)]
struct LinkState {
    connected: bool,
    busy: bool,
    inbox_size: usize,
}

fn lock(state: &Mutex<LinkState>) -> MutexGuard<'_, LinkState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Phone side of a loopback link.
#[derive(Debug, Clone)]
pub struct InMemoryTransport {
    to_peer: mpsc::UnboundedSender<Vec<u8>>,
    state: Arc<Mutex<LinkState>>,
}

/// Companion side of a loopback link.
#[derive(Debug)]
pub struct Peer {
    from_phone: mpsc::UnboundedReceiver<Vec<u8>>,
    to_phone: mpsc::Sender<Vec<u8>>,
    state: Arc<Mutex<LinkState>>,
}

impl InMemoryTransport {
    /// Creates a connected link whose peer accepts frames up to `inbox_size`.
    pub fn connect(inbox_size: usize) -> (InMemoryTransport, Peer, Inbound) {
        let (to_peer, from_phone) = mpsc::unbounded_channel();
        let (to_phone, inbound) = mpsc::channel(INBOUND_QUEUE);
        let state = Arc::new(Mutex::new(LinkState {
            connected: true,
            busy: false,
            inbox_size,
        }));

        let transport = InMemoryTransport {
            to_peer,
            state: state.clone(),
        };
        let peer = Peer {
            from_phone,
            to_phone,
            state,
        };
        (transport, peer, inbound)
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn transmit(&self, frame: Vec<u8>) -> Result<(), FailureReason> {
        let state = lock(&self.state);
        if !state.connected {
            return Err(FailureReason::NoPeer);
        }
        if state.busy {
            return Err(FailureReason::Busy);
        }
        if frame.len() > state.inbox_size {
            return Err(FailureReason::PayloadTooLarge {
                size: frame.len(),
                max: state.inbox_size,
            });
        }
        self.to_peer.send(frame).map_err(|_| FailureReason::NoPeer)
    }
}

impl Peer {
    /// Next dictionary delivered by the phone, or `None` once the link is gone.
    pub async fn recv(&mut self) -> Option<InboundMessage> {
        while let Some(frame) = self.from_phone.recv().await {
            match codec::decode(&frame) {
                Ok(message) => return Some(message),
                Err(e) => warn!(error = %e, "Peer dropped undecodable frame"),
            }
        }
        None
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<InboundMessage> {
        while let Ok(frame) = self.from_phone.try_recv() {
            match codec::decode(&frame) {
                Ok(message) => return Some(message),
                Err(e) => warn!(error = %e, "Peer dropped undecodable frame"),
            }
        }
        None
    }

    /// Sends a dictionary to the phone.
    pub async fn send(&self, message: &InboundMessage) -> Result<(), FailureReason> {
        let frame =
            codec::encode(message.as_map()).map_err(|e| FailureReason::Encoding(e.to_string()))?;
        self.send_frame(frame).await
    }

    /// Sends an already encoded (possibly malformed) frame to the phone.
    pub async fn send_frame(&self, frame: Vec<u8>) -> Result<(), FailureReason> {
        self.to_phone
            .send(frame)
            .await
            .map_err(|_| FailureReason::ChannelClosed)
    }

    pub fn set_connected(&self, connected: bool) {
        lock(&self.state).connected = connected;
    }

    pub fn set_busy(&self, busy: bool) {
        lock(&self.state).busy = busy;
    }

    pub fn set_inbox_size(&self, inbox_size: usize) {
        lock(&self.state).inbox_size = inbox_size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    #[tokio::test]
    async fn transmits_to_connected_peer() {
        let (transport, mut peer, _inbound) = InMemoryTransport::connect(DEFAULT_INBOX_SIZE);
        let frame = codec::encode(InboundMessage::new().with(1, 80).as_map()).unwrap();
        transport.transmit(frame).await.unwrap();
        assert_eq!(peer.recv().await.unwrap().get(1), Some(&Value::Int(80)));
    }

    #[tokio::test]
    async fn reports_link_state_failures() {
        let (transport, peer, _inbound) = InMemoryTransport::connect(8);

        assert_eq!(
            transport.transmit(vec![0; 9]).await,
            Err(FailureReason::PayloadTooLarge { size: 9, max: 8 })
        );

        peer.set_busy(true);
        assert_eq!(transport.transmit(vec![0]).await, Err(FailureReason::Busy));

        peer.set_connected(false);
        assert_eq!(transport.transmit(vec![0]).await, Err(FailureReason::NoPeer));
    }

    #[tokio::test]
    async fn dropped_peer_means_no_peer() {
        let (transport, peer, _inbound) = InMemoryTransport::connect(DEFAULT_INBOX_SIZE);
        drop(peer);
        assert_eq!(transport.transmit(vec![0]).await, Err(FailureReason::NoPeer));
    }

    #[tokio::test]
    async fn peer_frames_reach_inbound_queue() {
        let (_transport, peer, mut inbound) = InMemoryTransport::connect(DEFAULT_INBOX_SIZE);
        peer.send(&InboundMessage::new().with(3, "hello")).await.unwrap();
        let frame = inbound.recv().await.unwrap();
        assert_eq!(
            codec::decode(&frame).unwrap().get(3),
            Some(&Value::Str("hello".into()))
        );
    }
}
