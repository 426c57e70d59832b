//! # Channel Messages
//!
//! Requests sent from a [`ChannelClient`](crate::channel::ChannelClient) to the
//! [`ChannelActor`](crate::channel::ChannelActor).

use super::error::DeliveryOutcome;
use crate::model::{InboundMessage, SettingsDictionary};
use std::fmt;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<T>;

/// The single inbound handler slot. Invoked once per arriving message.
pub type MessageHandler = Box<dyn Fn(InboundMessage) + Send + Sync>;

pub enum ChannelRequest {
    /// Deliver a dictionary to the peer; the outcome is reported later.
    Send {
        dict: SettingsDictionary,
        respond_to: Response<DeliveryOutcome>,
    },
    /// Replace the current inbound handler.
    SetHandler {
        handler: MessageHandler,
        respond_to: Response<()>,
    },
}

impl fmt::Debug for ChannelRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRequest::Send { dict, .. } => f.debug_struct("Send").field("dict", dict).finish(),
            ChannelRequest::SetHandler { .. } => f.write_str("SetHandler"),
        }
    }
}
