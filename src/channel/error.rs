//! # Channel Errors
//!
//! Two separate families live here. [`ChannelError`] is the local one: the
//! channel actor is gone and a request could not even be enqueued.
//! [`FailureReason`] is what a send reports asynchronously when the message was
//! attempted but not delivered.

use thiserror::Error;

/// Why a send was not delivered. Reported through [`DeliveryOutcome::Failed`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FailureReason {
    #[error("too large: {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("no peer connected")]
    NoPeer,

    #[error("channel busy")]
    Busy,

    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("channel closed")]
    ChannelClosed,
}

/// Result of one send attempt, produced asynchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(FailureReason),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

impl From<Result<(), FailureReason>> for DeliveryOutcome {
    fn from(result: Result<(), FailureReason>) -> Self {
        match result {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(reason) => DeliveryOutcome::Failed(reason),
        }
    }
}

/// Errors raised by the channel plumbing itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Channel actor closed")]
    ActorClosed,
    #[error("Channel actor dropped response channel")]
    ActorDropped,
}
