//! Asynchronous, size-limited message channel to the companion.
//!
//! # Main Components
//!
//! - [`ChannelActor`] - owns the transport and the single inbound handler slot
//! - [`ChannelClient`] - cloneable handle; `send` returns a [`DeliveryReceipt`]
//! - [`MessageChannel`] - the trait the coordinator is written against
//! - [`Transport`] - seam to the host platform's link
//! - [`codec`] - the dictionary wire format
//!
//! # Testing
//!
//! See [`mock`] for a scripted channel that needs no transport.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod codec;
pub mod error;
pub mod message;
pub mod mock;
pub mod transport;

pub use actor::{ChannelActor, ChannelContext};
pub use client::{ChannelClient, DeliveryReceipt};
pub use client_trait::MessageChannel;
pub use error::{ChannelError, DeliveryOutcome, FailureReason};
pub use message::{ChannelRequest, MessageHandler};
pub use transport::{InMemoryTransport, Inbound, Peer, Transport, DEFAULT_INBOX_SIZE};
