//! # MessageChannel Trait
//!
//! The seam the coordinator depends on. [`ChannelClient`] is the production
//! implementation; anything that can deliver a dictionary and hold one inbound
//! handler can stand in for it.
use super::client::{ChannelClient, DeliveryReceipt};
use super::error::ChannelError;
use super::message::MessageHandler;
use crate::model::SettingsDictionary;
use async_trait::async_trait;

#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Starts delivery of `dict`. The returned receipt resolves once the peer
    /// outcome is known; size limits are reported there, not here.
    async fn send(&self, dict: SettingsDictionary) -> Result<DeliveryReceipt, ChannelError>;

    /// Installs `handler` as the only inbound handler, replacing any previous one.
    async fn set_handler(&self, handler: MessageHandler) -> Result<(), ChannelError>;
}

#[async_trait]
impl MessageChannel for ChannelClient {
    async fn send(&self, dict: SettingsDictionary) -> Result<DeliveryReceipt, ChannelError> {
        ChannelClient::send(self, dict).await
    }

    async fn set_handler(&self, handler: MessageHandler) -> Result<(), ChannelError> {
        ChannelClient::set_handler(self, handler).await
    }
}
