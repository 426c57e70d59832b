use super::config::BridgeConfig;
use crate::channel::{ChannelActor, ChannelClient, ChannelContext, ChannelError, Inbound, Transport};
use crate::coordinator::{Coordinator, EventSink, EventStream};
use crate::translator::SettingsTranslator;
use std::sync::Arc;
use tracing::{error, info};

/// A running bridge: the channel actor plus the coordinator wired to it.
///
/// # Example
///
/// ```ignore
/// let (transport, peer, inbound) = InMemoryTransport::connect(128);
/// let (system, mut events) = BridgeSystem::start(&config, transport, inbound).await?;
///
/// system.coordinator.form_response(r#"{"brightness": 80}"#).await;
/// let event = events.recv().await;
///
/// system.shutdown().await?;
/// ```
pub struct BridgeSystem {
    /// Entry point for form and message events.
    pub coordinator: Coordinator<ChannelClient>,

    handle: tokio::task::JoinHandle<()>,
}

impl BridgeSystem {
    /// Starts the channel actor on `transport`, then builds and attaches the
    /// coordinator.
    ///
    /// Returns the system and the stream of [`BridgeEvent`](crate::coordinator::BridgeEvent)s
    /// it emits. The stream ends once the system is shut down.
    pub async fn start<T: Transport>(
        config: &BridgeConfig,
        transport: T,
        inbound: Inbound,
    ) -> Result<(Self, EventStream), ChannelError> {
        let channel = config.channel;
        let translator = SettingsTranslator::new(Arc::new(config.schema.clone()));

        let (actor, client) = ChannelActor::new(channel.buffer_size, channel.outbox_size);
        let handle = tokio::spawn(actor.run(ChannelContext::new(transport, inbound)));

        let (events, stream) = EventSink::new();
        let coordinator = Coordinator::new(translator, client, events);
        coordinator.attach().await?;

        info!(keys = config.schema.len(), "Bridge started");
        Ok((Self { coordinator, handle }, stream))
    }

    /// Drops the coordinator, which closes the channel actor's request queue,
    /// and waits for the actor to finish.
    ///
    /// Frames already queued for the transport are still transmitted; shutdown
    /// does not wait for their outcome.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down bridge...");
        drop(self.coordinator);

        if let Err(e) = self.handle.await {
            error!("Channel task failed: {:?}", e);
            return Err(format!("Channel task failed: {:?}", e));
        }

        info!("Bridge shutdown complete.");
        Ok(())
    }
}
