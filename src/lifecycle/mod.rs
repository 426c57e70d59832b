//! # System Lifecycle
//!
//! Starting, wiring and stopping the bridge.
//!
//! 1. **Configuration** ([`config`]): the key schema and channel sizes, loaded from JSON.
//! 2. **Startup** ([`BridgeSystem::start`]): spawns the channel actor with its
//!    transport injected, then builds the coordinator and registers its inbound handler.
//! 3. **Shutdown** ([`BridgeSystem::shutdown`]): drops the only client so the actor's
//!    request queue closes, then awaits the actor task.
//! 4. **Observability** ([`tracing`]): subscriber setup for binaries.
//!
//! The inbound handler is registered before `start` returns; from then on every
//! well-formed message from the peer reaches the coordinator.

pub mod bridge_system;
pub mod config;
pub mod tracing;

pub use bridge_system::BridgeSystem;
pub use config::{BridgeConfig, ChannelConfig, ConfigError};
