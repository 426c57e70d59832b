//! # Settings Bridge
//!
//! > **Translate a submitted settings form into a keyed dictionary and deliver it
//! > to a companion device over a size-limited asynchronous channel.**
//!
//! A phone-side host shows the user a configuration form. When the form closes,
//! its response (a JSON object keyed by setting name) is translated against a
//! fixed key schema into a dictionary of numeric keys and typed values, and sent
//! to the watch. Messages coming back from the watch are reported as they arrive.
//!
//! ## Design
//!
//! ### 1. One Actor for the Channel
//! The [`ChannelActor`](channel::ChannelActor) owns the transport and the inbound
//! handler slot and works through its requests one at a time. Everyone else holds a
//! cloneable [`ChannelClient`](channel::ChannelClient). `send` returns once the
//! dictionary is queued; the outcome arrives later through a
//! [`DeliveryReceipt`](channel::DeliveryReceipt).
//!
//! ### 2. Errors Become Events
//! A setting of the wrong type stops translation and nothing is sent. A delivery
//! that fails (too large, no peer, peer busy) is reported once and not retried.
//! Neither is fatal: the [`Coordinator`](coordinator::Coordinator) turns both into
//! [`BridgeEvent`](coordinator::BridgeEvent)s.
//!
//! ### 3. Injected Dependencies
//! The coordinator receives its translator, channel and event sink at
//! construction. The channel actor receives its transport when it starts running.
//! There is no global state.
//!
//! ## Module Tour
//!
//! - [`model`]: key schema, raw form responses, dictionaries.
//! - [`translator`]: the pure translation step and its coercion rules.
//! - [`channel`]: actor, client, wire codec, transport seam and a mock for tests.
//! - [`coordinator`]: the event-driven glue between form, translator and channel.
//! - [`lifecycle`]: configuration, startup/shutdown of a [`BridgeSystem`](lifecycle::BridgeSystem), tracing setup.
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run -- --response '{"BackgroundColour": "#0055aa", "HourlyVibration": true}'
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod channel;
pub mod coordinator;
pub mod lifecycle;
pub mod model;
pub mod translator;
