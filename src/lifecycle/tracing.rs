//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered
//! by `RUST_LOG`. Module paths are hidden; the structured fields carry the
//! context instead.
//!
//! ## Levels
//!
//! - `info`: channel start/stop, delivery outcomes, inbound messages
//! - `warn`: failed deliveries, rejected settings, dropped inbound frames
//! - `debug`: full dictionaries and raw form responses, translation phases
//!
//! ```bash
//! RUST_LOG=info cargo run -- --response '{"ClockColour": "#ff0000"}'
//! RUST_LOG=debug cargo run
//! RUST_LOG=settings_bridge::channel=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a successful submission reads:
//!
//! ```text
//! INFO Channel started outbox_size=128
//! INFO form_closed: Delivered tuples=1
//! INFO Message sent successfully tuples=1
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
