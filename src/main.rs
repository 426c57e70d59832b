//! # Settings Bridge Demo
//!
//! Runs the bridge against an in-memory watch. Each `--response` is fed through
//! the coordinator as if a settings form had just closed; the simulated watch
//! acknowledges every dictionary it receives with a message of its own.
//!
//! ```bash
//! RUST_LOG=info cargo run -- \
//!     --response '{"BackgroundColour": "#0055aa", "HourlyVibration": true}' \
//!     --response '{"ClockColour": "purple"}'
//! ```

use clap::Parser;
use settings_bridge::channel::{DeliveryOutcome, InMemoryTransport, Peer};
use settings_bridge::coordinator::BridgeEvent;
use settings_bridge::lifecycle::tracing::setup_tracing;
use settings_bridge::lifecycle::{BridgeConfig, BridgeSystem};
use settings_bridge::model::{InboundMessage, KeySchema, ValueType, AUTO_KEY_BASE};
use std::path::PathBuf;
use tracing::{info, warn, Instrument};

/// Key the simulated watch uses to report how many settings it applied.
const ACK_KEY: u32 = 0;

const DEMO_RESPONSE: &str =
    r##"{"BackgroundColour": "#0055aa", "ShowClockPattern": true, "HourlyVibration": false}"##;

#[derive(Parser, Debug)]
#[command(name = "settings-bridge", about = "Deliver settings form responses to a simulated watch")]
struct Cli {
    /// JSON bridge config (schema and channel sizes). Defaults to the built-in watchface schema.
    #[arg(long, env = "SETTINGS_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Serialized form response; repeat to submit several. An empty string is a dismissed form.
    #[arg(long)]
    response: Vec<String>,
}

fn watchface_config() -> Result<BridgeConfig, String> {
    let schema = KeySchema::with_auto_keys(
        AUTO_KEY_BASE,
        [
            ("BackgroundColour", ValueType::Color),
            ("ClockColour", ValueType::Color),
            ("ShowClockPattern", ValueType::Bool),
            ("HandColour", ValueType::Color),
            ("HandOutlineColour", ValueType::Color),
            ("HourlyVibration", ValueType::Bool),
            ("HourOverMinute", ValueType::Bool),
            ("BtVibration", ValueType::Bool),
            ("BtBackgroundColour", ValueType::Color),
        ],
    )
    .map_err(|e| e.to_string())?;
    Ok(BridgeConfig::new(schema))
}

#[derive(Debug, Default)]
struct Summary {
    delivered: usize,
    failed: usize,
    received: usize,
}

impl Summary {
    /// Counts `event`; returns `true` for messages from the watch.
    fn tally(&mut self, event: &BridgeEvent) -> bool {
        match event {
            BridgeEvent::Delivered { .. } => self.delivered += 1,
            BridgeEvent::DeliveryFailed { .. } | BridgeEvent::TranslationFailed { .. } => {
                self.failed += 1
            }
            BridgeEvent::MessageReceived { .. } => {
                self.received += 1;
                return true;
            }
            BridgeEvent::FormDismissed => {}
        }
        false
    }
}

async fn run_watch(mut peer: Peer) {
    while let Some(settings) = peer.recv().await {
        info!(tuples = settings.len(), "Watch applied settings");
        let ack = InboundMessage::new().with(ACK_KEY, settings.len() as u32);
        if let Err(reason) = peer.send(&ack).await {
            warn!(%reason, "Watch could not acknowledge");
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), String> {
    setup_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BridgeConfig::from_file(path).map_err(|e| e.to_string())?,
        None => watchface_config()?,
    };
    let responses = if cli.response.is_empty() {
        vec![DEMO_RESPONSE.to_string()]
    } else {
        cli.response
    };

    let (transport, peer, inbound) = InMemoryTransport::connect(config.channel.peer_inbox_size);
    let watch = tokio::spawn(run_watch(peer));

    let (system, mut events) = BridgeSystem::start(&config, transport, inbound)
        .await
        .map_err(|e| e.to_string())?;
    info!(submissions = responses.len(), "Starting settings bridge demo");

    let mut summary = Summary::default();
    for (index, response) in responses.iter().enumerate() {
        let span = tracing::info_span!("form", index);
        let delivered = async {
            let submission = system.coordinator.form_response(response).await;
            let outcome = submission.outcome().await;
            if let Some(outcome) = &outcome {
                info!(delivered = outcome.is_delivered(), "Submission finished");
            }
            matches!(outcome, Some(DeliveryOutcome::Delivered))
        }
        .instrument(span)
        .await;

        // The watch acknowledges each delivered dictionary; wait for it before
        // the next form.
        if delivered {
            while let Some(event) = events.recv().await {
                if summary.tally(&event) {
                    break;
                }
            }
        }
    }

    system.shutdown().await?;
    watch.await.map_err(|e| e.to_string())?;
    while let Some(event) = events.recv().await {
        summary.tally(&event);
    }

    let Summary {
        delivered,
        failed,
        received,
    } = summary;
    info!(delivered, failed, received, "Demo completed");
    Ok(())
}
