use async_trait::async_trait;
use settings_bridge::channel::{codec, DeliveryOutcome, FailureReason, InMemoryTransport, Transport};
use settings_bridge::coordinator::{BridgeEvent, Submission};
use settings_bridge::lifecycle::{BridgeConfig, BridgeSystem};
use settings_bridge::model::{InboundMessage, KeySchema, Value, ValueType, AUTO_KEY_BASE};
use std::time::Duration;
use tokio::sync::mpsc;

fn config() -> BridgeConfig {
    BridgeConfig::from_json_str(
        r#"{
            "schema": [
                { "name": "brightness", "key": 1, "type": "int" },
                { "name": "name", "key": 2, "type": "string" },
                { "name": "accent", "key": 3, "type": "color" },
                { "name": "vibrate", "key": 4, "type": "bool" }
            ]
        }"#,
    )
    .expect("valid config")
}

/// Full end-to-end test: form response in, dictionary on the peer, event out.
#[tokio::test]
async fn test_form_response_reaches_the_peer() {
    let (transport, mut peer, inbound) = InMemoryTransport::connect(128);
    let (system, mut events) = BridgeSystem::start(&config(), transport, inbound)
        .await
        .expect("Failed to start bridge");

    let outcome = system
        .coordinator
        .form_response(
            r##"{"brightness": {"value": 80}, "accent": "#ff8800", "vibrate": true, "color": "red"}"##,
        )
        .await
        .outcome()
        .await;
    assert_eq!(outcome, Some(DeliveryOutcome::Delivered));

    // The peer sees the numeric keys only; the unknown "color" field is gone.
    let received = peer.recv().await.expect("peer received nothing");
    assert_eq!(received.len(), 3);
    assert_eq!(received.get(1), Some(&Value::Int(80)));
    assert_eq!(received.get(3), Some(&Value::Int(0xff8800)));
    assert_eq!(received.get(4), Some(&Value::Int(1)));

    assert_eq!(events.recv().await, Some(BridgeEvent::Delivered { tuples: 3 }));

    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_wrong_type_sends_nothing() {
    let (transport, mut peer, inbound) = InMemoryTransport::connect(128);
    let (system, mut events) = BridgeSystem::start(&config(), transport, inbound)
        .await
        .unwrap();

    let submission = system
        .coordinator
        .form_response(r#"{"brightness": "high", "name": "Ada"}"#)
        .await;
    assert!(matches!(submission, Submission::Rejected(_)));
    assert!(matches!(
        events.recv().await,
        Some(BridgeEvent::TranslationFailed { .. })
    ));

    system.shutdown().await.unwrap();
    assert!(peer.recv().await.is_none());
}

#[tokio::test]
async fn test_oversize_dictionary_is_reported_not_retried() {
    let (transport, mut peer, inbound) = InMemoryTransport::connect(128);
    let (system, mut events) = BridgeSystem::start(&config(), transport, inbound)
        .await
        .unwrap();

    let long_name = "n".repeat(200);
    let outcome = system
        .coordinator
        .form_response(&format!(r#"{{"name": "{long_name}"}}"#))
        .await
        .outcome()
        .await;

    assert!(matches!(
        outcome,
        Some(DeliveryOutcome::Failed(FailureReason::PayloadTooLarge { max: 128, .. }))
    ));
    assert!(matches!(
        events.recv().await,
        Some(BridgeEvent::DeliveryFailed {
            reason: FailureReason::PayloadTooLarge { .. }
        })
    ));

    system.shutdown().await.unwrap();
    // Exactly zero frames reached the peer: no retry, no partial send.
    assert!(peer.recv().await.is_none());
}

#[tokio::test]
async fn test_peer_inbox_limit_and_link_state_surface_as_failures() {
    let (transport, peer, inbound) = InMemoryTransport::connect(128);
    let (system, _events) = BridgeSystem::start(&config(), transport, inbound)
        .await
        .unwrap();
    let coordinator = &system.coordinator;

    peer.set_inbox_size(8);
    let outcome = coordinator
        .form_response(r#"{"name": "longer than eight"}"#)
        .await
        .outcome()
        .await;
    assert!(matches!(
        outcome,
        Some(DeliveryOutcome::Failed(FailureReason::PayloadTooLarge { max: 8, .. }))
    ));

    peer.set_inbox_size(128);
    peer.set_busy(true);
    let outcome = coordinator.form_response(r#"{"brightness": 1}"#).await.outcome().await;
    assert_eq!(outcome, Some(DeliveryOutcome::Failed(FailureReason::Busy)));

    peer.set_busy(false);
    peer.set_connected(false);
    let outcome = coordinator.form_response(r#"{"brightness": 1}"#).await.outcome().await;
    assert_eq!(outcome, Some(DeliveryOutcome::Failed(FailureReason::NoPeer)));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_inbound_messages_are_reported_in_order() {
    let (transport, peer, inbound) = InMemoryTransport::connect(128);
    let (system, mut events) = BridgeSystem::start(&config(), transport, inbound)
        .await
        .unwrap();

    let first = InboundMessage::new().with(0, 3u32);
    let second = InboundMessage::new().with(99, "status").with(100, -5);
    peer.send(&first).await.unwrap();
    peer.send(&second).await.unwrap();

    assert_eq!(
        events.recv().await,
        Some(BridgeEvent::MessageReceived { message: first })
    );
    match events.recv().await {
        Some(BridgeEvent::MessageReceived { message }) => {
            assert_eq!(message.get(99), Some(&Value::Str("status".into())));
            assert_eq!(message.get(100), Some(&Value::Int(-5)));
        }
        other => panic!("unexpected event: {:?}", other),
    }

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_dismissed_form_and_event_stream_end() {
    let (transport, _peer, inbound) = InMemoryTransport::connect(128);
    let (system, mut events) = BridgeSystem::start(&config(), transport, inbound)
        .await
        .unwrap();

    assert!(matches!(
        system.coordinator.form_response("  ").await,
        Submission::Dismissed
    ));
    system.shutdown().await.unwrap();

    assert_eq!(events.recv().await, Some(BridgeEvent::FormDismissed));
    assert_eq!(events.recv().await, None);
}

#[tokio::test]
async fn test_auto_keyed_schema() {
    let schema = KeySchema::with_auto_keys(
        AUTO_KEY_BASE,
        [("ClockColour", ValueType::Color), ("BtVibration", ValueType::Bool)],
    )
    .unwrap();
    let (transport, mut peer, inbound) = InMemoryTransport::connect(128);
    let (system, _events) = BridgeSystem::start(&BridgeConfig::new(schema), transport, inbound)
        .await
        .unwrap();

    system
        .coordinator
        .form_response(r#"{"BtVibration": false, "ClockColour": 255}"#)
        .await
        .outcome()
        .await;

    let received = peer.recv().await.unwrap();
    assert_eq!(received.get(10000), Some(&Value::Int(255)));
    assert_eq!(received.get(10001), Some(&Value::Int(0)));

    system.shutdown().await.unwrap();
}

/// A platform link that accepts frames and never reports back.
struct AbandoningTransport;

#[async_trait]
impl Transport for AbandoningTransport {
    async fn transmit(&self, _frame: Vec<u8>) -> Result<(), FailureReason> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_abandoned_send_does_not_stop_inbound_reporting() {
    let (frames, inbound) = mpsc::channel(8);
    let (system, mut events) = BridgeSystem::start(&config(), AbandoningTransport, inbound)
        .await
        .unwrap();

    let pending = system.coordinator.form_response(r#"{"brightness": 1}"#).await;
    assert!(matches!(pending, Submission::InFlight(_)));

    let message = InboundMessage::new().with(7, 1);
    frames
        .send(codec::encode(message.as_map()).unwrap())
        .await
        .unwrap();

    let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("inbound message not reported while a send is pending");
    assert_eq!(event, Some(BridgeEvent::MessageReceived { message }));

    // A second submission is still accepted; its outcome waits behind the first.
    let second = system.coordinator.form_response(r#"{"brightness": 2}"#).await;
    assert!(matches!(second, Submission::InFlight(_)));

    system.shutdown().await.unwrap();
}
