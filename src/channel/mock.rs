//! # Mock Channel
//!
//! Test double for code that sits on top of a [`ChannelClient`], such as the
//! coordinator. No transport and no codec are involved: send requests are
//! answered from a queue of expectations and inbound messages are injected
//! straight into whatever handler was last installed.
//!
//! | Feature | MockChannel | Real ChannelActor |
//! |---------|-------------|-------------------|
//! | **Outcomes** | Scripted (`return_failed`) | Whatever the transport reports |
//! | **Inbound** | `deliver(message)` | Frames from the peer |
//! | **Use Case** | Coordinator logic | Channel or full system |
//!
//! ```rust
//! use settings_bridge::channel::mock::MockChannel;
//! use settings_bridge::channel::{DeliveryOutcome, FailureReason};
//! use settings_bridge::model::{KeyEntry, KeySchema, RawResponse, ValueType};
//! use settings_bridge::translator::translate;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockChannel::new();
//!     mock.expect_send().return_failed(FailureReason::Busy);
//!
//!     let schema = KeySchema::new(vec![KeyEntry::new("brightness", 1, ValueType::Int)]).unwrap();
//!     let dict = translate(&RawResponse::new(serde_json::json!({"brightness": 80})), &schema).unwrap();
//!
//!     let receipt = mock.client().send(dict).await.unwrap();
//!     assert_eq!(receipt.await, DeliveryOutcome::Failed(FailureReason::Busy));
//!     mock.verify();
//! }
//! ```
//!
//! For step-by-step control use [`create_mock_channel`] and answer each request
//! yourself with [`expect_send`].

use super::client::ChannelClient;
use super::error::{DeliveryOutcome, FailureReason};
use super::message::{ChannelRequest, MessageHandler, Response};
use crate::model::{InboundMessage, SettingsDictionary};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Default)]
struct MockState {
    expectations: VecDeque<DeliveryOutcome>,
    sent: Vec<SettingsDictionary>,
    handler: Option<MessageHandler>,
    unexpected: usize,
}

/// A mock channel with expectation tracking for fluent testing.
pub struct MockChannel {
    client: ChannelClient,
    state: Arc<Mutex<MockState>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockChannel {
    /// Creates a new mock channel with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ChannelRequest>(100);
        let state = Arc::new(Mutex::new(MockState::default()));
        let state_clone = state.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let mut state = state_clone.lock().unwrap();
                match request {
                    ChannelRequest::Send { dict, respond_to } => {
                        state.sent.push(dict);
                        let outcome = match state.expectations.pop_front() {
                            Some(outcome) => outcome,
                            None => {
                                state.unexpected += 1;
                                DeliveryOutcome::Failed(FailureReason::ChannelClosed)
                            }
                        };
                        let _ = respond_to.send(outcome);
                    }
                    ChannelRequest::SetHandler {
                        handler,
                        respond_to,
                    } => {
                        state.handler = Some(handler);
                        let _ = respond_to.send(());
                    }
                }
            }
        });

        Self {
            client: ChannelClient::new(sender),
            state,
            _handle: handle,
        }
    }

    /// Returns a client wired to this mock.
    pub fn client(&self) -> ChannelClient {
        self.client.clone()
    }

    /// Expects one more `send`.
    pub fn expect_send(&mut self) -> SendExpectationBuilder {
        SendExpectationBuilder {
            state: self.state.clone(),
        }
    }

    /// Dictionaries sent so far, in order.
    pub fn sent(&self) -> Vec<SettingsDictionary> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn send_count(&self) -> usize {
        self.state.lock().unwrap().sent.len()
    }

    pub fn has_handler(&self) -> bool {
        self.state.lock().unwrap().handler.is_some()
    }

    /// Feeds `message` to the installed handler, as the actor would on arrival.
    /// Returns `false` when no handler is installed.
    pub fn deliver(&self, message: InboundMessage) -> bool {
        let state = self.state.lock().unwrap();
        match &state.handler {
            Some(handler) => {
                handler(message);
                true
            }
            None => false,
        }
    }

    /// Verifies that every expectation was consumed and no send went unexpected.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap();
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
        if state.unexpected > 0 {
            panic!("{} unexpected send(s)", state.unexpected);
        }
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `send` expectations.
pub struct SendExpectationBuilder {
    state: Arc<Mutex<MockState>>,
}

impl SendExpectationBuilder {
    /// The send is reported as delivered.
    pub fn return_delivered(self) {
        self.push(DeliveryOutcome::Delivered);
    }

    /// The send is reported as failed with `reason`.
    pub fn return_failed(self, reason: FailureReason) {
        self.push(DeliveryOutcome::Failed(reason));
    }

    fn push(self, outcome: DeliveryOutcome) {
        self.state.lock().unwrap().expectations.push_back(outcome);
    }
}

/// Creates a client and the raw request receiver behind it.
pub fn create_mock_channel(buffer_size: usize) -> (ChannelClient, mpsc::Receiver<ChannelRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ChannelClient::new(sender), receiver)
}

/// Helper to verify that the next request is a Send.
pub async fn expect_send(
    receiver: &mut mpsc::Receiver<ChannelRequest>,
) -> Option<(SettingsDictionary, Response<DeliveryOutcome>)> {
    match receiver.recv().await {
        Some(ChannelRequest::Send { dict, respond_to }) => Some((dict, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next request is a SetHandler; acknowledges it and
/// hands the handler back.
pub async fn expect_set_handler(
    receiver: &mut mpsc::Receiver<ChannelRequest>,
) -> Option<MessageHandler> {
    match receiver.recv().await {
        Some(ChannelRequest::SetHandler {
            handler,
            respond_to,
        }) => {
            let _ = respond_to.send(());
            Some(handler)
        }
        _ => None,
    }
}
