//! Numerically keyed dictionaries, the unit of exchange with the companion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A typed value as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i32),
    UInt(u32),
    Str(String),
    Bytes(Vec<u8>),
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

/// Outbound dictionary produced by the translator.
///
/// Every key belongs to the schema it was translated against and every value
/// already has the schema's declared type. Keys missing from the submission are
/// simply absent. Only the translator builds one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SettingsDictionary {
    entries: BTreeMap<u32, Value>,
}

impl SettingsDictionary {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: u32, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: u32) -> Option<&Value> {
        self.entries.get(&key)
    }

    pub fn contains_key(&self, key: u32) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Value)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn as_map(&self) -> &BTreeMap<u32, Value> {
        &self.entries
    }
}

/// Dictionary received from the companion.
///
/// Structurally the same as [`SettingsDictionary`] but never checked against a
/// schema: the peer may send keys this side does not know about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InboundMessage {
    entries: BTreeMap<u32, Value>,
}

impl InboundMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for peers and tests.
    pub fn with(mut self, key: u32, value: impl Into<Value>) -> Self {
        self.entries.insert(key, value.into());
        self
    }

    pub fn insert(&mut self, key: u32, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: u32) -> Option<&Value> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Value)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn as_map(&self) -> &BTreeMap<u32, Value> {
        &self.entries
    }
}

impl From<BTreeMap<u32, Value>> for InboundMessage {
    fn from(entries: BTreeMap<u32, Value>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(u32, Value)> for InboundMessage {
    fn from_iter<I: IntoIterator<Item = (u32, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
