//! # Key Schema
//!
//! The fixed mapping from human-readable setting names to numeric wire keys and
//! declared types. A [`KeySchema`] is built once at startup and shared read-only
//! (usually behind an `Arc`) for the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// First key handed out by the companion platform when message keys are
/// declared by name only.
pub const AUTO_KEY_BASE: u32 = 10000;

/// The type a setting is coerced to before it goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Signed 32-bit integer.
    Int,
    /// Unsigned 32-bit integer.
    UInt,
    /// Toggle, sent as `Int(1)` / `Int(0)`.
    Bool,
    /// 24-bit RGB colour, sent as `Int(0xRRGGBB)`.
    Color,
    /// UTF-8 text, NUL-terminated on the wire.
    String,
    /// Raw byte array.
    Bytes,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Int => "int",
            ValueType::UInt => "uint",
            ValueType::Bool => "bool",
            ValueType::Color => "color",
            ValueType::String => "string",
            ValueType::Bytes => "bytes",
        };
        f.write_str(name)
    }
}

/// One `(name, key, type)` triple of a [`KeySchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntry {
    pub name: String,
    pub key: u32,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl KeyEntry {
    pub fn new(name: impl Into<String>, key: u32, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            key,
            value_type,
        }
    }
}

/// Errors raised while building a [`KeySchema`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    #[error("Duplicate numeric key {key} (used by '{first}' and '{second}')")]
    DuplicateKey {
        key: u32,
        first: String,
        second: String,
    },

    #[error("Duplicate setting name: {0}")]
    DuplicateName(String),

    #[error("Setting name must not be empty (key {0})")]
    EmptyName(u32),
}

/// Ordered, immutable set of schema entries with unique names and unique keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeySchema {
    entries: Vec<KeyEntry>,
}

impl KeySchema {
    /// Builds a schema, rejecting duplicate names or keys.
    pub fn new(entries: Vec<KeyEntry>) -> Result<Self, SchemaError> {
        let mut names = HashSet::new();
        for (idx, entry) in entries.iter().enumerate() {
            if entry.name.is_empty() {
                return Err(SchemaError::EmptyName(entry.key));
            }
            if !names.insert(entry.name.as_str()) {
                return Err(SchemaError::DuplicateName(entry.name.clone()));
            }
            if let Some(first) = entries[..idx].iter().find(|e| e.key == entry.key) {
                return Err(SchemaError::DuplicateKey {
                    key: entry.key,
                    first: first.name.clone(),
                    second: entry.name.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Builds a schema whose keys are assigned sequentially from `base`, in the
    /// order the fields are given.
    pub fn with_auto_keys<I, S>(base: u32, fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (S, ValueType)>,
        S: Into<String>,
    {
        let entries = fields
            .into_iter()
            .zip(base..)
            .map(|((name, value_type), key)| KeyEntry::new(name, key, value_type))
            .collect();
        Self::new(entries)
    }

    pub fn entries(&self) -> &[KeyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_name(&self, name: &str) -> Option<&KeyEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn by_key(&self, key: u32) -> Option<&KeyEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

impl<'de> Deserialize<'de> for KeySchema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries = Vec::<KeyEntry>::deserialize(deserializer)?;
        KeySchema::new(entries).map_err(serde::de::Error::custom)
    }
}
