//! # Configuration
//!
//! A bridge is configured by one JSON document: the key schema plus a few
//! channel sizes.
//!
//! ```json
//! {
//!   "schema": [
//!     { "name": "brightness", "key": 1, "type": "int" },
//!     { "name": "name", "key": 2, "type": "string" }
//!   ],
//!   "channel": { "outbox_size": 128 }
//! }
//! ```
//!
//! Omitted `channel` fields fall back to [`ChannelConfig::default`]. The schema
//! is validated while it is parsed, so a loaded config never carries duplicate
//! keys or names.

use crate::channel::DEFAULT_INBOX_SIZE;
use crate::model::KeySchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Channel {0} must be greater than zero")]
    ZeroSize(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Largest encoded frame this side hands to the transport.
    pub outbox_size: usize,
    /// Inbox size of the loopback peer used by the demo.
    pub peer_inbox_size: usize,
    /// Capacity of the channel actor's request queue.
    pub buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            outbox_size: DEFAULT_INBOX_SIZE,
            peer_inbox_size: DEFAULT_INBOX_SIZE,
            buffer_size: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub schema: KeySchema,
    #[serde(default)]
    pub channel: ChannelConfig,
}

impl BridgeConfig {
    /// A config with the given schema and default channel sizes.
    pub fn new(schema: KeySchema) -> Self {
        Self {
            schema,
            channel: ChannelConfig::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let ChannelConfig {
            outbox_size,
            peer_inbox_size,
            buffer_size,
        } = self.channel;
        if outbox_size == 0 {
            return Err(ConfigError::ZeroSize("outbox_size"));
        }
        if peer_inbox_size == 0 {
            return Err(ConfigError::ZeroSize("peer_inbox_size"));
        }
        // tokio::sync::mpsc::channel panics on zero capacity
        if buffer_size == 0 {
            return Err(ConfigError::ZeroSize("buffer_size"));
        }
        Ok(())
    }
}
