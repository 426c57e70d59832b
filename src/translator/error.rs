//! Error types for settings translation.

use crate::model::ValueType;
use thiserror::Error;

/// Errors that can occur while translating a form response.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TranslationError {
    /// A field is present but its value cannot be read as the declared type.
    #[error("Setting '{name}' (key {key}) expected {expected}, found {found}")]
    TypeMismatch {
        name: String,
        key: u32,
        expected: ValueType,
        found: String,
    },

    /// A numeric field has the right shape but does not fit the declared type.
    #[error("Setting '{name}' (key {key}) out of range for {expected}: {value}")]
    OutOfRange {
        name: String,
        key: u32,
        expected: ValueType,
        value: String,
    },

    /// The response string could not be parsed at all.
    #[error("Malformed form response: {0}")]
    MalformedResponse(String),
}

impl From<serde_json::Error> for TranslationError {
    fn from(e: serde_json::Error) -> Self {
        TranslationError::MalformedResponse(e.to_string())
    }
}
