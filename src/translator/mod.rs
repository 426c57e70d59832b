//! Settings translation: form response in, schema-keyed dictionary out.
//!
//! The policy is best-effort: settings missing from the response are left out,
//! unknown response fields are ignored, and the only failure is a present value
//! that cannot be read as its declared type. On failure no partial dictionary is
//! returned.

mod coerce;
pub mod error;

pub use error::*;

use crate::model::{KeySchema, RawResponse, SettingsDictionary};
use std::sync::Arc;
use tracing::debug;

/// Translates `raw` against `schema`. Pure function of its inputs.
pub fn translate(
    raw: &RawResponse,
    schema: &KeySchema,
) -> Result<SettingsDictionary, TranslationError> {
    let mut dict = SettingsDictionary::new();
    for entry in schema.entries() {
        if let Some(value) = raw.field(&entry.name) {
            dict.insert(entry.key, coerce::coerce(entry, value)?);
        }
    }
    Ok(dict)
}

/// A translator bound to the process-wide schema.
#[derive(Debug, Clone)]
pub struct SettingsTranslator {
    schema: Arc<KeySchema>,
}

impl SettingsTranslator {
    pub fn new(schema: Arc<KeySchema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &KeySchema {
        &self.schema
    }

    pub fn translate(&self, raw: &RawResponse) -> Result<SettingsDictionary, TranslationError> {
        let dict = translate(raw, &self.schema)?;
        debug!(
            present = dict.len(),
            declared = self.schema.len(),
            "Translated form response"
        );
        Ok(dict)
    }
}
