//! What the settings form hands back when it closes.

use serde_json::{Map, Value as Json};

/// Opaque, form-submission-shaped payload.
///
/// Nothing checks its shape except the translator. A root that is not a JSON
/// object simply has no named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse(Json);

impl RawResponse {
    pub fn new(value: Json) -> Self {
        Self(value)
    }

    /// Parses the serialized response string delivered by the form.
    ///
    /// A blank response means the form was dismissed without a submission and
    /// yields `Ok(None)`.
    pub fn parse(response: &str) -> Result<Option<Self>, serde_json::Error> {
        let trimmed = response.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(trimmed).map(|v| Some(Self(v)))
    }

    /// Looks up a top-level field.
    ///
    /// The settings form stores each item as `{ "value": x }`; such envelopes are
    /// unwrapped to `x`. `null`, bare or enveloped, counts as absent.
    pub fn field(&self, name: &str) -> Option<&Json> {
        let value = self.fields()?.get(name)?;
        let value = match value {
            Json::Object(item) => item.get("value").unwrap_or(value),
            _ => value,
        };
        (!value.is_null()).then_some(value)
    }

    pub fn fields(&self) -> Option<&Map<String, Json>> {
        self.0.as_object()
    }

    pub fn as_json(&self) -> &Json {
        &self.0
    }
}

impl From<Json> for RawResponse {
    fn from(value: Json) -> Self {
        Self(value)
    }
}
