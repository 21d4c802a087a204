//! Generation results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Finish reason reported when the backend gives none.
pub const DEFAULT_FINISH_REASON: &str = "stop";

/// Usage counters keyed by backend-defined names (e.g. `prompt_tokens`).
pub type UsageCounters = BTreeMap<String, u64>;

fn default_finish_reason() -> String {
    DEFAULT_FINISH_REASON.to_string()
}

/// The outcome of a single generation call.
///
/// `text` is always fully decoded. The remaining fields are metadata that a
/// backend may or may not report; `raw` is kept only for diagnostics.
///
/// # Examples
///
/// ```
/// use rollout_core::GenerationResult;
///
/// let result = GenerationResult::new("9.11 is larger than 9.9.");
/// assert_eq!(result.text(), "9.11 is larger than 9.9.");
/// assert_eq!(result.finish_reason(), "stop");
/// assert!(result.usage().is_none());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct GenerationResult {
    /// Generated text
    text: String,
    /// Why generation stopped ("stop", "length", ...)
    #[serde(default = "default_finish_reason")]
    #[builder(default = "default_finish_reason()")]
    finish_reason: String,
    /// Usage counters, when the backend reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    usage: Option<UsageCounters>,
    /// Backend-specific payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    raw: Option<serde_json::Value>,
}

impl GenerationResult {
    /// Creates a result carrying only text, with the default finish reason.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: default_finish_reason(),
            usage: None,
            raw: None,
        }
    }

    /// Returns a builder for constructing a GenerationResult.
    pub fn builder() -> GenerationResultBuilder {
        GenerationResultBuilder::default()
    }

    /// Consumes the result, returning the generated text.
    pub fn into_text(self) -> String {
        self.text
    }
}
