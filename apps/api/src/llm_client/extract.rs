//! Response normalization: turns whatever JSON the provider returns into text.
//!
//! Strategies run in order and the first one that yields text wins. If none
//! match, the whole body is returned as serialized JSON so provider output is
//! never silently dropped.

use serde_json::Value;

/// A single way of pulling generated text out of a provider response.
pub trait TextExtractor: Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, response: &Value) -> Option<String>;
}

/// OpenAI-style `choices[0].message.content`, falling back to `choices[0].text`.
pub struct ChoicesExtractor;

impl TextExtractor for ChoicesExtractor {
    fn name(&self) -> &'static str {
        "choices"
    }

    fn extract(&self, response: &Value) -> Option<String> {
        let first = response.get("choices")?.as_array()?.first()?;

        let content = first
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty());
        if let Some(content) = content {
            return Some(content.to_string());
        }

        first.get("text").and_then(Value::as_str).map(str::to_string)
    }
}

/// Top-level `text` / `output` / `generated_text`, as used by plain completion APIs.
pub struct NamedKeyExtractor;

const TOP_LEVEL_KEYS: &[&str] = &["text", "output", "generated_text"];
const NESTED_KEYS: &[&str] = &["generated_text", "text", "content"];

impl TextExtractor for NamedKeyExtractor {
    fn name(&self) -> &'static str {
        "named_key"
    }

    fn extract(&self, response: &Value) -> Option<String> {
        let value = TOP_LEVEL_KEYS.iter().find_map(|key| response.get(*key))?;

        match value {
            Value::String(text) => Some(text.clone()),
            Value::Object(fields) => NESTED_KEYS
                .iter()
                .find_map(|key| fields.get(*key).and_then(Value::as_str))
                .map(str::to_string)
                .or_else(|| Some(value.to_string())),
            other => Some(other.to_string()),
        }
    }
}

/// Extractors in priority order.
pub static EXTRACTORS: &[&dyn TextExtractor] = &[&ChoicesExtractor, &NamedKeyExtractor];

/// Runs [`EXTRACTORS`] in order; falls back to the serialized response.
pub fn extract_text(response: &Value) -> String {
    for extractor in EXTRACTORS {
        if let Some(text) = extractor.extract(response) {
            tracing::debug!("Provider response matched extractor '{}'", extractor.name());
            return text;
        }
    }
    tracing::debug!("No extractor matched provider response; returning raw JSON");
    response.to_string()
}
