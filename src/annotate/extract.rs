//! Recovery of the JSON object from a free-form model response.

use crate::annotate::AnnotationRecord;
use crate::error::{Error, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use tracing::error;

#[allow(clippy::expect_used)]
static FENCED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced pattern is valid")
});

#[allow(clippy::expect_used)]
static BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(\{.*\})").expect("bare pattern is valid"));

/// Locate the JSON object in `text`.
///
/// A fenced code block wins; otherwise the span from the first `{` to the
/// last `}` is taken.
pub fn find_payload(text: &str) -> Result<&str> {
    FENCED
        .captures(text)
        .or_else(|| BARE.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::NoStructuredPayload {
            response: text.to_string(),
        })
}

/// Extract and decode the JSON object in `text` as a generic value.
pub fn extract_json(text: &str) -> Result<serde_json::Value> {
    decode(find_payload(text)?)
}

/// Extract the annotation record from a model response.
pub fn extract_record(text: &str) -> Result<AnnotationRecord> {
    decode(find_payload(text)?)
}

fn decode<T: DeserializeOwned>(payload: &str) -> Result<T> {
    serde_json::from_str(payload).map_err(|source| {
        error!("Error decoding JSON: {source}");
        error!("Extracted string: {payload}");
        Error::MalformedPayload {
            payload: payload.to_string(),
            source,
        }
    })
}
