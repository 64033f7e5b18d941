//! Structured scene annotation returned by the model.

use crate::constants::{DRY_RUN_SUMMARY, NO_INTERACTION, UNKNOWN};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

fn unknown() -> String {
    UNKNOWN.to_string()
}

fn no_interaction() -> String {
    NO_INTERACTION.to_string()
}

/// Scene description for one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Date from the image overlay, `YYYY-MM-DD`.
    #[serde(default = "unknown", deserialize_with = "text_or_unknown")]
    pub date: String,

    /// Time from the overlay, or "day"/"night".
    #[serde(default = "unknown", deserialize_with = "text_or_unknown")]
    pub time: String,

    /// Habitat description.
    #[serde(default = "unknown", deserialize_with = "text_or_unknown")]
    pub habitat: String,

    /// Temperature from the overlay.
    #[serde(default = "unknown", deserialize_with = "text_or_unknown")]
    pub temperature: String,

    /// Weather conditions.
    #[serde(default = "unknown", deserialize_with = "text_or_unknown")]
    pub weather: String,

    /// Number of distinct animals seen.
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u32,

    /// One entry per distinct animal.
    #[serde(default, deserialize_with = "list_or_empty")]
    pub individuals: Vec<Individual>,

    /// Free-text summary.
    #[serde(default, deserialize_with = "text_or_empty")]
    pub summary: String,

    /// Keys the model added beyond the requested schema.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AnnotationRecord {
    fn default() -> Self {
        Self {
            date: unknown(),
            time: unknown(),
            habitat: unknown(),
            temperature: unknown(),
            weather: unknown(),
            count: 0,
            individuals: Vec::new(),
            summary: String::new(),
            extra: Map::new(),
        }
    }
}

impl AnnotationRecord {
    /// Placeholder produced when no model call is made.
    pub fn dry_run_placeholder() -> Self {
        Self {
            summary: DRY_RUN_SUMMARY.to_string(),
            ..Self::default()
        }
    }

    /// True when `count` disagrees with the individual list.
    pub fn count_mismatch(&self) -> bool {
        usize::try_from(self.count).map_or(true, |count| count != self.individuals.len())
    }

    /// Distinct species names, sorted.
    pub fn species(&self) -> Vec<&str> {
        let mut species: Vec<&str> = self
            .individuals
            .iter()
            .map(|i| i.species.as_str())
            .filter(|s| !s.is_empty())
            .collect();
        species.sort_unstable();
        species.dedup();
        species
    }
}

/// One animal observed across the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    /// Stable label, e.g. `elk_1`.
    #[serde(default = "unknown", deserialize_with = "text_or_unknown")]
    pub id: String,

    /// Species name.
    #[serde(default = "unknown", deserialize_with = "text_or_unknown")]
    pub species: String,

    /// male, female or unknown.
    #[serde(default = "unknown", deserialize_with = "text_or_unknown")]
    pub sex: String,

    /// baby, young, adult or old.
    #[serde(default = "unknown", deserialize_with = "text_or_unknown")]
    pub approx_age: String,

    /// Health state.
    #[serde(default = "unknown", deserialize_with = "text_or_unknown")]
    pub health: String,

    /// Primary activity.
    #[serde(default = "unknown", deserialize_with = "text_or_unknown")]
    pub activity: String,

    /// Reference to another individual, or "none".
    #[serde(default = "no_interaction", deserialize_with = "text_or_no_interaction")]
    pub interaction: String,

    /// Free-text observations.
    #[serde(default, deserialize_with = "text_or_empty")]
    pub notes: String,

    /// Keys the model added beyond the requested schema.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read a scalar as text: strings pass through, numbers and booleans are
/// rendered, `null` yields `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!("expected text, got {other}"))),
    }
}

fn text_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_else(unknown))
}

fn text_or_no_interaction<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_else(no_interaction))
}

fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

/// `null` individuals means none were reported.
fn list_or_empty<'de, D>(deserializer: D) -> Result<Vec<Individual>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Individual>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept `3`, `"3"`, `3.0` or `null` for the count field.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Raw::Int(n)) => u32::try_from(n).map_err(D::Error::custom),
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(Raw::Float(f)) if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => {
            Ok(f as u32)
        }
        Some(Raw::Float(f)) => Err(D::Error::custom(format!("invalid count: {f}"))),
        Some(Raw::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(0);
            }
            s.parse::<u32>()
                .map_err(|_| D::Error::custom(format!("invalid count: {s:?}")))
        }
    }
}
