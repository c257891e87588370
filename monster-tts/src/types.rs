//! Provider data model

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// A voice offered by the provider
///
/// Voices are never mutated once fetched; the catalog only reorders and
/// filters them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Voice {
    #[serde(default)]
    pub voice_id: String,

    #[serde(default)]
    pub name: String,

    /// Sample reference (URL or path)
    #[serde(default)]
    pub sample: String,

    /// Opaque provider metadata, passed through untouched
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Voice {
    pub fn new(voice_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            voice_id: voice_id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Raw `/voices` response
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VoiceList {
    #[serde(rename = "customVoices", default)]
    pub custom_voices: Vec<Voice>,

    /// Premade voices
    #[serde(default)]
    pub voices: Vec<Voice>,
}

/// Account usage and subscription status (`/user`)
///
/// Every raw field tolerates `null` or absence; the display fields are
/// derived from whatever arrived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SubscriptionStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub character_usage: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub current_plan: String,

    #[serde(default)]
    pub downgrading_to_plan: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub has_payment_method: bool,

    #[serde(default)]
    pub portal_url: Option<String>,

    /// Epoch seconds, possibly fractional
    #[serde(default, deserialize_with = "null_as_default")]
    pub renewal_time: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,

    // Derived at fetch time, never persisted
    #[serde(default)]
    pub character_usage_formatted: String,

    #[serde(default)]
    pub renewal_time_formatted: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One synthesis call against the provider
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    /// Provider default voice is substituted when absent or empty
    pub voice_id: Option<String>,
    pub message: String,
    pub target_path: PathBuf,
    pub wait_for_completion: bool,
}

/// Result of a completed synthesis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynthesisOutput {
    pub status: String,

    #[serde(rename = "fileName")]
    pub file_name: PathBuf,
}

impl SynthesisOutput {
    pub fn ok(file_name: PathBuf) -> Self {
        Self {
            status: "ok".to_string(),
            file_name,
        }
    }
}

/// Opaque identifier of one synthesis attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobToken(String);

impl JobToken {
    /// Fresh random token; never derived from request content
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for JobToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
