//! Configuration for the TTS.Monster integration

use crate::error::TtsError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Public TTS.Monster API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.console.tts.monster";

/// Voice used when a synthesis request carries no voice id ("Nova")
pub const DEFAULT_VOICE_ID: &str = "0993f688-6719-4cf6-9769-fee7b77b1df5";

const MAX_JOB_RETENTION_SECS: u64 = 30 * 24 * 60 * 60;

/// Integration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsMonsterConfig {
    /// TTS.Monster API key (empty until the user provides one)
    pub api_key: String,

    /// Include premade voices in the catalog
    pub show_premade_voices: bool,

    /// Provider base URL
    pub endpoint: String,

    /// Voice id substituted when a request carries none
    pub default_voice_id: String,

    /// Working directory for generated audio files
    pub output_dir: PathBuf,

    /// How long finished jobs stay in the registry (None = until removed)
    pub job_retention_secs: Option<u64>,

    /// Display formatting for subscription data
    pub locale: DisplayLocale,
}

/// Locale conventions used for the derived subscription fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayLocale {
    /// Thousands separator
    pub grouping_separator: String,

    /// chrono strftime pattern for date-times
    pub date_time_format: String,

    /// Fixed offset from UTC in minutes; host local time when unset
    pub utc_offset_minutes: Option<i32>,
}

/// User-editable parameters, replaced wholesale on every update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScriptParameters {
    pub api_key: String,
    pub show_premade_voices: bool,
}

impl Default for TtsMonsterConfig {
    fn default() -> Self {
        let output_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("monster-tts")
            .join("tmp");

        Self {
            api_key: String::new(),
            show_premade_voices: true,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_voice_id: DEFAULT_VOICE_ID.to_string(),
            output_dir,
            job_retention_secs: Some(3600),
            locale: DisplayLocale::default(),
        }
    }
}

impl Default for DisplayLocale {
    fn default() -> Self {
        // en-US conventions
        Self {
            grouping_separator: ",".to_string(),
            date_time_format: "%-m/%-d/%Y, %-I:%M:%S %p".to_string(),
            utc_offset_minutes: None,
        }
    }
}

impl Default for ScriptParameters {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            show_premade_voices: true,
        }
    }
}

impl DisplayLocale {
    pub fn utc() -> Self {
        Self {
            utc_offset_minutes: Some(0),
            ..Self::default()
        }
    }

    /// Validate locale settings
    pub fn validate(&self) -> Result<(), String> {
        if self.grouping_separator.chars().count() > 4 {
            return Err("Grouping separator too long (max 4 chars)".to_string());
        }

        if self.date_time_format.is_empty() {
            return Err("Date-time format cannot be empty".to_string());
        }

        if let Some(offset) = self.utc_offset_minutes {
            // chrono::FixedOffset accepts strictly less than one day
            if offset.abs() >= 24 * 60 {
                return Err("UTC offset must be within +/- 24 hours".to_string());
            }
        }

        Ok(())
    }
}

impl TtsMonsterConfig {
    /// Load configuration from a file (JSON, TOML or YAML)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TtsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
            .map_err(|e| TtsError::Configuration(format!("{}: {}", path.display(), e)))
    }

    /// Load configuration from string
    pub fn from_str(content: &str) -> Result<Self, TtsError> {
        if let Ok(config) = serde_json::from_str::<TtsMonsterConfig>(content) {
            return Ok(config);
        }

        if let Ok(config) = toml::from_str::<TtsMonsterConfig>(content) {
            return Ok(config);
        }

        if let Ok(config) = serde_yaml::from_str::<TtsMonsterConfig>(content) {
            return Ok(config);
        }

        Err(TtsError::Configuration("Unknown configuration format".to_string()))
    }

    /// Override fields from environment variables
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("TTS_MONSTER_API_KEY") {
            self.api_key = key;
        }

        if let Ok(endpoint) = std::env::var("TTS_MONSTER_ENDPOINT") {
            self.endpoint = endpoint;
        }

        if let Ok(dir) = std::env::var("TTS_MONSTER_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }

        if let Ok(flag) = std::env::var("TTS_MONSTER_SHOW_PREMADE") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.show_premade_voices = true,
                "0" | "false" | "no" | "off" => self.show_premade_voices = false,
                other => warn!("Ignoring invalid TTS_MONSTER_SHOW_PREMADE value '{}'", other),
            }
        }
    }

    /// Configuration from defaults plus environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn parameters(&self) -> ScriptParameters {
        ScriptParameters {
            api_key: self.api_key.clone(),
            show_premade_voices: self.show_premade_voices,
        }
    }

    pub fn job_retention(&self) -> Option<Duration> {
        self.job_retention_secs.map(Duration::from_secs)
    }

    /// Validate configuration
    ///
    /// An empty API key is valid here; it only fails at the point of use.
    pub fn validate(&self) -> Result<(), String> {
        let endpoint = url::Url::parse(&self.endpoint)
            .map_err(|e| format!("Invalid endpoint URL: {}", e))?;

        match endpoint.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(format!(
                    "Unsupported endpoint scheme: {}. Only http:// and https:// are allowed.",
                    scheme
                ))
            }
        }

        if endpoint.host_str().is_none() {
            return Err("Endpoint URL must include a host".to_string());
        }

        if self.default_voice_id.is_empty() {
            return Err("Default voice id cannot be empty".to_string());
        }

        if self.default_voice_id.chars().any(|c| c.is_control()) {
            return Err("Default voice id contains invalid characters".to_string());
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err("Output directory cannot be empty".to_string());
        }

        if self
            .output_dir
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err("Output directory path cannot contain '..'".to_string());
        }

        if let Some(secs) = self.job_retention_secs {
            if secs > MAX_JOB_RETENTION_SECS {
                return Err(format!(
                    "Job retention too long (max {} seconds)",
                    MAX_JOB_RETENTION_SECS
                ));
            }
        }

        self.locale.validate()?;

        Ok(())
    }
}
