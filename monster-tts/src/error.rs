//! Error types for monster-tts

use thiserror::Error;

/// TTS integration errors
#[derive(Error, Debug)]
pub enum TtsError {
    /// Missing or empty credential at the point of use, or an invalid config
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing required call parameters, detected before any remote call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network failure, non-2xx response or undecodable body from the provider
    #[error("Remote error: {0}")]
    Remote(String),

    /// Working directory or target file could not be created or written
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),
}

impl From<reqwest::Error> for TtsError {
    fn from(err: reqwest::Error) -> Self {
        TtsError::Remote(format!("HTTP request failed: {}", err))
    }
}

impl TtsError {
    pub fn is_remote(&self) -> bool {
        matches!(self, TtsError::Remote(_))
    }
}
