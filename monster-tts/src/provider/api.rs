//! TTS.Monster HTTP API client

use crate::config::{DisplayLocale, TtsMonsterConfig, DEFAULT_ENDPOINT, DEFAULT_VOICE_ID};
use crate::credential::{redact, CredentialContext};
use crate::error::TtsError;
use crate::format::{format_renewal_time, format_usage};
use crate::provider::TtsProvider;
use crate::types::{SubscriptionStatus, SynthesisOutput, SynthesisRequest, VoiceList};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

const MAX_ERROR_BODY_CHARS: usize = 1000;

/// Client for the TTS.Monster console API
///
/// Stateless per call: the credential is read from the shared
/// [`CredentialContext`] on every request.
pub struct TtsMonsterClient {
    client: Client,
    endpoint: String,
    credential: CredentialContext,
    default_voice_id: String,
    locale: DisplayLocale,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    url: String,
}

impl TtsMonsterClient {
    /// Create a client against the public endpoint
    pub fn new(credential: CredentialContext) -> Result<Self, TtsError> {
        Self::with_endpoint(
            DEFAULT_ENDPOINT.to_string(),
            credential,
            DEFAULT_VOICE_ID.to_string(),
            DisplayLocale::default(),
        )
    }

    /// Create a client from integration config
    pub fn from_config(config: &TtsMonsterConfig, credential: CredentialContext) -> Result<Self, TtsError> {
        Self::with_endpoint(
            config.endpoint.clone(),
            credential,
            config.default_voice_id.clone(),
            config.locale.clone(),
        )
    }

    pub fn with_endpoint(
        endpoint: String,
        credential: CredentialContext,
        default_voice_id: String,
        locale: DisplayLocale,
    ) -> Result<Self, TtsError> {
        // No request timeout: a stalled upstream suspends only its own job
        let client = Client::builder()
            .build()
            .map_err(|e| TtsError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credential,
            default_voice_id,
            locale,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST to a provider route with the auth header
    async fn post(&self, route: &str, body: Option<serde_json::Value>) -> Result<Response, TtsError> {
        let url = format!("{}/{}", self.endpoint, route);
        let api_key = self.credential.current();
        debug!("POST {} with key {}", url, redact(&api_key));

        let mut request = self.client.post(&url).header("Authorization", api_key);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TtsError::Remote(format!("/{} request failed: {}", route, e)))?;

        ensure_success(route, response).await
    }

    /// Submit the generate request and stream the resulting audio into `target_path`
    async fn generate_to_file(&self, voice_id: &str, message: &str, target_path: &Path) -> Result<u64, TtsError> {
        // Target is opened before any remote call; a failure later leaves it on disk
        let mut file = tokio::fs::File::create(target_path).await?;

        let response = self
            .post("generate", Some(json!({ "voice_id": voice_id, "message": message })))
            .await?;
        let generated: GenerateResponse = decode(response, "generate").await?;

        let media_url = url::Url::parse(&generated.url)
            .map_err(|e| TtsError::Remote(format!("Invalid media URL '{}': {}", generated.url, e)))?;
        if !matches!(media_url.scheme(), "http" | "https") {
            return Err(TtsError::Remote(format!(
                "Unsupported media URL scheme: {}",
                media_url.scheme()
            )));
        }

        debug!("Downloading generated audio from {}", media_url);
        let media = self.client.get(media_url).send().await?;
        let media = ensure_success("media", media).await?;

        stream_to_file(media, &mut file).await
    }
}

#[async_trait]
impl TtsProvider for TtsMonsterClient {
    async fn list_voices(&self) -> Result<VoiceList, TtsError> {
        let result = async {
            let response = self.post("voices", None).await?;
            decode::<VoiceList>(response, "voices").await
        }
        .await;

        match result {
            Ok(voices) => {
                debug!(
                    "Fetched {} custom and {} premade voices",
                    voices.custom_voices.len(),
                    voices.voices.len()
                );
                Ok(voices)
            }
            Err(e) => {
                error!("Failed to fetch voices: {}", e);
                Err(e)
            }
        }
    }

    async fn fetch_subscription_status(&self) -> Result<SubscriptionStatus, TtsError> {
        let result = async {
            let response = self.post("user", None).await?;
            decode::<SubscriptionStatus>(response, "user").await
        }
        .await;

        match result {
            Ok(mut status) => {
                status.character_usage_formatted = format_usage(status.character_usage, &self.locale);
                status.renewal_time_formatted = format_renewal_time(status.renewal_time, &self.locale);
                Ok(status)
            }
            Err(e) => {
                error!("Failed to fetch subscription data: {}", e);
                Err(e)
            }
        }
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Option<SynthesisOutput>, TtsError> {
        if request.target_path.as_os_str().is_empty() {
            error!("Missing parameter {{fileName}}");
            return Ok(None);
        }
        if request.message.is_empty() {
            error!("Missing parameter {{message}}");
            return Ok(None);
        }

        let voice_id = request
            .voice_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.default_voice_id);

        match self.generate_to_file(voice_id, &request.message, &request.target_path).await {
            Ok(written) => {
                info!(
                    "Synthesized {} bytes with voice {} into {}",
                    written,
                    voice_id,
                    request.target_path.display()
                );
                Ok(Some(SynthesisOutput::ok(request.target_path.clone())))
            }
            Err(e) => {
                error!("Synthesis into {} failed: {}", request.target_path.display(), e);
                Err(e)
            }
        }
    }

    fn name(&self) -> &str {
        "TTS.Monster"
    }
}

/// Map a non-2xx response to a remote error carrying a truncated body
async fn ensure_success(route: &str, response: Response) -> Result<Response, TtsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .map(|s| {
            if s.chars().count() > MAX_ERROR_BODY_CHARS {
                let truncated: String = s.chars().take(MAX_ERROR_BODY_CHARS).collect();
                format!("{}...", truncated)
            } else {
                s
            }
        })
        .unwrap_or_else(|_| "Unknown error".to_string());

    Err(TtsError::Remote(format!("/{} returned {}: {}", route, status, error_text)))
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response, route: &str) -> Result<T, TtsError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| TtsError::Remote(format!("Failed to read /{} response: {}", route, e)))?;
    serde_json::from_slice(&body)
        .map_err(|e| TtsError::Remote(format!("Failed to decode /{} response: {}", route, e)))
}

/// Write the body chunk by chunk as it arrives
async fn stream_to_file(response: Response, file: &mut tokio::fs::File) -> Result<u64, TtsError> {
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk: Bytes = chunk.map_err(|e| TtsError::Remote(format!("Audio stream interrupted: {}", e)))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}
