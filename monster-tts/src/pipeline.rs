//! Asynchronous speech-synthesis request pipeline

use crate::credential::CredentialContext;
use crate::error::TtsError;
use crate::jobs::{JobRegistry, SynthesisJob};
use crate::provider::TtsProvider;
use crate::types::{JobToken, SynthesisRequest, Voice};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Turns voice + text into a registered synthesis job
pub struct SynthesisPipeline {
    credential: CredentialContext,
    provider: Arc<dyn TtsProvider>,
    registry: JobRegistry,
    output_dir: PathBuf,
}

impl SynthesisPipeline {
    pub fn new(
        credential: CredentialContext,
        provider: Arc<dyn TtsProvider>,
        registry: JobRegistry,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            credential,
            provider,
            registry,
            output_dir,
        }
    }

    /// Request synthesis; never fails to the caller
    ///
    /// Returns the job token, or `None` when a precondition fails, the working
    /// directory cannot be prepared, or (when waiting) the job itself fails.
    /// Without `wait_for_generation` a later failure is only visible through
    /// the registered job.
    pub async fn request_tts(&self, voice: &Voice, text: &str, wait_for_generation: bool) -> Option<JobToken> {
        self.try_request_tts(voice, text, wait_for_generation).await.ok()
    }

    /// Same as [`request_tts`](Self::request_tts) but reports why it failed.
    /// Every failure is logged here.
    pub async fn try_request_tts(
        &self,
        voice: &Voice,
        text: &str,
        wait_for_generation: bool,
    ) -> Result<JobToken, TtsError> {
        if !self.credential.is_configured() {
            error!("No API key or Voice ID specified.");
            return Err(TtsError::Configuration("No API key specified".to_string()));
        }

        if voice.voice_id.is_empty() {
            error!("No API key or Voice ID specified.");
            return Err(TtsError::Validation("No Voice ID specified".to_string()));
        }

        if text.is_empty() {
            error!("No text specified.");
            return Err(TtsError::Validation("No text specified".to_string()));
        }

        let token = JobToken::generate();

        // Directory failures never reach the provider
        if let Err(e) = tokio::fs::create_dir_all(&self.output_dir).await {
            error!("Unable to prepare temp folder {}: {}", self.output_dir.display(), e);
            return Err(TtsError::Filesystem(e));
        }
        let target_path = self.output_dir.join(format!("{}.wav", token));

        self.registry.evict_expired();

        let request = SynthesisRequest {
            voice_id: Some(voice.voice_id.clone()),
            message: text.to_string(),
            target_path: target_path.clone(),
            wait_for_completion: wait_for_generation,
        };

        let provider = Arc::clone(&self.provider);
        let job = SynthesisJob::spawn(token.clone(), target_path, async move {
            provider.synthesize(&request).await
        });

        // Registered before deciding whether to wait
        self.registry.register(token.clone(), job.clone());
        info!("Synthesis job {} started with voice {}", token, voice.voice_id);

        if wait_for_generation {
            if let Err(e) = job.wait().await {
                error!("Unable to save TTS for job {}: {}", token, e);
                return Err(clone_error(&e));
            }
            debug!("Synthesis job {} completed", token);
        }

        Ok(token)
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Shared job failures are re-raised to the waiting caller as owned errors
fn clone_error(err: &TtsError) -> TtsError {
    match err {
        TtsError::Configuration(msg) => TtsError::Configuration(msg.clone()),
        TtsError::Validation(msg) => TtsError::Validation(msg.clone()),
        TtsError::Remote(msg) => TtsError::Remote(msg.clone()),
        TtsError::Filesystem(e) => TtsError::Filesystem(std::io::Error::new(e.kind(), e.to_string())),
    }
}
