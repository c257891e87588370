//! Host-facing boundary operations
//!
//! The host automation platform calls these as plain request/response
//! operations. Voice and subscription lookups never raise: failures are
//! logged and reported through the `error` flag.

use crate::catalog::VoiceCatalogService;
use crate::config::{ScriptParameters, TtsMonsterConfig};
use crate::credential::CredentialContext;
use crate::error::TtsError;
use crate::jobs::{JobRegistry, SynthesisJob};
use crate::pipeline::SynthesisPipeline;
use crate::provider::{TtsMonsterClient, TtsProvider};
use crate::subscription::SubscriptionService;
use crate::types::{JobToken, SubscriptionStatus, SynthesisOutput, Voice};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Reply to "get voices"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VoicesResponse {
    pub error: bool,
    pub voices: Vec<Voice>,
}

/// Reply to "get subscription data"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SubscriptionDataResponse {
    pub error: bool,

    #[serde(rename = "subscriptionData")]
    pub subscription_data: Option<SubscriptionStatus>,
}

/// A "request TTS" effect as configured by the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RequestTtsEffect {
    #[serde(default)]
    pub voice: Voice,

    #[serde(default)]
    pub text: String,

    #[serde(rename = "waitForGeneration", default)]
    pub wait_for_generation: bool,
}

/// Outputs of a successful "request TTS" effect
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectOutputs {
    #[serde(rename = "ttsToken")]
    pub tts_token: JobToken,
}

/// TTS.Monster integration wired for one host process
pub struct TtsMonsterIntegration {
    parameters: RwLock<ScriptParameters>,
    credential: CredentialContext,
    catalog: VoiceCatalogService,
    subscription: SubscriptionService,
    pipeline: SynthesisPipeline,
}

impl TtsMonsterIntegration {
    /// Create the integration against the configured endpoint
    pub fn new(config: TtsMonsterConfig) -> Result<Self, TtsError> {
        config.validate().map_err(TtsError::Configuration)?;

        let credential = CredentialContext::new(config.api_key.clone());
        let client = TtsMonsterClient::from_config(&config, credential.clone())?;
        Ok(Self::assemble(config, credential, Arc::new(client)))
    }

    /// Create the integration around any provider implementation
    pub fn with_provider(config: TtsMonsterConfig, provider: Arc<dyn TtsProvider>) -> Result<Self, TtsError> {
        config.validate().map_err(TtsError::Configuration)?;

        let credential = CredentialContext::new(config.api_key.clone());
        Ok(Self::assemble(config, credential, provider))
    }

    fn assemble(config: TtsMonsterConfig, credential: CredentialContext, provider: Arc<dyn TtsProvider>) -> Self {
        let registry = JobRegistry::new(config.job_retention());
        let pipeline = SynthesisPipeline::new(
            credential.clone(),
            Arc::clone(&provider),
            registry,
            config.output_dir.clone(),
        );

        info!(
            "TTS.Monster integration ready (provider {}, output {})",
            provider.name(),
            config.output_dir.display()
        );

        Self {
            parameters: RwLock::new(config.parameters()),
            credential,
            catalog: VoiceCatalogService::new(Arc::clone(&provider)),
            subscription: SubscriptionService::new(provider),
            pipeline,
        }
    }

    /// The host pushed new parameter values
    pub fn parameters_updated(&self, parameters: ScriptParameters) {
        self.credential.configure(parameters.api_key.clone());
        *self.parameters.write() = parameters;
    }

    pub fn parameters(&self) -> ScriptParameters {
        self.parameters.read().clone()
    }

    pub fn credential(&self) -> &CredentialContext {
        &self.credential
    }

    /// "get voices"
    pub async fn get_voices(&self, show_premade: bool) -> VoicesResponse {
        match self.catalog.list_voices(show_premade).await {
            Ok(voices) => VoicesResponse { error: false, voices },
            Err(e) => {
                error!("Unable to fetch voices: {}", e);
                VoicesResponse {
                    error: true,
                    voices: Vec::new(),
                }
            }
        }
    }

    /// "get voices" using the stored show-premade parameter
    pub async fn get_configured_voices(&self) -> VoicesResponse {
        let show_premade = self.parameters.read().show_premade_voices;
        self.get_voices(show_premade).await
    }

    /// "get subscription data"
    pub async fn get_subscription_data(&self) -> SubscriptionDataResponse {
        match self.subscription.get_status().await {
            Ok(status) => SubscriptionDataResponse {
                error: false,
                subscription_data: Some(status),
            },
            Err(e) => {
                error!("Unable to fetch subscription data: {}", e);
                SubscriptionDataResponse {
                    error: true,
                    subscription_data: None,
                }
            }
        }
    }

    /// Option checks shown to the user before an effect is saved
    pub fn validate_effect(&self, effect: &RequestTtsEffect) -> Vec<String> {
        let mut errors = Vec::new();
        if effect.text.is_empty() {
            errors.push("Please provide text to synthesize.".to_string());
        }
        errors
    }

    /// "request TTS"; `None` signals failure to the host
    pub async fn request_tts(&self, effect: &RequestTtsEffect) -> Option<EffectOutputs> {
        self.pipeline
            .request_tts(&effect.voice, &effect.text, effect.wait_for_generation)
            .await
            .map(|tts_token| EffectOutputs { tts_token })
    }

    pub fn job(&self, token: &JobToken) -> Option<SynthesisJob> {
        self.pipeline.registry().get(token)
    }

    /// Await a job started earlier; `None` when the token is unknown
    pub async fn await_job(&self, token: &JobToken) -> Option<Result<Option<SynthesisOutput>, Arc<TtsError>>> {
        let job = self.job(token)?;
        Some(job.wait().await)
    }

    /// The consumer is done with a job
    pub fn acknowledge_job(&self, token: &JobToken) -> Option<SynthesisJob> {
        self.pipeline.registry().remove(token)
    }

    pub fn evict_expired_jobs(&self) -> usize {
        self.pipeline.registry().evict_expired()
    }

    pub fn pipeline(&self) -> &SynthesisPipeline {
        &self.pipeline
    }
}
