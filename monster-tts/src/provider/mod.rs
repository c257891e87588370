//! TTS provider implementations

pub mod api;

use crate::error::TtsError;
use crate::types::{SubscriptionStatus, SynthesisOutput, SynthesisRequest, VoiceList};
use async_trait::async_trait;

pub use api::TtsMonsterClient;

/// Trait for remote TTS providers
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Fetch the custom and premade voice sets
    async fn list_voices(&self) -> Result<VoiceList, TtsError>;

    /// Fetch account usage and subscription status, derived fields populated
    async fn fetch_subscription_status(&self) -> Result<SubscriptionStatus, TtsError>;

    /// Synthesize `request.message` into `request.target_path`
    ///
    /// Returns `Ok(None)` without any remote call when the message or the
    /// target path is missing.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Option<SynthesisOutput>, TtsError>;

    /// Get provider name
    fn name(&self) -> &str;
}
