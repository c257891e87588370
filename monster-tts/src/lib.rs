//! monster-tts: TTS.Monster speech synthesis for host automation platforms
//!
//! Provides:
//! - A provider client for the TTS.Monster console API (voices, account, generate)
//! - Sorted voice catalog and formatted subscription status lookups
//! - Fire-and-forget or awaited synthesis jobs tracked by token
//! - Streaming download of generated audio straight to disk

pub mod error;
pub mod config;
pub mod credential;
pub mod types;
pub mod format;
pub mod provider;
pub mod catalog;
pub mod subscription;
pub mod jobs;
pub mod pipeline;
pub mod integration;

pub use error::TtsError;
pub use config::{DisplayLocale, ScriptParameters, TtsMonsterConfig};
pub use credential::CredentialContext;
pub use types::{JobToken, SubscriptionStatus, SynthesisOutput, SynthesisRequest, Voice, VoiceList};
pub use provider::{TtsMonsterClient, TtsProvider};
pub use catalog::VoiceCatalogService;
pub use subscription::SubscriptionService;
pub use jobs::{JobRegistry, JobState, SynthesisJob};
pub use pipeline::SynthesisPipeline;
pub use integration::{
    EffectOutputs, RequestTtsEffect, SubscriptionDataResponse, TtsMonsterIntegration, VoicesResponse,
};
