//! Shared test doubles

#![allow(dead_code)]

use async_trait::async_trait;
use monster_tts::config::DEFAULT_VOICE_ID;
use monster_tts::{
    CredentialContext, DisplayLocale, SubscriptionStatus, SynthesisOutput, SynthesisRequest, TtsError,
    TtsMonsterClient, TtsProvider, Voice, VoiceList,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// In-memory provider that records every call
#[derive(Default)]
pub struct FakeProvider {
    pub voice_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub synth_calls: AtomicUsize,
    pub voices: VoiceList,
    pub status: SubscriptionStatus,
    pub audio: Vec<u8>,
    pub fail_synthesis: bool,
    pub fail_lookups: bool,
    /// Synthesis blocks until notified
    pub gate: Option<Arc<Notify>>,
    pub requests: Mutex<Vec<SynthesisRequest>>,
}

impl FakeProvider {
    pub fn with_audio(audio: &[u8]) -> Self {
        Self {
            audio: audio.to_vec(),
            ..Default::default()
        }
    }

    pub fn network_calls(&self) -> usize {
        self.voice_calls.load(Ordering::SeqCst)
            + self.status_calls.load(Ordering::SeqCst)
            + self.synth_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TtsProvider for FakeProvider {
    async fn list_voices(&self) -> Result<VoiceList, TtsError> {
        self.voice_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups {
            return Err(TtsError::Remote("voices unavailable".to_string()));
        }
        Ok(self.voices.clone())
    }

    async fn fetch_subscription_status(&self) -> Result<SubscriptionStatus, TtsError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups {
            return Err(TtsError::Remote("user unavailable".to_string()));
        }
        Ok(self.status.clone())
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Option<SynthesisOutput>, TtsError> {
        self.synth_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_synthesis {
            return Err(TtsError::Remote("generate failed: connection reset".to_string()));
        }

        tokio::fs::write(&request.target_path, &self.audio).await?;
        Ok(Some(SynthesisOutput::ok(request.target_path.clone())))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub fn voice(name: &str) -> Voice {
    Voice::new(format!("id-{}", name.to_lowercase()), name)
}

pub fn names(voices: &[Voice]) -> Vec<&str> {
    voices.iter().map(|v| v.name.as_str()).collect()
}

/// Real HTTP client pointed at a mock server
pub fn client_for(endpoint: &str, api_key: &str) -> TtsMonsterClient {
    TtsMonsterClient::with_endpoint(
        endpoint.to_string(),
        CredentialContext::new(api_key),
        DEFAULT_VOICE_ID.to_string(),
        DisplayLocale::utc(),
    )
    .unwrap()
}
