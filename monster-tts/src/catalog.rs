//! Voice catalog read-through

use crate::error::TtsError;
use crate::format::compare_display_names;
use crate::provider::TtsProvider;
use crate::types::Voice;
use std::sync::Arc;
use tracing::debug;

/// Combined, sorted voice catalog
///
/// Recomputed on every call; nothing is cached between fetches.
pub struct VoiceCatalogService {
    provider: Arc<dyn TtsProvider>,
}

impl VoiceCatalogService {
    pub fn new(provider: Arc<dyn TtsProvider>) -> Self {
        Self { provider }
    }

    /// Custom voices first, then premade voices when `show_premade` is set.
    /// Each set is sorted by display name; no deduplication across sets.
    pub async fn list_voices(&self, show_premade: bool) -> Result<Vec<Voice>, TtsError> {
        let list = self.provider.list_voices().await?;

        let mut combined = sort_voices(list.custom_voices);
        if show_premade {
            combined.extend(sort_voices(list.voices));
        }

        debug!(
            "Voice catalog from {}: {} entries (premade {})",
            self.provider.name(),
            combined.len(),
            if show_premade { "included" } else { "excluded" }
        );
        Ok(combined)
    }
}

/// Stable ascending sort by display name
pub fn sort_voices(mut voices: Vec<Voice>) -> Vec<Voice> {
    voices.sort_by(|a, b| compare_display_names(&a.name, &b.name));
    voices
}
