//! Shared API credential

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error};

/// Holds the single active API credential
///
/// Clones share the same slot. Every outbound call reads the current value,
/// so a reconfiguration is picked up by the next request.
#[derive(Clone, Default)]
pub struct CredentialContext {
    api_key: Arc<RwLock<String>>,
}

impl CredentialContext {
    pub fn new(api_key: impl Into<String>) -> Self {
        let context = Self::default();
        context.configure(api_key);
        context
    }

    /// Replace the active credential, empty values included
    pub fn configure(&self, api_key: impl Into<String>) {
        let api_key: String = api_key.into();

        if api_key.is_empty() {
            error!("Missing API key");
        } else {
            debug!("API key configured ({})", redact(&api_key));
        }

        *self.api_key.write() = api_key;
    }

    pub fn current(&self) -> String {
        self.api_key.read().clone()
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.read().is_empty()
    }
}

impl std::fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialContext")
            .field("api_key", &redact(&self.current()))
            .finish()
    }
}

/// Never log a full key
pub(crate) fn redact(api_key: &str) -> String {
    if api_key.is_empty() {
        return "<empty>".to_string();
    }
    let prefix: String = api_key.chars().take(4).collect();
    if prefix.len() == api_key.len() {
        "***".to_string()
    } else {
        format!("{}***", prefix)
    }
}
