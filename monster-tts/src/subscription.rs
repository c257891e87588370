//! Subscription status read-through

use crate::error::TtsError;
use crate::provider::TtsProvider;
use crate::types::SubscriptionStatus;
use std::sync::Arc;
use tracing::debug;

/// Account usage and plan status, re-fetched on every call
pub struct SubscriptionService {
    provider: Arc<dyn TtsProvider>,
}

impl SubscriptionService {
    pub fn new(provider: Arc<dyn TtsProvider>) -> Self {
        Self { provider }
    }

    pub async fn get_status(&self) -> Result<SubscriptionStatus, TtsError> {
        let status = self.provider.fetch_subscription_status().await?;
        debug!(
            "Subscription on plan '{}' ({}), {} characters used, renews {}",
            status.current_plan,
            status.status,
            status.character_usage_formatted,
            status.renewal_time_formatted
        );
        Ok(status)
    }
}
