//! Quota checks against the primary provider's usage endpoint

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::errors::Result;
use crate::core::models::{group_thousands, UsageSnapshot};
use crate::providers::UsageSource;

/// Gate deciding whether the primary provider may take more work
#[derive(Debug, Clone)]
pub struct QuotaGate {
    source: Arc<dyn UsageSource>,
    margin: u64,
}

impl QuotaGate {
    /// Create a gate keeping `margin` characters in reserve
    pub fn new(source: Arc<dyn UsageSource>, margin: u64) -> Self {
        Self { source, margin }
    }

    /// Whether a snapshot leaves room for another translation
    pub fn permits(&self, usage: &UsageSnapshot) -> bool {
        if usage.any_limit_reached {
            return false;
        }
        match usage.character {
            Some(counter) => counter.remaining() > self.margin,
            None => true,
        }
    }

    /// Query usage and apply `permits`; errors from the usage endpoint propagate
    pub async fn check(&self) -> Result<bool> {
        if !self.source.is_enabled() {
            return Ok(false);
        }
        let usage = self.source.usage().await?;
        Ok(self.permits(&usage))
    }

    /// True only when the primary is enabled and has quota left.
    ///
    /// An unknown quota counts as exhausted.
    pub async fn is_usable(&self) -> bool {
        match self.check().await {
            Ok(usable) => usable,
            Err(e) => {
                warn!("Usage check failed, assuming quota exhausted: {}", e);
                false
            }
        }
    }

    /// Log the current usage of the primary provider
    pub async fn report_usage(&self) {
        if !self.source.is_enabled() {
            debug!("Primary provider disabled, no usage to report");
            return;
        }

        let usage = match self.source.usage().await {
            Ok(usage) => usage,
            Err(e) => {
                warn!("Could not fetch usage: {}", e);
                return;
            }
        };

        if usage.any_limit_reached {
            warn!("DeepL translation limit reached.");
        }
        if let Some(chars) = usage.character {
            info!(
                "DeepL character usage: {} of {}",
                group_thousands(chars.count),
                group_thousands(chars.limit)
            );
        }
        if let Some(docs) = usage.document {
            info!("DeepL document usage: {} of {}", docs.count, docs.limit);
        }
    }
}
