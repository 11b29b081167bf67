//! Translation provider adapters
//!
//! Both adapters are built once per batch with a fixed language pair and
//! carry no per-call mutable state, so a single `Arc` is shared by every job.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::core::errors::Result;
use crate::core::models::{ProviderKind, UsageSnapshot};

pub mod deepl;
pub mod google;

#[cfg(test)]
pub mod mock;

/// Translates one piece of text with a fixed language pair
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Provider backing this client
    fn kind(&self) -> ProviderKind;

    /// False when the client was built without a credential
    fn is_enabled(&self) -> bool;

    /// Translate `text`, failing with `ProviderUnavailable` when disabled
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Reports remaining quota for a provider
#[async_trait]
pub trait UsageSource: Send + Sync + Debug {
    fn is_enabled(&self) -> bool;

    async fn usage(&self) -> Result<UsageSnapshot>;
}

/// Shared HTTP client with the configured timeout
pub fn http_client(timeout_ms: u64) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_millis(timeout_ms))
        .pool_idle_timeout(Some(std::time::Duration::from_secs(30)))
        .pool_max_idle_per_host(10)
        .build()?;
    Ok(client)
}
