//! Instrumented providers for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{ProviderKind, UsageSnapshot};
use crate::providers::{Translator, UsageSource};

/// Translator stub that records calls and tracks concurrent entries
#[derive(Debug)]
pub struct MockTranslator {
    kind: ProviderKind,
    enabled: bool,
    delay: Duration,
    scripted: HashMap<String, String>,
    failing_inputs: Vec<String>,
    calls: Mutex<Vec<String>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl MockTranslator {
    /// Enabled stub answering `[<kind>] <text>` unless scripted otherwise
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            enabled: true,
            delay: Duration::ZERO,
            scripted: HashMap::new(),
            failing_inputs: Vec::new(),
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn disabled(kind: ProviderKind) -> Self {
        Self {
            enabled: false,
            ..Self::new(kind)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_response(mut self, input: &str, output: &str) -> Self {
        self.scripted.insert(input.to_string(), output.to_string());
        self
    }

    pub fn failing_on(mut self, input: &str) -> Self {
        self.failing_inputs.push(input.to_string());
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Highest number of simultaneous `translate` calls observed
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn translate(&self, text: &str) -> Result<String> {
        if !self.enabled {
            return Err(TranslationError::ProviderUnavailable {
                provider: self.kind.to_string(),
            });
        }
        self.calls.lock().unwrap().push(text.to_string());

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.failing_inputs.iter().any(|f| f == text) {
            return Err(TranslationError::call(self.kind, "scripted failure"));
        }
        Ok(self
            .scripted
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("[{}] {}", self.kind, text)))
    }
}

/// Usage stub replaying scripted snapshots, or failing when none are scripted.
///
/// The last snapshot repeats once the script is exhausted.
#[derive(Debug)]
pub struct MockUsage {
    enabled: bool,
    snapshots: Vec<UsageSnapshot>,
    queries: AtomicUsize,
}

impl MockUsage {
    pub fn new(snapshot: UsageSnapshot) -> Self {
        Self::scripted(vec![snapshot])
    }

    /// Answer the n-th query with the n-th snapshot
    pub fn scripted(snapshots: Vec<UsageSnapshot>) -> Self {
        Self {
            enabled: true,
            snapshots,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self::scripted(Vec::new())
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::failing()
        }
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UsageSource for MockUsage {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn usage(&self) -> Result<UsageSnapshot> {
        let query = self.queries.fetch_add(1, Ordering::SeqCst);
        self.snapshots
            .get(query)
            .or_else(|| self.snapshots.last())
            .cloned()
            .ok_or_else(|| TranslationError::UsageQueryError {
                message: "connection refused".to_string(),
            })
    }
}
