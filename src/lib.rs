//! Subtitle Translator - batch `.srt` translation library
//!
//! Translates subtitle files line by line with DeepL while its quota lasts
//! and Google Cloud Translation otherwise, running many files concurrently.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod processors;
pub mod providers;

// Re-export key types for convenience
pub use crate::core::{
    config::TranslatorConfig,
    dispatcher::JobDispatcher,
    errors::TranslationError,
    guard::RetranslationGuard,
    models::{BatchReport, JobOutcome, ProviderKind, ProviderSelection, TranslationJob, UsageSnapshot},
    quota::QuotaGate,
};

pub use processors::subtitle::SubtitleProcessor;
pub use providers::{deepl::DeeplClient, google::GoogleClient, Translator, UsageSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
