//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Provider was constructed without a credential
    #[error("Provider unavailable: {provider} has no API key configured")]
    ProviderUnavailable {
        provider: String,
    },

    /// Translate call failed (network, API status or response shape)
    #[error("{provider} call failed: {message}")]
    ProviderCallError {
        provider: String,
        message: String,
    },

    /// Usage endpoint could not be queried
    #[error("Usage query failed: {message}")]
    UsageQueryError {
        message: String,
    },

    /// File operation error
    #[error("File error: {path} - {message}")]
    FileError {
        path: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Worker task ended without producing an outcome
    #[error("Job aborted: {0}")]
    JobAborted(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TranslationError {
    /// Build a `ProviderCallError` for the given provider
    pub fn call(provider: impl ToString, message: impl ToString) -> Self {
        TranslationError::ProviderCallError {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }

    /// Build a `FileError` for the given path
    pub fn file(path: &std::path::Path, err: impl ToString) -> Self {
        TranslationError::FileError {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
