//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::errors::{Result, TranslationError};

/// Credential file names inside the credentials directory
const DEEPL_CREDENTIAL_FILE: &str = "deepl api key.txt";
const GOOGLE_CREDENTIAL_FILE: &str = "google api key.txt";

/// Google Cloud Translation v2 endpoint
pub const GOOGLE_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// DeepL auth key; empty disables the primary provider
    pub deepl_api_key: String,
    /// Google API key; empty disables the fallback provider
    pub google_api_key: String,
    /// Overrides the DeepL base URL derived from the key type
    pub deepl_endpoint: Option<String>,
    pub google_endpoint: String,
    pub max_concurrent: usize,
    pub timeout_ms: u64,
    /// Characters kept in reserve before DeepL is considered exhausted
    pub usage_margin: u64,
    pub credentials_dir: PathBuf,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            deepl_api_key: String::new(),
            google_api_key: String::new(),
            deepl_endpoint: None,
            google_endpoint: GOOGLE_ENDPOINT.to_string(),
            max_concurrent: 6,
            timeout_ms: 30000,
            usage_margin: 10,
            credentials_dir: PathBuf::from("credentials"),
        }
    }
}

/// Read an env var and parse it, falling back to `default` when unset
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| TranslationError::ConfigError {
            message: format!("{} has an invalid value: {}", key, raw),
        }),
        Err(_) => Ok(default),
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            deepl_api_key: std::env::var("DEEPL_API_KEY").unwrap_or_default(),
            google_api_key: std::env::var("GOOGLE_API_KEY").unwrap_or_default(),
            deepl_endpoint: std::env::var("DEEPL_ENDPOINT").ok(),
            google_endpoint: std::env::var("GOOGLE_ENDPOINT").unwrap_or(defaults.google_endpoint),
            max_concurrent: env_or("MAX_CONCURRENT", defaults.max_concurrent)?,
            timeout_ms: env_or("REQUEST_TIMEOUT_MS", defaults.timeout_ms)?,
            usage_margin: env_or("USAGE_MARGIN", defaults.usage_margin)?,
            credentials_dir: std::env::var("CREDENTIALS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.credentials_dir),
        })
    }

    /// Load configuration from the environment, then fill missing keys
    /// from the credential files
    pub fn load() -> Result<Self> {
        let mut config = Self::from_env()?;
        config.fill_from_credentials()?;
        Ok(config)
    }

    /// Fill empty API keys from `<credentials_dir>/*.txt`.
    ///
    /// Missing credential files are created empty so the user knows where
    /// to paste a key.
    pub fn fill_from_credentials(&mut self) -> Result<()> {
        let dir = self.credentials_dir.clone();
        std::fs::create_dir_all(&dir).map_err(|e| TranslationError::file(&dir, e))?;

        if self.deepl_api_key.is_empty() {
            self.deepl_api_key = read_credential(&dir.join(DEEPL_CREDENTIAL_FILE))?;
        }
        if self.google_api_key.is_empty() {
            self.google_api_key = read_credential(&dir.join(GOOGLE_CREDENTIAL_FILE))?;
        }

        info!(
            "Credentials: deepl {}, google {}",
            if self.deepl_api_key.is_empty() { "missing" } else { "found" },
            if self.google_api_key.is_empty() { "missing" } else { "found" },
        );
        Ok(())
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TranslationError::file(path, e))?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.deepl_api_key.is_empty() && self.google_api_key.is_empty() {
            return Err(TranslationError::ConfigError {
                message: "No translation API key found".to_string(),
            });
        }

        if self.max_concurrent == 0 {
            return Err(TranslationError::ConfigError {
                message: "max_concurrent must be greater than 0".to_string(),
            });
        }

        if self.google_endpoint.is_empty() {
            return Err(TranslationError::ConfigError {
                message: "google_endpoint is required".to_string(),
            });
        }

        Ok(())
    }

    /// DeepL base URL: free-tier keys (`:fx`) use the free API host
    pub fn deepl_base_url(&self) -> String {
        match &self.deepl_endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None if self.deepl_api_key.ends_with(":fx") => "https://api-free.deepl.com".to_string(),
            None => "https://api.deepl.com".to_string(),
        }
    }
}

/// Read a trimmed credential, creating an empty file when it does not exist
fn read_credential(path: &Path) -> Result<String> {
    if !path.exists() {
        debug!("Creating empty credential file: {}", path.display());
        std::fs::write(path, "").map_err(|e| TranslationError::file(path, e))?;
        return Ok(String::new());
    }
    let key = std::fs::read_to_string(path).map_err(|e| TranslationError::file(path, e))?;
    Ok(key.trim().to_string())
}
