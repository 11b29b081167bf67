//! DeepL API client (primary provider)

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::languages;
use crate::core::models::{ProviderKind, UsageCounter, UsageSnapshot};
use crate::providers::{Translator, UsageSource};

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct UsageResponse {
    character_count: Option<u64>,
    character_limit: Option<u64>,
    document_count: Option<u64>,
    document_limit: Option<u64>,
}

impl UsageResponse {
    fn into_snapshot(self) -> UsageSnapshot {
        let character = match (self.character_count, self.character_limit) {
            (Some(count), Some(limit)) => Some(UsageCounter::new(count, limit)),
            _ => None,
        };
        let document = match (self.document_count, self.document_limit) {
            (Some(count), Some(limit)) => Some(UsageCounter::new(count, limit)),
            _ => None,
        };
        let any_limit_reached = [character, document]
            .iter()
            .flatten()
            .any(|c| c.limit_reached());

        UsageSnapshot {
            character,
            document,
            any_limit_reached,
        }
    }
}

/// DeepL client bound to one language pair
#[derive(Debug, Clone)]
pub struct DeeplClient {
    client: reqwest::Client,
    auth_key: String,
    base_url: String,
    source_lang: String,
    target_lang: String,
}

impl DeeplClient {
    /// Create a client; an empty key leaves it disabled
    pub fn new(
        config: &TranslatorConfig,
        client: reqwest::Client,
        source_lang: &str,
        target_lang: &str,
    ) -> Self {
        Self {
            client,
            auth_key: config.deepl_api_key.clone(),
            base_url: config.deepl_base_url(),
            source_lang: languages::deepl_source(source_lang),
            target_lang: languages::normalize(ProviderKind::Deepl, target_lang),
        }
    }

    fn ensure_enabled(&self) -> Result<()> {
        if self.auth_key.is_empty() {
            return Err(TranslationError::ProviderUnavailable {
                provider: ProviderKind::Deepl.to_string(),
            });
        }
        Ok(())
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.auth_key)
    }
}

#[async_trait]
impl Translator for DeeplClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Deepl
    }

    fn is_enabled(&self) -> bool {
        !self.auth_key.is_empty()
    }

    async fn translate(&self, text: &str) -> Result<String> {
        self.ensure_enabled()?;

        let params = [
            ("text", text),
            ("source_lang", self.source_lang.as_str()),
            ("target_lang", self.target_lang.as_str()),
        ];
        let response = self
            .client
            .post(format!("{}/v2/translate", self.base_url))
            .header("Authorization", self.auth_header())
            .form(&params)
            .send()
            .await
            .map_err(|e| TranslationError::call(ProviderKind::Deepl, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::call(
                ProviderKind::Deepl,
                format!("HTTP {}: {}", status.as_u16(), body),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranslationError::call(ProviderKind::Deepl, e))?;
        parse_translation(&body)
    }
}

#[async_trait]
impl UsageSource for DeeplClient {
    fn is_enabled(&self) -> bool {
        Translator::is_enabled(self)
    }

    async fn usage(&self) -> Result<UsageSnapshot> {
        self.ensure_enabled()?;

        let response = self
            .client
            .get(format!("{}/v2/usage", self.base_url))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| TranslationError::UsageQueryError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::UsageQueryError {
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response.text().await.map_err(|e| TranslationError::UsageQueryError {
            message: e.to_string(),
        })?;
        debug!("DeepL usage response: {}", body);
        parse_usage(&body)
    }
}

fn parse_translation(body: &str) -> Result<String> {
    let parsed: TranslateResponse = serde_json::from_str(body)
        .map_err(|e| TranslationError::call(ProviderKind::Deepl, format!("invalid response: {}", e)))?;
    parsed
        .translations
        .into_iter()
        .next()
        .map(|t| t.text)
        .ok_or_else(|| TranslationError::call(ProviderKind::Deepl, "no translation in response"))
}

fn parse_usage(body: &str) -> Result<UsageSnapshot> {
    let parsed: UsageResponse = serde_json::from_str(body).map_err(|e| TranslationError::UsageQueryError {
        message: format!("invalid usage response: {}", e),
    })?;
    Ok(parsed.into_snapshot())
}
