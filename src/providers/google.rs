//! Google Cloud Translation v2 client (fallback provider)

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::languages;
use crate::core::models::ProviderKind;
use crate::providers::Translator;

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Google client bound to one language pair
#[derive(Debug, Clone)]
pub struct GoogleClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    source_lang: String,
    target_lang: String,
}

impl GoogleClient {
    /// Create a client; an empty key leaves it disabled
    pub fn new(
        config: &TranslatorConfig,
        client: reqwest::Client,
        source_lang: &str,
        target_lang: &str,
    ) -> Self {
        Self {
            client,
            api_key: config.google_api_key.clone(),
            endpoint: config.google_endpoint.clone(),
            source_lang: languages::normalize(ProviderKind::Google, source_lang),
            target_lang: languages::normalize(ProviderKind::Google, target_lang),
        }
    }
}

#[async_trait]
impl Translator for GoogleClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn translate(&self, text: &str) -> Result<String> {
        if !self.is_enabled() {
            return Err(TranslationError::ProviderUnavailable {
                provider: ProviderKind::Google.to_string(),
            });
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", text),
                ("source", self.source_lang.as_str()),
                ("target", self.target_lang.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TranslationError::call(ProviderKind::Google, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::call(
                ProviderKind::Google,
                format!("HTTP {}: {}", status.as_u16(), body),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranslationError::call(ProviderKind::Google, e))?;
        parse_translation(&body)
    }
}

/// Extract the first translation and decode the HTML entities Google returns
fn parse_translation(body: &str) -> Result<String> {
    let parsed: TranslateResponse = serde_json::from_str(body)
        .map_err(|e| TranslationError::call(ProviderKind::Google, format!("invalid response: {}", e)))?;
    let text = parsed
        .data
        .translations
        .into_iter()
        .next()
        .map(|t| t.translated_text)
        .ok_or_else(|| TranslationError::call(ProviderKind::Google, "no translation in response"))?;
    Ok(html_escape::decode_html_entities(&text).into_owned())
}
