//! DeepL translation client.
//!
//! One `POST /v2/translate` per call. No retries and no caching: a failed
//! translation surfaces to the caller with the upstream body attached.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{TranslationError, Translator};

const FREE_API_URL: &str = "https://api-free.deepl.com";
const PRO_API_URL: &str = "https://api.deepl.com";

/// Free-plan keys carry this suffix and are only valid on the free endpoint.
const FREE_KEY_SUFFIX: &str = ":fx";

#[derive(Clone)]
pub struct DeepLTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl DeepLTranslator {
    pub fn new(api_key: &str, api_url: Option<&str>) -> Result<Self, TranslationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        let api_url = api_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| default_api_url(api_key).to_string());

        Ok(Self {
            client,
            api_url,
            api_key: api_key.to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Pick the DeepL endpoint that accepts this key.
pub fn default_api_url(api_key: &str) -> &'static str {
    if api_key.ends_with(FREE_KEY_SUFFIX) {
        FREE_API_URL
    } else {
        PRO_API_URL
    }
}

#[derive(Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

#[async_trait]
impl Translator for DeepLTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        let target = target_language.to_uppercase();
        let params = [("text", text), ("target_lang", target.as_str())];

        let resp = self
            .client
            .post(format!("{}/v2/translate", self.api_url))
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "deepl rejected translation request");
            return Err(TranslationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranslateResponse = resp.json().await?;
        let first = parsed
            .translations
            .into_iter()
            .next()
            .ok_or(TranslationError::Empty)?;

        tracing::debug!(
            target_lang = %target,
            source_lang = first.detected_source_language.as_deref().unwrap_or("unknown"),
            chars = text.chars().count(),
            "translated release notes"
        );

        Ok(first.text)
    }
}
