//! DeepL translation client.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::domain::translation::{TranslatedSegment, TranslationResponse};
use crate::error::ExternalServiceError;

pub const SERVICE: &str = "DeepL";

/// Machine translation of a single text block.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<TranslationResponse, ExternalServiceError>;
}

/// Client for the DeepL v2 translate endpoint.
#[derive(Clone)]
pub struct DeepLClient {
    client: Client,
    api_url: String,
    api_key: String,
}

/// DeepL body, covering both the success and the error shapes.
#[derive(Debug, Deserialize)]
struct DeepLBody {
    #[serde(default)]
    translations: Vec<TranslatedSegment>,
    #[serde(default)]
    error: Option<DeepLErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeepLErrorDetail {
    message: String,
}

impl DeepLClient {
    pub fn new(api_url: &str, api_key: &str, timeout_seconds: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(api_url = api_url, "DeepL client initialized");

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Form-encoded POST with the key in a `DeepL-Auth-Key` authorization header.
    fn translate_request(&self, text: &str, target_lang: &str) -> RequestBuilder {
        self.client
            .post(&self.api_url)
            .header(AUTHORIZATION, format!("DeepL-Auth-Key {}", self.api_key))
            .form(&[("text", text), ("target_lang", target_lang)])
    }
}

#[async_trait]
impl Translator for DeepLClient {
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<TranslationResponse, ExternalServiceError> {
        debug!(url = %self.api_url, "DeepL request");

        let response = self
            .translate_request(text, target_lang)
            .send()
            .await
            .map_err(|source| {
                error!(error = %source, "DeepL request failed");
                ExternalServiceError::Transport {
                    service: SERVICE,
                    source,
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ExternalServiceError::Transport {
                service: SERVICE,
                source,
            })?;

        parse_translation(status, &body)
    }
}

fn parse_translation(status: StatusCode, body: &str) -> Result<TranslationResponse, ExternalServiceError> {
    let parsed: Option<DeepLBody> = serde_json::from_str(body).ok();

    if let Some(DeepLBody {
        error: Some(detail),
        ..
    }) = &parsed
    {
        return Err(ExternalServiceError::Provider {
            service: SERVICE,
            message: detail.message.clone(),
        });
    }

    if !status.is_success() {
        let message = parsed
            .and_then(|b| b.message)
            .unwrap_or_else(|| format!("HTTP {}", status));
        error!(status = %status, message = %message, "DeepL error");
        return Err(ExternalServiceError::Provider {
            service: SERVICE,
            message,
        });
    }

    let parsed = parsed.ok_or_else(|| ExternalServiceError::InvalidResponse {
        service: SERVICE,
        message: "body is not a translation payload".to_string(),
    })?;

    if parsed.translations.is_empty() {
        return Err(ExternalServiceError::InvalidResponse {
            service: SERVICE,
            message: "no translations returned".to_string(),
        });
    }

    Ok(TranslationResponse {
        translations: parsed.translations,
    })
}
