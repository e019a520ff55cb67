//! OpenAI chat-completion client that rewrites Japanese text at N5 level.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::error::ExternalServiceError;

const SERVICE: &str = "OpenAI";

/// Output cap for every simplification request.
pub const MAX_SIMPLIFIED_TOKENS: u32 = 200;

/// Persona: a kind assistant who writes easy Japanese for N5-level foreign learners.
pub const SYSTEM_PROMPT: &str = "わかりやすい日本語を書くのが得意な親切なアシスタントさんですね。特にn-5レベルの外国人向けの文章を得意としています。";

/// Instruction prefix: rewrite the following text as simple N5-level text.
pub const REWRITE_INSTRUCTION: &str = "以下の文章を、N5レベルの簡単な文章に書き換える。";

/// Rewrites already-translated Japanese into simplified Japanese.
#[async_trait]
pub trait Simplifier: Send + Sync {
    async fn simplify(&self, text: &str) -> Result<String, ExternalServiceError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

fn build_request<'a>(model: &'a str, text: &str) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user",
                content: format!("{}: {}", REWRITE_INSTRUCTION, text),
            },
        ],
        max_tokens: MAX_SIMPLIFIED_TOKENS,
    }
}

fn parse_completion(status: StatusCode, body: &str) -> Result<String, ExternalServiceError> {
    if !status.is_success() {
        let message = serde_json::from_str::<OpenAiErrorBody>(body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| format!("HTTP {}", status));
        return Err(ExternalServiceError::Provider {
            service: SERVICE,
            message,
        });
    }

    let response: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| ExternalServiceError::InvalidResponse {
            service: SERVICE,
            message: e.to_string(),
        })?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| ExternalServiceError::InvalidResponse {
            service: SERVICE,
            message: "no completion choices returned".to_string(),
        })
}

/// Client for the OpenAI chat completions API.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout_seconds: u64,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, model = model, "OpenAI client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    fn completion_request(&self, text: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&build_request(&self.model, text))
    }

    async fn complete(&self, text: &str) -> Result<String, ExternalServiceError> {
        debug!(base_url = %self.base_url, model = %self.model, "OpenAI request");

        let response = self
            .completion_request(text)
            .send()
            .await
            .map_err(|source| ExternalServiceError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ExternalServiceError::Transport {
                service: SERVICE,
                source,
            })?;

        parse_completion(status, &body)
    }
}

#[async_trait]
impl Simplifier for OpenAiClient {
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn simplify(&self, text: &str) -> Result<String, ExternalServiceError> {
        let result = self.complete(text).await;
        if let Err(e) = &result {
            error!(error = %e, "Error simplifying text");
        }
        result
    }
}
