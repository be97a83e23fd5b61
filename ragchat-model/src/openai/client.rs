//! OpenAI chat completions client.

use async_trait::async_trait;
use ragchat_core::{Llm, Message, RagChatError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::config::OpenAIChatConfig;

const PROVIDER: &str = "OpenAI";

/// A non-streaming chat model for OpenAI and OpenAI-compatible APIs.
pub struct OpenAIChatModel {
    client: reqwest::Client,
    config: OpenAIChatConfig,
}

impl OpenAIChatModel {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`RagChatError::Config`] if the API key is empty or the HTTP
    /// client cannot be built.
    pub fn new(config: OpenAIChatConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(RagChatError::Config("OpenAI API key must not be empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagChatError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Create a client for an OpenAI-compatible API.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Self::new(OpenAIChatConfig::compatible(api_key, base_url, model))
    }
}

// ── Chat completions request/response types ────────────────────────

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl Llm for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, messages: &[Message]) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.config.model, message_count = messages.len(), "chat completion");

        let request = ChatRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|m| ChatMessage { role: m.role.as_str(), content: &m.content })
                .collect(),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                let message = if e.is_timeout() {
                    format!("request timed out after {:?}", self.config.timeout)
                } else {
                    format!("request failed: {e}")
                };
                RagChatError::generation(PROVIDER, message)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(RagChatError::generation(
                PROVIDER,
                format!("API returned {status}: {detail}"),
            ));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            RagChatError::generation(PROVIDER, format!("failed to parse response: {e}"))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RagChatError::generation(PROVIDER, "response contained no message"))
    }
}
