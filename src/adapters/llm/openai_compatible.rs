//! OpenAI-compatible chat completion client.
//!
//! Every supported provider exposes the `/chat/completions` wire format, so
//! one client covers them all; only the base URL, model and key differ.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::LlmProvider;
use crate::domain::ports::ChatModel;

/// Settings for one chat completion backend.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Bearer token.
    pub api_key: String,
    /// Base URL up to and including the version segment, e.g.
    /// `https://api.openai.com/v1`.
    pub base_url: String,
    /// Model name sent with each request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl OpenAiCompatibleConfig {
    /// Provider defaults with the given key.
    pub fn for_provider(provider: LlmProvider, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: provider.default_base_url().to_string(),
            model: provider.default_model().to_string(),
            temperature: 0.0,
            timeout_secs: 120,
        }
    }

    /// Point the client at another API root, such as a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// One chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`.
    pub role: String,
    /// Message text.
    pub content: String,
}

/// `POST /chat/completions` body.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    /// Model name.
    pub model: &'a str,
    /// Conversation so far.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Sequences that end the completion.
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub stop: &'a [String],
}

/// `POST /chat/completions` reply.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// Candidate completions; the first is used.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// One candidate completion.
#[derive(Debug, Deserialize)]
pub struct Choice {
    /// The generated message.
    pub message: ChoiceMessage,
}

/// Message inside a choice.
#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    /// Generated text, absent for tool-only replies.
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat model served by an OpenAI-compatible endpoint.
pub struct OpenAiCompatibleModel {
    config: OpenAiCompatibleConfig,
    client: Client,
}

impl OpenAiCompatibleModel {
    /// Build the HTTP client for `config`.
    pub fn new(config: OpenAiCompatibleConfig) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                DomainError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleModel {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str, stop: &[String]) -> DomainResult<String> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
            stop,
        };

        debug!(model = %self.config.model, prompt_len = prompt.len(), "chat completion request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Reasoning(format!("LLM request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Reasoning(format!(
                "LLM request failed with status {status}: {body}"
            )));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Reasoning(format!("Failed to parse LLM response: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| DomainError::Reasoning("LLM response contained no choices".to_string()))
    }
}
