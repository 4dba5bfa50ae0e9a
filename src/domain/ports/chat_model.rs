//! Chat model port - interface for LLM backends.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::LlmProvider;

/// A text-completion style chat model.
///
/// The agent sends its whole prompt as one user message and stops
/// generation at any of the given stop sequences.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logs.
    fn model(&self) -> &str;

    async fn complete(&self, prompt: &str, stop: &[String]) -> DomainResult<String>;
}

/// Builds a chat model for a provider tag.
pub trait ChatModelFactory: Send + Sync {
    /// Fails with a configuration error when the provider's credentials are
    /// missing.
    fn create(&self, provider: LlmProvider) -> DomainResult<Arc<dyn ChatModel>>;
}
