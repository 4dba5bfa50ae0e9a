//! Provider registry: builds chat models from configured credentials.

use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{LlmConfig, LlmProvider};
use crate::domain::ports::{ChatModel, ChatModelFactory};

use super::openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleModel};

/// Registry of provider credentials.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    config: LlmConfig,
}

impl ProviderRegistry {
    /// Registry over the credentials in `config`.
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }

    fn credential(&self, provider: LlmProvider) -> Option<&str> {
        let key = match provider {
            LlmProvider::OpenAi => self.config.openai_api_key.as_deref(),
            LlmProvider::Groq => self.config.groq_api_key.as_deref(),
            LlmProvider::OpenRouter => self.config.openrouter_api_key.as_deref(),
            LlmProvider::GitHub => self.config.github_pat.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }

    /// Providers that have a credential configured.
    pub fn available_providers(&self) -> Vec<LlmProvider> {
        LlmProvider::ALL
            .into_iter()
            .filter(|p| self.credential(*p).is_some())
            .collect()
    }

    /// Client settings for `provider`, failing when its credential is missing.
    pub fn client_config(&self, provider: LlmProvider) -> DomainResult<OpenAiCompatibleConfig> {
        let key = self.credential(provider).ok_or_else(|| {
            DomainError::Configuration(format!(
                "{} is not set; cannot use the {} provider",
                provider.credential_env(),
                provider
            ))
        })?;
        Ok(OpenAiCompatibleConfig::for_provider(provider, key)
            .with_timeout_secs(self.config.timeout_secs))
    }
}

impl ChatModelFactory for ProviderRegistry {
    fn create(&self, provider: LlmProvider) -> DomainResult<Arc<dyn ChatModel>> {
        let model = OpenAiCompatibleModel::new(self.client_config(provider)?)?;
        Ok(Arc::new(model))
    }
}
