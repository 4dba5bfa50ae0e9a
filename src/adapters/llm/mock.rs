//! Scripted chat model for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::LlmProvider;
use crate::domain::ports::{ChatModel, ChatModelFactory};

/// A chat model that replays canned completions in order.
///
/// Once the script runs out the fallback is returned on every call, or a
/// reasoning error when there is none. Every prompt is recorded.
pub struct ScriptedChatModel {
    responses: Mutex<VecDeque<String>>,
    fallback: Option<String>,
    failure: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedChatModel {
    /// A model that replays `responses` in order.
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            fallback: None,
            failure: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A model that answers every call with the same completion.
    pub fn repeating(response: impl Into<String>) -> Self {
        Self::new(Vec::<String>::new()).with_fallback(response)
    }

    /// A model whose every call fails with a reasoning error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(Vec::<String>::new())
        }
    }

    /// Completion returned once the script runs out.
    pub fn with_fallback(mut self, response: impl Into<String>) -> Self {
        self.fallback = Some(response.into());
        self
    }

    /// Prompts received so far, oldest first.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    /// Number of completions requested so far.
    pub async fn call_count(&self) -> usize {
        self.prompts.lock().await.len()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str, _stop: &[String]) -> DomainResult<String> {
        self.prompts.lock().await.push(prompt.to_string());

        if let Some(message) = &self.failure {
            return Err(DomainError::Reasoning(message.clone()));
        }

        let next = self.responses.lock().await.pop_front();
        next.or_else(|| self.fallback.clone())
            .ok_or_else(|| DomainError::Reasoning("Scripted model has no responses left".into()))
    }
}

/// Factory handing out one shared scripted model for every provider.
pub struct MockChatModelFactory {
    model: Arc<ScriptedChatModel>,
    unavailable: Vec<LlmProvider>,
    requested: StdMutex<Vec<LlmProvider>>,
}

impl MockChatModelFactory {
    /// Hand out `model` for every provider.
    pub fn new(model: Arc<ScriptedChatModel>) -> Self {
        Self {
            model,
            unavailable: Vec::new(),
            requested: StdMutex::new(Vec::new()),
        }
    }

    /// Make `provider` fail as if its credential were missing.
    pub fn without(mut self, provider: LlmProvider) -> Self {
        self.unavailable.push(provider);
        self
    }

    /// Providers requested so far, including failed ones.
    pub fn requested(&self) -> Vec<LlmProvider> {
        self.requested
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl ChatModelFactory for MockChatModelFactory {
    fn create(&self, provider: LlmProvider) -> DomainResult<Arc<dyn ChatModel>> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(provider);
        }
        if self.unavailable.contains(&provider) {
            return Err(DomainError::Configuration(format!(
                "{} is not set; cannot use the {} provider",
                provider.credential_env(),
                provider
            )));
        }
        let model: Arc<dyn ChatModel> = self.model.clone();
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_script_then_fallback() {
        let model = ScriptedChatModel::new(["one", "two"]).with_fallback("again");

        assert_eq!(model.complete("a", &[]).await.unwrap(), "one");
        assert_eq!(model.complete("b", &[]).await.unwrap(), "two");
        assert_eq!(model.complete("c", &[]).await.unwrap(), "again");
        assert_eq!(model.prompts().await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_exhausted_script_fails() {
        let model = ScriptedChatModel::new(["only"]);
        model.complete("a", &[]).await.unwrap();
        assert!(matches!(
            model.complete("b", &[]).await,
            Err(DomainError::Reasoning(_))
        ));
    }

    #[tokio::test]
    async fn test_failing_model_records_prompt() {
        let model = ScriptedChatModel::failing("rate limited");
        let err = model.complete("a", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "rate limited");
        assert_eq!(model.call_count().await, 1);
    }

    #[test]
    fn test_factory_unavailable_provider() {
        let factory = MockChatModelFactory::new(Arc::new(ScriptedChatModel::repeating("x")))
            .without(LlmProvider::Groq);

        assert!(factory.create(LlmProvider::OpenAi).is_ok());
        assert!(matches!(
            factory.create(LlmProvider::Groq).err(),
            Some(DomainError::Configuration(_))
        ));
        assert_eq!(
            factory.requested(),
            vec![LlmProvider::OpenAi, LlmProvider::Groq]
        );
    }
}
