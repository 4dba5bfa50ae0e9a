//! LLM provider selection.
//!
//! Providers are a closed set. Each tag maps to an OpenAI-compatible chat
//! completion endpoint and a default model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::DomainError;

/// The LLM backend a session reasons with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// First-party OpenAI API.
    #[default]
    OpenAi,
    /// Groq hosted models.
    Groq,
    /// OpenRouter model gateway.
    OpenRouter,
    /// GitHub Models inference endpoint.
    GitHub,
}

impl LlmProvider {
    /// Every provider, in display order.
    pub const ALL: [Self; 4] = [Self::OpenAi, Self::Groq, Self::OpenRouter, Self::GitHub];

    /// Tag used in requests and config.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Groq => "groq",
            Self::OpenRouter => "openrouter",
            Self::GitHub => "github",
        }
    }

    /// API root used when none is configured.
    pub const fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
            Self::GitHub => "https://models.github.ai/inference/v1",
        }
    }

    /// Model requested from the provider.
    pub const fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Groq => "llama-3.1-70b-versatile",
            Self::OpenRouter => "meta-llama/llama-3.1-8b-instruct:free",
            Self::GitHub => "meta-llama/llama-3.1-8b-instruct",
        }
    }

    /// Environment variable holding this provider's credential.
    pub const fn credential_env(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Groq => "GROQ_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::GitHub => "GITHUB_PAT",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "groq" => Ok(Self::Groq),
            "openrouter" => Ok(Self::OpenRouter),
            "github" => Ok(Self::GitHub),
            _ => Err(DomainError::Configuration(format!(
                "Unknown LLM provider: {s}"
            ))),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!("openai".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAi);
        assert_eq!("GROQ".parse::<LlmProvider>().unwrap(), LlmProvider::Groq);
        assert_eq!(
            " OpenRouter ".parse::<LlmProvider>().unwrap(),
            LlmProvider::OpenRouter
        );
        assert_eq!("github".parse::<LlmProvider>().unwrap(), LlmProvider::GitHub);
    }

    #[test]
    fn test_unknown_tag_is_configuration_error() {
        let err = "anthropic".parse::<LlmProvider>().unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
        assert_eq!(err.to_string(), "Unknown LLM provider: anthropic");
    }

    #[test]
    fn test_tags_round_trip_through_display() {
        for provider in LlmProvider::ALL {
            assert_eq!(provider.to_string().parse::<LlmProvider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_default_is_openai() {
        assert_eq!(LlmProvider::default(), LlmProvider::OpenAi);
        assert_eq!(LlmProvider::default().default_model(), "gpt-4o-mini");
    }
}
