//! Layered configuration loading with figment.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Conventional environment names and the config paths they set.
const PLAIN_ENV_KEYS: [(&str, &str, &str); 11] = [
    ("OPENAI_API_KEY", "llm", "openai_api_key"),
    ("GROQ_API_KEY", "llm", "groq_api_key"),
    ("OPENROUTER_API_KEY", "llm", "openrouter_api_key"),
    ("GITHUB_PAT", "llm", "github_pat"),
    ("MYSQL_USER", "mysql", "user"),
    ("MYSQL_PASSWORD", "mysql", "password"),
    ("MYSQL_HOST", "mysql", "host"),
    ("MYSQL_PORT", "mysql", "port"),
    ("MYSQL_DB", "mysql", "database"),
    ("HOST", "server", "host"),
    ("PORT", "server", "port"),
];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `logging.level` is not a tracing level.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// `logging.format` is not `json` or `pretty`.
    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    /// `agent.max_iterations` is zero.
    #[error("Invalid max_iterations: {0}. Must be at least 1")]
    InvalidMaxIterations(u32),

    /// A port variable is not a number.
    #[error("Invalid port in {var}: {value}")]
    InvalidPort {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .sqlchat/config.yaml
    /// 3. .sqlchat/local.yaml (optional local overrides)
    /// 4. SQLCHAT_* environment variables, `__` separating nested keys
    /// 5. Conventional names such as OPENAI_API_KEY, MYSQL_HOST and PORT
    ///
    /// Credentials are not checked here; a missing key only fails when its
    /// provider is selected.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".sqlchat/config.yaml"))
            .merge(Yaml::file(".sqlchat/local.yaml"))
            .merge(Env::prefixed("SQLCHAT_").split("__"))
            .merge(Serialized::defaults(plain_env_overrides()?))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.agent.max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations(config.agent.max_iterations));
        }

        Ok(())
    }
}

/// Collect the conventional environment names into a nested override map.
fn plain_env_overrides() -> Result<Value, ConfigError> {
    let mut root = Map::new();
    for (var, section, field) in PLAIN_ENV_KEYS {
        let Ok(raw) = std::env::var(var) else {
            continue;
        };
        let value = if field == "port" {
            let port: u16 = raw.trim().parse().map_err(|_| ConfigError::InvalidPort {
                var,
                value: raw.clone(),
            })?;
            Value::from(port)
        } else {
            Value::from(raw)
        };
        if let Value::Object(fields) = root
            .entry(section)
            .or_insert_with(|| Value::Object(Map::new()))
        {
            fields.insert(field.to_string(), value);
        }
    }
    Ok(Value::Object(root))
}
