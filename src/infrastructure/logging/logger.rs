//! tracing subscriber setup.

use anyhow::{Context, Result};
use std::io;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::domain::models::LoggingConfig;

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable lines.
    Pretty,
}

impl LogFormat {
    fn parse(format: &str) -> Result<Self> {
        match format.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            _ => anyhow::bail!("Invalid log format: {format}"),
        }
    }
}

/// Logger implementation using tracing
///
/// Output goes to stderr so command output on stdout stays machine-readable.
pub struct LoggerImpl;

impl LoggerImpl {
    /// Install the global subscriber.
    ///
    /// `RUST_LOG` directives, when set, refine the configured level.
    ///
    /// # Errors
    /// Returns an error if the level or format is invalid, or a global
    /// subscriber is already installed.
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;
        let format = LogFormat::parse(&config.format)?;

        let env_filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();

        match format {
            LogFormat::Json => {
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(env_filter);

                tracing_subscriber::registry()
                    .with(layer)
                    .try_init()
                    .context("Failed to install tracing subscriber")?;
            }
            LogFormat::Pretty => {
                let layer = tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_span_events(FmtSpan::NONE)
                    .with_filter(env_filter);

                tracing_subscriber::registry()
                    .with(layer)
                    .try_init()
                    .context("Failed to install tracing subscriber")?;
            }
        }

        tracing::debug!(level = %config.level, format = ?format, "logger initialized");

        Ok(Self)
    }
}

/// Parse log level string to Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert!(matches!(parse_log_level("trace"), Ok(Level::TRACE)));
        assert!(matches!(parse_log_level("debug"), Ok(Level::DEBUG)));
        assert!(matches!(parse_log_level("info"), Ok(Level::INFO)));
        assert!(matches!(parse_log_level("warn"), Ok(Level::WARN)));
        assert!(matches!(parse_log_level("error"), Ok(Level::ERROR)));
        assert!(matches!(parse_log_level("TRACE"), Ok(Level::TRACE)));
        assert!(parse_log_level("invalid").is_err());
    }

    #[test]
    fn test_parse_log_format() {
        assert_eq!(LogFormat::parse("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::parse("Pretty").unwrap(), LogFormat::Pretty);
        assert!(LogFormat::parse("xml").is_err());
    }

    #[test]
    fn test_invalid_config_fails_before_install() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            format: "pretty".to_string(),
        };
        assert!(LoggerImpl::init(&config).is_err());
    }
}
