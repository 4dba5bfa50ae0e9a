//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber, pretty or JSON.

pub mod logger;

pub use logger::{LogFormat, LoggerImpl};
