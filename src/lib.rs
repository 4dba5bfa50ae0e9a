//! sqlchat - natural-language questions over a SQL database
//!
//! An LLM agent turns questions into read-only SQL, runs them through a small
//! toolkit and answers in text. The agent is served over HTTP, and CSV
//! loaders populate SQLite or MySQL databases to query.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Adapters** (`adapters`): sqlx databases, LLM providers, the axum API
//! - **Service Layer** (`services`): the ReAct agent, its tools and the session slot
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::models::{Config, ConnectionDescriptor, LlmProvider};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AgentFactory, SessionSlot, SqlAgent};
