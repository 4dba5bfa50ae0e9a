//! Adapters for external systems: databases, LLM providers and HTTP.

pub mod http;
pub mod llm;
pub mod sql;
