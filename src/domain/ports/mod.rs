//! Port trait definitions (Hexagonal Architecture)
//!
//! - `ChatModel` / `ChatModelFactory`: LLM backends
//! - `SqlDatabase`: the database a session's tools query
//!
//! Adapters in `crate::adapters` implement these so the agent can be driven
//! by scripted models and throwaway databases in tests.

pub mod chat_model;
pub mod sql_database;

pub use chat_model::{ChatModel, ChatModelFactory};
pub use sql_database::SqlDatabase;
