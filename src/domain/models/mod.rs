//! Domain types shared by adapters and services.

pub mod config;
pub mod descriptor;
pub mod memory;
pub mod provider;
pub mod query;

pub use config::{
    AgentConfig, Config, LlmConfig, LoaderConfig, LoggingConfig, MysqlConfig, ServerConfig,
};
pub use descriptor::{ConnectionDescriptor, Dialect};
pub use memory::{ConversationMemory, Turn};
pub use provider::LlmProvider;
pub use query::{ColumnInfo, QueryOutput, SqlValue, TableInfo};
