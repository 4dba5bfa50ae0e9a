//! Agent services: session construction, the reasoning loop and the live session slot.

pub mod agent_factory;
pub mod prompt;
pub mod react_parser;
pub mod session_slot;
pub mod sql_agent;
pub mod toolkit;

pub use agent_factory::AgentFactory;
pub use prompt::PromptBuilder;
pub use session_slot::SessionSlot;
pub use sql_agent::SqlAgent;
pub use toolkit::{SqlTool, SqlToolkit};
