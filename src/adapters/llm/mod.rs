//! LLM backend adapters.

pub mod mock;
pub mod openai_compatible;
pub mod registry;

pub use mock::{MockChatModelFactory, ScriptedChatModel};
pub use openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleModel};
pub use registry::ProviderRegistry;
