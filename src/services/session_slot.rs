//! Holder for the single live session.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};

use super::sql_agent::SqlAgent;

/// At most one session is live. Readers clone the `Arc` and release the
/// lock at once, so a question in flight on a replaced session finishes on
/// that session.
#[derive(Debug, Default)]
pub struct SessionSlot {
    current: RwLock<Option<Arc<SqlAgent>>>,
}

impl SessionSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The live session, or `SessionNotReady`.
    pub async fn current(&self) -> DomainResult<Arc<SqlAgent>> {
        self.current
            .read()
            .await
            .as_ref()
            .map(Arc::clone)
            .ok_or(DomainError::SessionNotReady)
    }

    /// Install a new session, returning the one it replaced.
    pub async fn replace(&self, agent: SqlAgent) -> Option<Arc<SqlAgent>> {
        self.current.write().await.replace(Arc::new(agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::adapters::llm::ScriptedChatModel;
    use crate::domain::models::{AgentConfig, Dialect, LlmProvider, QueryOutput, TableInfo};
    use crate::domain::ports::SqlDatabase;

    struct Empty;

    #[async_trait]
    impl SqlDatabase for Empty {
        fn dialect(&self) -> Dialect {
            Dialect::Sqlite
        }
        fn table_names(&self) -> &[String] {
            &[]
        }
        async fn table_info(&self, _tables: &[String]) -> DomainResult<Vec<TableInfo>> {
            Ok(vec![])
        }
        async fn run(&self, _sql: &str) -> DomainResult<QueryOutput> {
            Ok(QueryOutput::default())
        }
    }

    fn agent() -> SqlAgent {
        SqlAgent::new(
            Arc::new(Empty),
            Arc::new(ScriptedChatModel::repeating("Final Answer: ok")),
            LlmProvider::OpenAi,
            &AgentConfig::default(),
            false,
        )
    }

    #[tokio::test]
    async fn test_empty_slot_is_not_ready() {
        let slot = SessionSlot::new();
        assert!(matches!(
            slot.current().await,
            Err(DomainError::SessionNotReady)
        ));
    }

    #[tokio::test]
    async fn test_replace_swaps_session() {
        let slot = SessionSlot::new();
        assert!(slot.replace(agent()).await.is_none());
        let first = slot.current().await.unwrap();

        let previous = slot.replace(agent()).await.unwrap();
        assert_eq!(previous.id(), first.id());
        assert_ne!(slot.current().await.unwrap().id(), first.id());

        // The replaced session keeps working for holders of its Arc.
        assert_eq!(first.ask("still there?").await.unwrap(), "ok");
    }
}
