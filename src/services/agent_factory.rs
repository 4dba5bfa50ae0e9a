//! Builds `SqlAgent` sessions from a database URI and a provider tag.

use std::sync::Arc;
use tracing::info;

use crate::adapters::sql::SqlxDatabase;
use crate::domain::errors::DomainResult;
use crate::domain::models::{AgentConfig, ConnectionDescriptor, LlmProvider};
use crate::domain::ports::{ChatModelFactory, SqlDatabase};

use super::sql_agent::SqlAgent;

/// Builds sessions from a connection URI and a provider tag.
pub struct AgentFactory {
    models: Arc<dyn ChatModelFactory>,
    agent_config: AgentConfig,
}

impl AgentFactory {
    /// Factory over `models` with the given loop limits.
    pub fn new(models: Arc<dyn ChatModelFactory>, agent_config: AgentConfig) -> Self {
        Self {
            models,
            agent_config,
        }
    }

    /// Open the database, then build the chat model.
    ///
    /// The database is opened read-only. If the provider cannot be built the
    /// pool is closed before the error is returned.
    pub async fn create_session(
        &self,
        db_uri: &str,
        provider: &str,
        verbose: bool,
    ) -> DomainResult<SqlAgent> {
        let descriptor: ConnectionDescriptor = db_uri.parse()?;
        let db = SqlxDatabase::connect(&descriptor, self.agent_config.sample_rows).await?;

        let (provider, llm) = match provider
            .parse::<LlmProvider>()
            .and_then(|p| self.models.create(p).map(|m| (p, m)))
        {
            Ok(built) => built,
            Err(e) => {
                db.pool().close().await;
                return Err(e);
            }
        };

        info!(
            target = %descriptor.redacted(),
            provider = %provider,
            model = llm.model(),
            tables = db.table_names().len(),
            "session created"
        );

        Ok(SqlAgent::new(
            Arc::new(db),
            llm,
            provider,
            &self.agent_config,
            verbose,
        ))
    }
}
