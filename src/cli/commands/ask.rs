//! `sqlchat ask`: one-shot question against a database.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::llm::ProviderRegistry;
use crate::cli::output::progress::create_spinner;
use crate::cli::output::{output, CommandOutput};
use crate::cli::types::AskArgs;
use crate::domain::models::{Config, ConnectionDescriptor};
use crate::services::AgentFactory;

/// Result of `sqlchat ask`.
#[derive(Debug, Serialize)]
pub struct AskOutput {
    /// Session that answered.
    pub session: Uuid,
    /// Provider tag.
    pub provider: String,
    /// Model name the backend reported.
    pub model: String,
    /// Question asked.
    pub question: String,
    /// Final answer.
    pub answer: String,
}

impl CommandOutput for AskOutput {
    fn to_human(&self) -> String {
        self.answer.clone()
    }
}

/// Answer one question and print the result.
pub async fn execute(args: AskArgs, config: Config, json: bool) -> Result<()> {
    let db_uri = args.db_uri.unwrap_or_else(|| {
        ConnectionDescriptor::sqlite(&config.loader.sqlite_path).to_string()
    });
    let provider = args
        .provider
        .unwrap_or_else(|| config.llm.default_provider.clone());

    let factory = AgentFactory::new(
        Arc::new(ProviderRegistry::new(config.llm.clone())),
        config.agent.clone(),
    );

    let agent = factory
        .create_session(&db_uri, &provider, args.verbose)
        .await
        .context("Failed to create agent session")?;

    let spinner = create_spinner("Thinking...", !json && !args.verbose);
    let result = agent.ask(&args.question).await;
    spinner.finish_and_clear();
    let answer = result.context("Agent failed to answer")?;

    output(
        &AskOutput {
            session: agent.id(),
            provider: agent.provider().to_string(),
            model: agent.model().to_string(),
            question: args.question,
            answer,
        },
        json,
    );
    Ok(())
}
