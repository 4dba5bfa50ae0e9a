//! A live question-answering session over one database.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AgentConfig, ConversationMemory, Dialect, LlmProvider, Turn};
use crate::domain::ports::{ChatModel, SqlDatabase};

use super::prompt::{PromptBuilder, ScratchpadEntry, OBSERVATION_STOP};
use super::react_parser::{self, AgentStep};
use super::toolkit::SqlToolkit;

/// Error text when the loop runs out of steps.
pub const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit";

/// Binds a database, a chat model and conversation memory.
///
/// `ask` holds the memory lock for the whole reasoning loop, so concurrent
/// questions on one session run one after another.
pub struct SqlAgent {
    id: Uuid,
    provider: LlmProvider,
    db: Arc<dyn SqlDatabase>,
    llm: Arc<dyn ChatModel>,
    toolkit: SqlToolkit,
    prompts: PromptBuilder,
    memory: Mutex<ConversationMemory>,
    max_iterations: u32,
    verbose: bool,
}

impl SqlAgent {
    /// Bind a database and model into a fresh session.
    pub fn new(
        db: Arc<dyn SqlDatabase>,
        llm: Arc<dyn ChatModel>,
        provider: LlmProvider,
        config: &AgentConfig,
        verbose: bool,
    ) -> Self {
        let prompts = PromptBuilder::new(db.dialect(), config.top_k);
        let toolkit = SqlToolkit::new(Arc::clone(&db), Arc::clone(&llm), prompts.clone());
        Self {
            id: Uuid::new_v4(),
            provider,
            db,
            llm,
            toolkit,
            prompts,
            memory: Mutex::new(ConversationMemory::new()),
            max_iterations: config.max_iterations.max(1),
            verbose,
        }
    }

    /// Session id.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Provider the session reasons with.
    pub const fn provider(&self) -> LlmProvider {
        self.provider
    }

    /// Dialect of the session database.
    pub fn dialect(&self) -> Dialect {
        self.db.dialect()
    }

    /// Tables seen when the session connected.
    pub fn table_names(&self) -> &[String] {
        self.db.table_names()
    }

    /// Model name reported by the backend.
    pub fn model(&self) -> &str {
        self.llm.model()
    }


    /// Completed turns, oldest first.
    pub async fn history(&self) -> Vec<Turn> {
        self.memory.lock().await.turns().to_vec()
    }

    /// Answer a question, recording the turn in memory on success.
    #[instrument(skip(self, question), fields(session = %self.id))]
    pub async fn ask(&self, question: &str) -> DomainResult<String> {
        let mut memory = self.memory.lock().await;
        let stop = [OBSERVATION_STOP.to_string()];
        let mut scratchpad: Vec<ScratchpadEntry> = Vec::new();

        self.trace_step(0, "question", question);

        for iteration in 1..=self.max_iterations {
            let prompt = self.prompts.build(question, &memory, &scratchpad);
            let output = self
                .llm
                .complete(&prompt, &stop)
                .await
                .map_err(|e| match e {
                    DomainError::Reasoning(_) => e,
                    other => DomainError::Reasoning(other.to_string()),
                })?;

            match react_parser::parse(&output) {
                Ok(AgentStep::Finish { answer, log }) => {
                    self.trace_step(iteration, "finish", &log);
                    memory.record(question, answer.clone());
                    return Ok(answer);
                }
                Ok(AgentStep::Action { tool, input, log }) => {
                    self.trace_step(iteration, "action", &log);
                    let observation = self.toolkit.invoke(&tool, &input).await;
                    self.trace_step(iteration, "observation", &observation);
                    scratchpad.push(ScratchpadEntry { log, observation });
                }
                Err(e) => {
                    self.trace_step(iteration, "parse_error", &e.to_string());
                    scratchpad.push(ScratchpadEntry {
                        log: output,
                        observation: e.observation(),
                    });
                }
            }
        }

        Err(DomainError::Reasoning(ITERATION_LIMIT_MESSAGE.to_string()))
    }

    fn trace_step(&self, iteration: u32, kind: &str, text: &str) {
        if self.verbose {
            info!(iteration, kind, "{}", text);
        } else {
            debug!(iteration, kind, "{}", text);
        }
    }
}

impl std::fmt::Debug for SqlAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlAgent")
            .field("id", &self.id)
            .field("provider", &self.provider)
            .field("dialect", &self.db.dialect())
            .field("model", &self.llm.model())
            .field("max_iterations", &self.max_iterations)
            .finish_non_exhaustive()
    }
}
