//! Conversation memory for a single session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed question/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// What the user asked.
    pub question: String,
    /// What the agent answered.
    pub answer: String,
    /// When the answer was recorded.
    pub asked_at: DateTime<Utc>,
}

/// Append-only, ordered history of the turns in one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationMemory {
    turns: Vec<Turn>,
}

impl ConversationMemory {
    /// Empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished turn.
    pub fn record(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(Turn {
            question: question.into(),
            answer: answer.into(),
            asked_at: Utc::now(),
        });
    }

    /// Turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether nothing has been asked yet.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render the history as a transcript for the agent prompt.
    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("Human: {}\nAI: {}", t.question, t.answer))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
