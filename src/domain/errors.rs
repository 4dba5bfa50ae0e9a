//! Domain errors for the sqlchat service.

use thiserror::Error;

/// Domain-level errors that can occur while building or using a session.
///
/// Messages are passed through to HTTP callers as-is, so the variants carry
/// the underlying message without an extra prefix where the original text is
/// what the caller needs to see.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Missing or invalid credentials, or an unknown provider tag.
    #[error("{0}")]
    Configuration(String),

    /// Unreachable or malformed database target.
    #[error("{0}")]
    Connection(String),

    /// No session has been connected yet.
    #[error("Agent not connected")]
    SessionNotReady,

    /// The question-answering loop gave up or its backend failed.
    #[error("{0}")]
    Reasoning(String),

    /// The request itself is invalid.
    #[error("{0}")]
    InputValidation(String),

    /// A SQL statement failed.
    #[error("Database error: {0}")]
    Database(String),

}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Whether the error was caused by the caller rather than the service.
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::SessionNotReady | Self::InputValidation(_))
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
