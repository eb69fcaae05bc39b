//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Conversation id cannot be empty")]
    EmptyConversationId,

    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    #[error("Unknown message role: {0}")]
    UnknownRole(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
