//! Error types for conversation validation and formatting.
//!
//! Structural problems with a conversation are hard failures and surface as
//! [`ValidationError`]. Problems with individual messages are soft: they are
//! described by [`MessageIssue`], logged, and never returned as errors.

use thiserror::Error;

/// A structural precondition on a conversation record was violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Conversation is missing (null or absent)")]
    Missing,

    #[error("Conversation must be a record, found {found}")]
    NotARecord { found: &'static str },

    #[error("Conversation title must be a non-empty string")]
    InvalidTitle,

    #[error("Conversation messages must be an array")]
    InvalidMessages,
}

/// Anything that stops a conversation from being rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unexpected formatting failure: {0}")]
    Unexpected(String),
}

impl From<std::fmt::Error> for FormatError {
    fn from(e: std::fmt::Error) -> Self {
        FormatError::Unexpected(format!("failed to write document: {}", e))
    }
}

impl FormatError {
    /// Validation failures are expected input problems; anything else is a fault.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FormatError::Validation(_))
    }
}

/// Soft, per-message problems. Logged, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageIssue {
    #[error("Message {index} in conversation \"{title}\" is malformed (missing role or content)")]
    Malformed { title: String, index: usize },

    #[error("Message {index} in conversation \"{title}\" has invalid content")]
    InvalidContent { title: String, index: usize },
}

/// Short name of a JSON value's kind, for error messages.
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a record",
    }
}
