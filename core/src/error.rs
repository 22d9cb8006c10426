//! Shared error type for the data model layer.

/// Errors raised by the core data model (construction/validation only; storage and
/// network errors live in their owning crates).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("conversation is closed: {0}")]
    ConversationClosed(String),

    #[error("invalid mode: {0}")]
    InvalidMode(String),
}
