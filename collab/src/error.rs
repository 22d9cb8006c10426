//! Shared error type for collaborator operations.

/// Error kind distinguishing transient failures (retried by callers per §7) from fatal
/// ones.
#[derive(Debug, thiserror::Error)]
pub enum CollabError {
    #[error("transient: {0}")]
    Transient(String),

    #[error("fatal: {0}")]
    Fatal(String),
}

impl CollabError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CollabError::Transient(_))
    }
}
