//! Shared error type for the Conversation Store Façade.

#[derive(Debug, thiserror::Error)]
pub enum ConvStoreError {
    #[error("conversation not found: {0}")]
    NotFound(String),

    #[error("conversation is closed: {0}")]
    Closed(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<core_types::CoreError> for ConvStoreError {
    fn from(e: core_types::CoreError) -> Self {
        match e {
            core_types::CoreError::ConversationClosed(id) => ConvStoreError::Closed(id),
            other => ConvStoreError::Storage(other.to_string()),
        }
    }
}
