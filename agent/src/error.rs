//! Shared error type for the Agent Loop.

#[derive(Debug, thiserror::Error)]
pub enum AgentLoopError {
    #[error("conversation store error: {0}")]
    ConvStore(#[from] convstore::ConvStoreError),

    #[error("model provider error: {0}")]
    Model(#[from] collab::CollabError),
}
