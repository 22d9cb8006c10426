//! Shared error type for the Interceptor Chain and Repository Lifecycle Gate.

/// An interceptor failure. `before_execute` failures of this kind abort tool execution
/// with a `Failure` result carrying this message (§4.3); `after_execute` failures of this
/// kind are logged and swallowed, never propagated (§4.3).
#[derive(Debug, thiserror::Error)]
pub enum InterceptorError {
    #[error("{0}")]
    Failed(String),
}

impl InterceptorError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
