//! Interceptor Chain (§4.3) and the Repository Lifecycle Gate (§4.4), the primary
//! interceptor that enforces repository freshness by commit hash before any
//! code-inspection tool runs.

pub mod chain;
pub mod error;
pub mod lifecycle_gate;

pub use chain::{Interceptor, InterceptorChain};
pub use error::InterceptorError;
pub use lifecycle_gate::RepositoryLifecycleGate;
