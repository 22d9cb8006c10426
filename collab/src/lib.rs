//! External collaborator contracts (spec §6): model providers, the graph store, the
//! indexing service, and git. This crate defines interfaces only — the relational store,
//! graph store, parser, and model providers themselves are out of scope (§1).

pub mod error;
pub mod git;
pub mod graph_store;
pub mod indexing;
pub mod model;
pub mod repository_store;
pub mod validate;

pub use error::CollabError;
pub use git::{GitOps, ShellGit};
pub use graph_store::{GraphStore, InMemoryGraphStore};
pub use indexing::{IndexOutcome, IndexStatus, IndexingService, MockIndexingService};
pub use model::{ModelClient, StubModelClient};
pub use repository_store::{InMemoryRepositoryStore, RepositoryStore};
pub use validate::{validate_branch, validate_repo_url, ValidationError};
