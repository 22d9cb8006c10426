//! Code Entity: external contract for nodes in the code knowledge graph (§3).
//!
//! This crate does not construct entities — the out-of-scope parser does. The Lifecycle
//! Gate only deletes and replaces them in bulk per repository id (§4.4).

use serde::{Deserialize, Serialize};

/// The five entity categories the Lifecycle Gate knows how to bulk-delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Type,
    Method,
    Field,
    Package,
    Annotation,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 5] = [
        EntityCategory::Type,
        EntityCategory::Method,
        EntityCategory::Field,
        EntityCategory::Package,
        EntityCategory::Annotation,
    ];
}

/// A node in the code knowledge graph, tagged with its owning repository.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CodeEntity {
    pub id: String,
    pub repository_id: String,
    pub category: EntityCategory,
    pub name: String,
}
