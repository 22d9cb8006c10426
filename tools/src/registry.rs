//! Tool Registry (§4.1): the closed set of tools the agent may call, plus the fixed
//! alternative-tool mapping used by augmentation (§4.6).

use std::collections::HashMap;
use std::sync::Arc;

use core_types::ToolResult;

use crate::r#trait::{Tool, ToolSpec};

/// Catalog of tools, keyed by name, plus a fixed alternatives table.
///
/// Grounded in the teacher's design note: "a tagged-variant set plus a table of
/// (name -> handler); the Registry is a value, not a reflection target."
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    alternatives: HashMap<String, Vec<String>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            alternatives: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.spec().name;
        self.tools.insert(name, tool);
    }

    /// Sets the fixed alternative-tool list for `name` (§4.1 e.g.
    /// `discover_project -> [search_code, dependency_analysis]`).
    pub fn set_alternatives(&mut self, name: impl Into<String>, alternatives: Vec<String>) {
        self.alternatives.insert(name.into(), alternatives);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Alternatives for `name`; empty by default (§4.1).
    pub fn alternatives_for(&self, name: &str) -> Vec<String> {
        self.alternatives.get(name).cloned().unwrap_or_default()
    }

    /// Tool catalog for the selector prompt: `(name, description)` pairs (§4.5 step 3).
    pub fn catalog(&self) -> Vec<(String, String)> {
        self.tools
            .values()
            .map(|t| {
                let spec = t.spec();
                (spec.name, spec.description)
            })
            .collect()
    }

    /// Names only, for the follow-up selector prompt (§4.5 step 4f).
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn spec_of(&self, name: &str) -> Option<ToolSpec> {
        self.tools.get(name).map(|t| t.spec())
    }

    /// `Failure` response enumerating valid names, used when `name` is unknown (§4.1,
    /// §4.6 step 1).
    pub fn unknown_tool_failure(&self, name: &str) -> ToolResult {
        let mut valid: Vec<String> = self.names();
        valid.sort();
        ToolResult::failure(format!(
            "Unknown tool '{name}'. Valid tools: {}",
            valid.join(", ")
        ))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
