//! Tool Registry (§4.1), Tool Context (§4.2), and the built-in code-inspection tools.
//!
//! Grounded in `loom::tools::Tool` (async `name`/`spec`/`call`) and
//! `loom::tool_source::ToolSource`, collapsed per the teacher's own design note
//! ("Dynamic dispatch over tools: a tagged-variant set plus a table of (name -> handler);
//! the Registry is a value, not a reflection target") into one `ToolRegistry` value.

pub mod builtin;
pub mod context;
pub mod error;
pub mod registry;
pub mod r#trait;

pub use context::ToolContext;
pub use error::ToolError;
pub use registry::ToolRegistry;
pub use r#trait::{Tool, ToolSpec};

pub use core_types::{ToolInvocationRecord, ToolResult};
