//! Tool domain module
//!
//! Tools are remotely executed operations discovered from the tool endpoint.
//! The flow through this module:
//!
//! ```text
//! ┌──────────────┐    ┌────────────────┐    ┌──────────────┐    ┌────────────┐
//! │ ToolCatalog  │───▶│ ToolInvocation │───▶│ ToolOutcome  │───▶│ ToolResult │
//! │ (snapshot)   │    │ (from model)   │    │ (endpoint)   │    │ (trace)    │
//! └──────────────┘    └────────────────┘    └──────────────┘    └────────────┘
//! ```
//!
//! - [`ToolCatalog`](entities::ToolCatalog) is read-only for a session.
//! - [`extract_tool_calls`](text_calls::extract_tool_calls) covers backends
//!   that can only describe invocations in free text.

pub mod entities;
pub mod schema;
pub mod text_calls;
pub mod value_objects;
