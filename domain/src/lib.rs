//! Domain layer for cloudgenie
//!
//! This crate contains the core entities and value objects of the tool
//! orchestration engine. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Tools
//!
//! A [`ToolCatalog`] is the read-only snapshot of tools advertised by the
//! tool endpoint. The model requests [`ToolInvocation`]s against it; each one
//! resolves into exactly one [`ToolResult`].
//!
//! ## Orchestration
//!
//! One prompt runs through a bounded loop of at most
//! [`MAX_TOOL_ITERATIONS`] model calls and yields an
//! [`OrchestrationOutcome`] with the final text and the full trace.
//!
//! ## Result cache
//!
//! Successful tool outcomes are memoized under a [`CacheKey`] derived from
//! the tool name and canonicalized arguments.

pub mod cache;
pub mod orchestration;
pub mod prompt;
pub mod session;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use cache::{CacheKey, CacheStats};
pub use orchestration::{
    ITERATION_LIMIT_MESSAGE, MAX_TOOL_ITERATIONS,
    outcome::{OrchestrationMetadata, OrchestrationOutcome},
    state::{OrchestrationState, Termination},
};
pub use prompt::PromptTemplate;
pub use session::{
    entities::{Conversation, ConversationTurn, Role},
    response::{AdapterResponse, StopReason, TokenUsage},
};
pub use tool::{
    entities::{ToolCatalog, ToolDescriptor, ToolInvocation, ToolParameter},
    text_calls::extract_tool_calls,
    value_objects::{ContentPart, EMPTY_OUTPUT_MESSAGE, EmbeddedResource, ToolOutcome, ToolResult},
};
