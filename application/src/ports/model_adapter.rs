//! Model adapter port
//!
//! Defines the interface for asking a model backend for the next step of a
//! conversation. Backends that support structured tool calls and backends
//! that only emit `TOOL_CALL:` text both normalize into an
//! [`AdapterResponse`].

use async_trait::async_trait;
use cloudgenie_domain::{AdapterResponse, ConversationTurn, ToolCatalog};
use thiserror::Error;

/// Errors that can occur during a model call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Capability interface over concrete model backends
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Ask the model to continue the conversation.
    ///
    /// `prompt` is the newest user-side text (the original request, or a
    /// tool-result summary); `history` holds the turns before it.
    async fn chat(
        &self,
        prompt: &str,
        tools: &ToolCatalog,
        history: &[ConversationTurn],
    ) -> Result<AdapterResponse, AdapterError>;

    /// Provider name reported in result metadata (e.g. "openai").
    fn name(&self) -> &str;
}
