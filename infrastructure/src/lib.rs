//! Infrastructure layer for cloudgenie
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the MCP tool server client, the model backends, the
//! JSONL transcript logger, and configuration file loading.

pub mod config;
pub mod logging;
pub mod mcp;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigIssue, ConfigIssueCode, ConfigLoader, FileConfig, McpTransport, Severity,
};
pub use logging::JsonlConversationLogger;
pub use mcp::{HttpChannel, McpClient, McpError, RpcChannel, ServerCommand, StreamChannel};
pub use providers::{AdapterSettings, ModelBackend, ProviderKind};
