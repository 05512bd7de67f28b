//! Tool protocol port
//!
//! Defines the interface for talking to the external tool-execution endpoint
//! (an MCP server). Implementations live in the infrastructure layer.

use async_trait::async_trait;
use cloudgenie_domain::{ToolCatalog, ToolOutcome};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the tool endpoint
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// Transport setup or the handshake failed. Fatal for the service.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The transport broke (I/O failure, closed stream, HTTP failure).
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The endpoint answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Tool call timed out after {0:?}")]
    Timeout(Duration),
}

impl ProtocolError {
    /// Only connection failures abort the whole service; everything else is
    /// scoped to the invocation that hit it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProtocolError::Connection(_))
    }
}

/// What the endpoint reported about itself during the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub protocol_version: String,
}

/// Client for the tool endpoint.
///
/// `list_tools` and `call_tool` initialize the session on first use, so
/// calling [`initialize`](Self::initialize) up front is optional.
#[async_trait]
pub trait ToolProtocolClient: Send + Sync {
    /// Perform the handshake. Idempotent: later calls return the stored info.
    async fn initialize(&self) -> Result<ServerInfo, ProtocolError>;

    /// The tool catalog. Fetched once and kept for the client's lifetime.
    async fn list_tools(&self) -> Result<ToolCatalog, ProtocolError>;

    /// Run one tool. A tool-level failure comes back as
    /// `Ok(ToolOutcome { is_error: true, .. })`, not as an `Err`.
    async fn call_tool(
        &self,
        name: &str,
        arguments: &HashMap<String, serde_json::Value>,
    ) -> Result<ToolOutcome, ProtocolError>;

    /// Server info, if the handshake has completed.
    fn server_info(&self) -> Option<ServerInfo>;

    fn is_initialized(&self) -> bool {
        self.server_info().is_some()
    }
}
