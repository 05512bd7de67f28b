//! Error types for the MCP client

use cloudgenie_application::ProtocolError;
use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors that can occur when communicating with an MCP server
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Failed to spawn MCP server process: {0}")]
    Spawn(std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON-RPC error (code {code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("Transport closed")]
    TransportClosed,

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<McpError> for ProtocolError {
    fn from(err: McpError) -> Self {
        match err {
            McpError::Spawn(e) => ProtocolError::Connection(e.to_string()),
            McpError::Rpc { code, message } => ProtocolError::Rpc { code, message },
            McpError::TransportClosed => ProtocolError::Transport("transport closed".to_string()),
            other => ProtocolError::Transport(other.to_string()),
        }
    }
}
