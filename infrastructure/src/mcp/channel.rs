//! Transport abstraction for the MCP client.

use async_trait::async_trait;
use serde_json::Value;

use super::error::Result;

/// A JSON-RPC request/notification pipe to one MCP server.
///
/// [`McpClient`](super::client::McpClient) holds the session logic and is
/// generic over this trait, so the stdio and HTTP transports share it.
#[async_trait]
pub trait RpcChannel: Send + Sync {
    /// Send a request and wait for its correlated response's `result`.
    /// A JSON-RPC error object comes back as [`McpError::Rpc`](super::error::McpError::Rpc).
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value>;

    /// Send a notification; no response is awaited.
    async fn notify(&self, method: &str, params: Option<Value>) -> Result<()>;

    /// Whether the transport is known to be unusable.
    fn is_closed(&self) -> bool;
}
