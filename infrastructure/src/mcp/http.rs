//! HTTP transport — one JSON-RPC message per POST.
//!
//! Every request is sent as the body of a POST to the server URL and the
//! response body is the matching JSON-RPC response. Correlation is implicit
//! in the HTTP exchange, so there is no pending table.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

use super::channel::RpcChannel;
use super::error::{McpError, Result};
use super::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

pub struct HttpChannel {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpChannel {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Decode a response body and check it answers `expected_id`.
fn decode_response(body: &[u8], expected_id: u64) -> Result<Value> {
    let response: JsonRpcResponse = serde_json::from_slice(body)?;
    match response.id {
        Some(id) if id != expected_id => Err(McpError::UnexpectedResponse(format!(
            "response id {} does not match request id {}",
            id, expected_id
        ))),
        _ => response.into_result(),
    }
}

#[async_trait]
impl RpcChannel for HttpChannel {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(id, method, params);
        trace!("MCP POST {} {}", self.url, method);

        let body = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        trace!("MCP HTTP received: {}", String::from_utf8_lossy(&body));

        decode_response(&body, id)
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        self.client
            .post(&self.url)
            .json(&JsonRpcNotification::new(method, params))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_success() {
        let body = br#"{"jsonrpc":"2.0","id":3,"result":{"tools":[]}}"#;
        assert_eq!(decode_response(body, 3).unwrap(), json!({"tools": []}));
    }

    #[test]
    fn decode_rejects_mismatched_id() {
        let body = br#"{"jsonrpc":"2.0","id":4,"result":{}}"#;
        assert!(matches!(
            decode_response(body, 3),
            Err(McpError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn decode_rpc_error() {
        let body = br#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"boom"}}"#;
        assert!(matches!(
            decode_response(body, 1),
            Err(McpError::Rpc { code: -32000, .. })
        ));
    }

    #[test]
    fn decode_garbage_is_serialization_error() {
        assert!(matches!(
            decode_response(b"<html>", 1),
            Err(McpError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_http_error() {
        let channel = HttpChannel::new("http://127.0.0.1:9/mcp").unwrap();
        assert!(matches!(
            channel.request("tools/list", None).await,
            Err(McpError::Http(_))
        ));
        assert_eq!(channel.url(), "http://127.0.0.1:9/mcp");
    }
}
