//! JSON-RPC protocol types for MCP server communication.
//!
//! This module defines the message structures used in the JSON-RPC 2.0
//! protocol spoken by MCP servers.
//!
//! # Protocol Overview
//!
//! - **Requests**: Client → server (`initialize`, `tools/list`, `tools/call`)
//! - **Responses**: Server → client (result or error)
//! - **Notifications**: Client → server (`notifications/initialized`), or
//!   server → client (logging, progress), which the client ignores

use cloudgenie_domain::{ContentPart, ToolDescriptor, ToolOutcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::error::{McpError, Result};

/// MCP protocol revision this client speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Creates a new JSON-RPC request. Ids are allocated by the channel.
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC notification (no id, no response expected)
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    /// Split into the result payload or the error object.
    pub fn into_result(self) -> Result<Value> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(McpError::Rpc {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

/// Name/version pair exchanged during the handshake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

/// `initialize` request parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: &'static str,
    pub capabilities: Value,
    pub client_info: Implementation,
}

impl InitializeParams {
    pub fn new(client_info: Implementation) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            capabilities: Value::Object(Default::default()),
            client_info,
        }
    }
}

/// `initialize` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    pub server_info: Implementation,
}

/// One tool as advertised by `tools/list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Value,
}

impl McpTool {
    pub fn into_descriptor(self) -> ToolDescriptor {
        ToolDescriptor::from_schema(
            self.name,
            self.description.unwrap_or_default(),
            self.input_schema,
        )
    }
}

/// `tools/list` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    #[serde(default)]
    pub tools: Vec<McpTool>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// `tools/call` request parameters
#[derive(Debug, Clone, Serialize)]
pub struct CallToolParams<'a> {
    pub name: &'a str,
    pub arguments: Value,
}

/// `tools/call` result
///
/// Content parts are kept raw so that part types this client does not
/// model are skipped instead of failing the whole call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<Value>,
    #[serde(default)]
    pub is_error: bool,
}

impl CallToolResult {
    pub fn into_outcome(self) -> ToolOutcome {
        let content = self
            .content
            .into_iter()
            .filter_map(|part| match serde_json::from_value::<ContentPart>(part.clone()) {
                Ok(part) => Some(part),
                Err(e) => {
                    warn!("Skipping unsupported content part ({}): {}", e, part);
                    None
                }
            })
            .collect();
        ToolOutcome {
            content,
            is_error: self.is_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serialization() {
        let req = JsonRpcRequest::new(7, "tools/list", Some(json!({})));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list", "params": {}}));
    }

    #[test]
    fn notification_has_no_id() {
        let n = JsonRpcNotification::new("notifications/initialized", None);
        let json = serde_json::to_value(&n).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("params").is_none());
        assert_eq!(json["method"], "notifications/initialized");
    }

    #[test]
    fn initialize_params_shape() {
        let params = InitializeParams::new(Implementation {
            name: "cloudgenie".into(),
            version: "0.4.0".into(),
        });
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["protocolVersion"], "2024-11-05");
        assert_eq!(json["capabilities"], json!({}));
        assert_eq!(json["clientInfo"]["name"], "cloudgenie");
    }

    #[test]
    fn response_error_wins() {
        let resp: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": 1,
            "error": {"code": -32602, "message": "Invalid params"}
        }))
        .unwrap();
        match resp.into_result() {
            Err(McpError::Rpc { code, message }) => {
                assert_eq!(code, -32602);
                assert_eq!(message, "Invalid params");
            }
            other => panic!("expected rpc error, got {:?}", other),
        }
    }

    #[test]
    fn list_tools_result_to_descriptors() {
        let result: ListToolsResult = serde_json::from_value(json!({
            "tools": [{
                "name": "create_resource",
                "description": "Create a resource",
                "inputSchema": {
                    "type": "object",
                    "properties": {"name": {"type": "string", "description": "Name"}},
                    "required": ["name"]
                }
            }, {
                "name": "list_blueprints"
            }]
        }))
        .unwrap();
        assert!(result.next_cursor.is_none());

        let tools: Vec<_> = result.tools.into_iter().map(McpTool::into_descriptor).collect();
        assert_eq!(tools[0].name, "create_resource");
        assert_eq!(tools[0].parameters.len(), 1);
        assert!(tools[0].parameters[0].required);
        assert_eq!(tools[1].description, "");
        assert!(tools[1].parameters.is_empty());
    }

    #[test]
    fn call_tool_result_skips_unknown_parts() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "[]"},
                {"type": "audio", "data": "AAAA", "mimeType": "audio/wav"}
            ],
            "isError": false
        }))
        .unwrap();
        let outcome = result.into_outcome();
        assert_eq!(outcome.content, vec![ContentPart::text("[]")]);
        assert!(!outcome.is_error);
    }

    #[test]
    fn call_tool_result_error_flag() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "blueprint not found"}],
            "isError": true
        }))
        .unwrap();
        let outcome = result.into_outcome();
        assert!(outcome.is_error);
        assert_eq!(outcome.render(), "blueprint not found");
    }
}
