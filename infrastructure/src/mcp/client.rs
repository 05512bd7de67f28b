//! MCP session client — implements [`ToolProtocolClient`] over any
//! [`RpcChannel`].
//!
//! The handshake and the tool catalog are both fetched at most once per
//! client; concurrent first callers wait on the same in-flight fetch.

use async_trait::async_trait;
use cloudgenie_application::{ProtocolError, ServerInfo, ToolProtocolClient};
use cloudgenie_domain::{ToolCatalog, ToolOutcome};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::channel::RpcChannel;
use super::http::HttpChannel;
use super::protocol::{
    CallToolParams, CallToolResult, Implementation, InitializeParams, InitializeResult,
    ListToolsResult,
};
use super::stream::{ServerCommand, StreamChannel};

/// Upper bound on `tools/list` pages followed before giving up.
const MAX_LIST_PAGES: usize = 32;

/// Default bound on the handshake and on the catalog fetch.
pub const DEFAULT_SETUP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct McpClient<C: RpcChannel> {
    channel: C,
    client_info: Implementation,
    setup_timeout: Duration,
    server: OnceCell<ServerInfo>,
    catalog: OnceCell<ToolCatalog>,
}

impl McpClient<StreamChannel> {
    /// Spawn the server process and wrap its stdio.
    ///
    /// Spawn failures are connection failures.
    pub async fn spawn(server: &ServerCommand) -> Result<Self, ProtocolError> {
        let channel = StreamChannel::spawn_process(server).await?;
        Ok(Self::new(channel))
    }
}

impl McpClient<HttpChannel> {
    pub fn connect_http(url: impl Into<String>) -> Result<Self, ProtocolError> {
        let channel =
            HttpChannel::new(url).map_err(|e| ProtocolError::Connection(e.to_string()))?;
        Ok(Self::new(channel))
    }
}

impl<C: RpcChannel> McpClient<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            client_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            setup_timeout: DEFAULT_SETUP_TIMEOUT,
            server: OnceCell::new(),
            catalog: OnceCell::new(),
        }
    }

    pub fn with_client_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.client_info = Implementation {
            name: name.into(),
            version: version.into(),
        };
        self
    }

    /// Bound each of `initialize` and `tools/list`. Expiry is a connection
    /// failure.
    pub fn with_setup_timeout(mut self, timeout: Duration) -> Self {
        self.setup_timeout = timeout;
        self
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    async fn bounded<T>(
        &self,
        step: &str,
        fut: impl Future<Output = Result<T, ProtocolError>>,
    ) -> Result<T, ProtocolError> {
        match tokio::time::timeout(self.setup_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("MCP {} got no answer within {:?}", step, self.setup_timeout);
                Err(ProtocolError::Connection(format!(
                    "{} timed out after {:?}",
                    step, self.setup_timeout
                )))
            }
        }
    }

    async fn handshake(&self) -> Result<ServerInfo, ProtocolError> {
        debug!("MCP handshake as {} {}", self.client_info.name, self.client_info.version);

        let params = serde_json::to_value(InitializeParams::new(self.client_info.clone()))
            .map_err(|e| ProtocolError::Connection(e.to_string()))?;
        let result = self
            .channel
            .request("initialize", Some(params))
            .await
            .map_err(|e| ProtocolError::Connection(format!("initialize failed: {}", e)))?;
        let result: InitializeResult = serde_json::from_value(result).map_err(|e| {
            ProtocolError::Connection(format!("malformed initialize result: {}", e))
        })?;

        self.channel
            .notify("notifications/initialized", None)
            .await
            .map_err(|e| ProtocolError::Connection(format!("initialized notification failed: {}", e)))?;

        info!(
            "MCP server initialized: {} {} (protocol {})",
            result.server_info.name, result.server_info.version, result.protocol_version
        );
        Ok(ServerInfo {
            name: result.server_info.name,
            version: result.server_info.version,
            protocol_version: result.protocol_version,
        })
    }

    async fn fetch_catalog(&self) -> Result<ToolCatalog, ProtocolError> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_LIST_PAGES {
            let params = match &cursor {
                Some(c) => json!({ "cursor": c }),
                None => json!({}),
            };
            let result = self.channel.request("tools/list", Some(params)).await?;
            let page: ListToolsResult = serde_json::from_value(result)
                .map_err(|e| ProtocolError::Transport(format!("malformed tools/list result: {}", e)))?;

            tools.extend(page.tools.into_iter().map(|t| t.into_descriptor()));
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    info!("Discovered {} MCP tools", tools.len());
                    return Ok(ToolCatalog::new(tools));
                }
            }
        }

        warn!(
            "tools/list still paginating after {} pages, using {} tools",
            MAX_LIST_PAGES,
            tools.len()
        );
        Ok(ToolCatalog::new(tools))
    }
}

#[async_trait]
impl<C: RpcChannel> ToolProtocolClient for McpClient<C> {
    async fn initialize(&self) -> Result<ServerInfo, ProtocolError> {
        self.server
            .get_or_try_init(|| self.bounded("initialize", self.handshake()))
            .await
            .cloned()
    }

    async fn list_tools(&self) -> Result<ToolCatalog, ProtocolError> {
        self.initialize().await?;
        self.catalog
            .get_or_try_init(|| self.bounded("tools/list", self.fetch_catalog()))
            .await
            .cloned()
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: &HashMap<String, Value>,
    ) -> Result<ToolOutcome, ProtocolError> {
        let catalog = self.list_tools().await?;
        if !catalog.contains(name) {
            return Err(ProtocolError::ToolNotFound(name.to_string()));
        }

        let params = CallToolParams {
            name,
            arguments: Value::Object(
                arguments
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
        };
        let params = serde_json::to_value(params)
            .map_err(|e| ProtocolError::Transport(e.to_string()))?;

        debug!("Calling MCP tool {}", name);
        let result = self.channel.request("tools/call", Some(params)).await?;
        let result: CallToolResult = serde_json::from_value(result)
            .map_err(|e| ProtocolError::Transport(format!("malformed tools/call result: {}", e)))?;
        Ok(result.into_outcome())
    }

    fn server_info(&self) -> Option<ServerInfo> {
        self.server.get().cloned()
    }
}
