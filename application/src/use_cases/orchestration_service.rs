//! Orchestration service.
//!
//! Long-lived facade over one connected tool endpoint and one model
//! adapter. Connecting performs the handshake and snapshots the tool
//! catalog; every prompt afterwards runs through a [`ProcessPromptUseCase`]
//! that shares the same cache.

use super::process_prompt::{ProcessPromptError, ProcessPromptInput, ProcessPromptUseCase};
use crate::cache::ResultCache;
use crate::config::OrchestrationParams;
use crate::ports::conversation_logger::ConversationLogger;
use crate::ports::model_adapter::ModelAdapter;
use crate::ports::progress::OrchestrationProgress;
use crate::ports::tool_protocol::{ProtocolError, ServerInfo, ToolProtocolClient};
use cloudgenie_domain::{OrchestrationOutcome, ToolParameter};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Public view of one available tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

/// Snapshot of service health.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    /// The tool endpoint handshake has completed.
    pub tool_client: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerInfo>,
    pub model_adapter: String,
    pub tools_count: usize,
    pub cache_entries: usize,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.tool_client
    }
}

/// Run one setup step under `limit`; any failure is a connection failure.
async fn bounded<T>(
    step: &str,
    limit: Duration,
    fut: impl Future<Output = Result<T, ProtocolError>>,
) -> Result<T, ProcessPromptError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(|e| ProcessPromptError::Connection(e.to_string())),
        Err(_) => Err(ProcessPromptError::Connection(format!(
            "{} timed out after {:?}",
            step, limit
        ))),
    }
}

pub struct OrchestrationService {
    use_case: ProcessPromptUseCase,
    adapter: Arc<dyn ModelAdapter>,
    client: Arc<dyn ToolProtocolClient>,
    cache: Arc<ResultCache>,
}

impl OrchestrationService {
    /// Handshake with the tool endpoint and snapshot its catalog.
    ///
    /// Any failure here is a connection failure: the service cannot run
    /// without a catalog.
    pub async fn connect(
        adapter: Arc<dyn ModelAdapter>,
        client: Arc<dyn ToolProtocolClient>,
        cache: Arc<ResultCache>,
        params: OrchestrationParams,
    ) -> Result<Self, ProcessPromptError> {
        let limit = params.call_timeout;
        let server = bounded("initialize", limit, client.initialize()).await?;
        let catalog = bounded("tools/list", limit, client.list_tools()).await?;

        info!(
            "Connected to {} {} ({} tools), model adapter: {}",
            server.name,
            server.version,
            catalog.len(),
            adapter.name()
        );

        let use_case =
            ProcessPromptUseCase::new(adapter.clone(), client.clone(), cache.clone(), catalog)
                .with_params(params);

        Ok(Self {
            use_case,
            adapter,
            client,
            cache,
        })
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.use_case = self.use_case.with_conversation_logger(logger);
        self
    }

    pub async fn process_prompt(
        &self,
        prompt: impl Into<String>,
        cancellation: &CancellationToken,
    ) -> Result<OrchestrationOutcome, ProcessPromptError> {
        self.use_case
            .execute(ProcessPromptInput::new(prompt), cancellation)
            .await
    }

    pub async fn process_prompt_with_progress(
        &self,
        prompt: impl Into<String>,
        progress: &dyn OrchestrationProgress,
        cancellation: &CancellationToken,
    ) -> Result<OrchestrationOutcome, ProcessPromptError> {
        self.use_case
            .execute_with_progress(ProcessPromptInput::new(prompt), progress, cancellation)
            .await
    }

    pub fn available_tools(&self) -> Vec<ToolInfo> {
        self.use_case
            .catalog()
            .iter()
            .map(|tool| ToolInfo {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            })
            .collect()
    }

    pub fn health_check(&self) -> HealthReport {
        HealthReport {
            tool_client: self.client.is_initialized(),
            server: self.client.server_info(),
            model_adapter: self.adapter.name().to_string(),
            tools_count: self.use_case.catalog().len(),
            cache_entries: self.cache.stats().total_entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::model_adapter::AdapterError;
    use async_trait::async_trait;
    use cloudgenie_domain::{
        AdapterResponse, ConversationTurn, ToolCatalog, ToolDescriptor, ToolOutcome,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct EchoAdapter;

    #[async_trait]
    impl ModelAdapter for EchoAdapter {
        async fn chat(
            &self,
            prompt: &str,
            _tools: &ToolCatalog,
            _history: &[ConversationTurn],
        ) -> Result<AdapterResponse, AdapterError> {
            Ok(AdapterResponse::text(format!("echo: {}", prompt)))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    struct StubClient {
        fail_handshake: bool,
        info: Mutex<Option<ServerInfo>>,
    }

    impl StubClient {
        fn new(fail_handshake: bool) -> Self {
            Self {
                fail_handshake,
                info: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ToolProtocolClient for StubClient {
        async fn initialize(&self) -> Result<ServerInfo, ProtocolError> {
            if self.fail_handshake {
                return Err(ProtocolError::Connection("server exited".into()));
            }
            let info = ServerInfo {
                name: "cloudgenie-mcp".into(),
                version: "1.0.0".into(),
                protocol_version: "2024-11-05".into(),
            };
            *self.info.lock().unwrap() = Some(info.clone());
            Ok(info)
        }

        async fn list_tools(&self) -> Result<ToolCatalog, ProtocolError> {
            Ok(ToolCatalog::new(vec![ToolDescriptor::from_schema(
                "create_resource",
                "Create a resource",
                json!({
                    "type": "object",
                    "properties": {"name": {"type": "string", "description": "Resource name"}},
                    "required": ["name"]
                }),
            )]))
        }

        async fn call_tool(
            &self,
            _name: &str,
            _arguments: &HashMap<String, serde_json::Value>,
        ) -> Result<ToolOutcome, ProtocolError> {
            Ok(ToolOutcome::text("ok"))
        }

        fn server_info(&self) -> Option<ServerInfo> {
            self.info.lock().unwrap().clone()
        }
    }

    /// Accepts the connection but never answers.
    struct SilentClient;

    #[async_trait]
    impl ToolProtocolClient for SilentClient {
        async fn initialize(&self) -> Result<ServerInfo, ProtocolError> {
            std::future::pending().await
        }

        async fn list_tools(&self) -> Result<ToolCatalog, ProtocolError> {
            std::future::pending().await
        }

        async fn call_tool(
            &self,
            _name: &str,
            _arguments: &HashMap<String, serde_json::Value>,
        ) -> Result<ToolOutcome, ProtocolError> {
            std::future::pending().await
        }

        fn server_info(&self) -> Option<ServerInfo> {
            None
        }
    }

    async fn connect(fail: bool) -> Result<OrchestrationService, ProcessPromptError> {
        OrchestrationService::connect(
            Arc::new(EchoAdapter),
            Arc::new(StubClient::new(fail)),
            Arc::new(ResultCache::default()),
            OrchestrationParams::default(),
        )
        .await
    }

    #[tokio::test]
    async fn test_connect_and_health() {
        let service = connect(false).await.expect("should connect");
        let health = service.health_check();

        assert!(health.is_healthy());
        assert_eq!(health.model_adapter, "echo");
        assert_eq!(health.tools_count, 1);
        assert_eq!(health.cache_entries, 0);
        assert_eq!(health.server.unwrap().name, "cloudgenie-mcp");
    }

    #[tokio::test]
    async fn test_connect_failure_is_connection_error() {
        let err = connect(true).await.err().expect("should fail");
        assert!(matches!(err, ProcessPromptError::Connection(_)));
        assert!(err.to_string().contains("server exited"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_to_silent_endpoint_times_out() {
        let params = OrchestrationParams::default().with_call_timeout(Duration::from_secs(10));
        let err = OrchestrationService::connect(
            Arc::new(EchoAdapter),
            Arc::new(SilentClient),
            Arc::new(ResultCache::default()),
            params,
        )
        .await
        .err()
        .expect("should time out");

        assert!(matches!(&err, ProcessPromptError::Connection(msg) if msg.contains("initialize timed out")));
    }

    #[tokio::test]
    async fn test_available_tools() {
        let service = connect(false).await.unwrap();
        let tools = service.available_tools();

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "create_resource");
        assert_eq!(tools[0].parameters[0].name, "name");
        assert!(tools[0].parameters[0].required);
    }

    #[tokio::test]
    async fn test_process_prompt() {
        let service = connect(false).await.unwrap();
        let outcome = service
            .process_prompt("hello", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.final_text, "echo: hello");
        assert_eq!(outcome.metadata.iterations, 1);
        assert_eq!(outcome.metadata.tools_available, 1);
    }
}
