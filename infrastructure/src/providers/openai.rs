//! OpenAI Chat Completions adapter (native function calling).

use async_trait::async_trait;
use cloudgenie_application::{AdapterError, ModelAdapter};
use cloudgenie_domain::{
    AdapterResponse, ConversationTurn, PromptTemplate, StopReason, TokenUsage, ToolCatalog,
    ToolInvocation,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::http::{build_client, post_json};
use super::{AdapterSettings, ProviderKind};

pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

// ─── Wire types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<FunctionTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded argument object.
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct FunctionTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionDefinition<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionDefinition<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

// ─── Conversions ────────────────────────────────────────────────

fn build_messages(prompt: &str, history: &[ConversationTurn]) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::text("system", PromptTemplate::native_tools_system())];

    for turn in history {
        match turn {
            ConversationTurn::User { text } => messages.push(ChatMessage::text("user", text)),
            ConversationTurn::Assistant { text, invocations } => {
                let tool_calls = invocations
                    .iter()
                    .map(|inv| WireToolCall {
                        id: inv.id.clone(),
                        kind: function_type(),
                        function: WireFunctionCall {
                            name: inv.name.clone(),
                            arguments: inv.arguments_json().to_string(),
                        },
                    })
                    .collect::<Vec<_>>();
                messages.push(ChatMessage {
                    role: "assistant".to_string(),
                    content: (!text.is_empty() || tool_calls.is_empty()).then(|| text.clone()),
                    tool_calls,
                    tool_call_id: None,
                });
            }
            ConversationTurn::ToolResults { results } => {
                messages.extend(results.iter().map(|r| ChatMessage {
                    role: "tool".to_string(),
                    content: Some(r.content.clone()),
                    tool_calls: Vec::new(),
                    tool_call_id: Some(r.invocation_id.clone()),
                }));
            }
        }
    }

    messages.push(ChatMessage::text("user", prompt));
    messages
}

fn build_request<'a>(
    model: &'a str,
    prompt: &str,
    tools: &'a ToolCatalog,
    history: &[ConversationTurn],
) -> ChatRequest<'a> {
    let tools: Vec<FunctionTool<'a>> = tools
        .iter()
        .map(|t| FunctionTool {
            kind: "function",
            function: FunctionDefinition {
                name: &t.name,
                description: &t.description,
                parameters: &t.input_schema,
            },
        })
        .collect();
    let tool_choice = (!tools.is_empty()).then_some("auto");

    ChatRequest {
        model,
        messages: build_messages(prompt, history),
        tools,
        tool_choice,
    }
}

fn parse_response(body: Value) -> Result<AdapterResponse, AdapterError> {
    let response: ChatResponse = serde_json::from_value(body)
        .map_err(|e| AdapterError::InvalidResponse(format!("unexpected OpenAI response: {}", e)))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AdapterError::InvalidResponse("no response from OpenAI".to_string()))?;

    let invocations = choice
        .message
        .tool_calls
        .into_iter()
        .map(|tc| {
            let arguments = parse_arguments(&tc.function.arguments).map_err(|e| {
                AdapterError::InvalidResponse(format!(
                    "failed to parse arguments for tool {}: {}",
                    tc.function.name, e
                ))
            })?;
            Ok(ToolInvocation::new(tc.id, tc.function.name).with_arguments(arguments))
        })
        .collect::<Result<Vec<_>, AdapterError>>()?;

    let termination_reason = match choice.finish_reason.as_deref() {
        Some(reason) => StopReason::from_provider(reason),
        None if !invocations.is_empty() => StopReason::ToolUse,
        None => StopReason::EndTurn,
    };

    Ok(AdapterResponse {
        text: choice.message.content.unwrap_or_default(),
        invocations,
        termination_reason,
        usage: response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
    })
}

fn parse_arguments(raw: &str) -> Result<HashMap<String, Value>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(HashMap::new());
    }
    serde_json::from_str(raw)
}

// ─── Adapter ────────────────────────────────────────────────────

pub struct OpenAiAdapter {
    client: reqwest::Client,
    settings: AdapterSettings,
}

impl OpenAiAdapter {
    pub fn new(mut settings: AdapterSettings) -> Result<Self, AdapterError> {
        settings.require_key(ProviderKind::OpenAi)?;
        if settings.model.is_empty() {
            settings.model = DEFAULT_MODEL.to_string();
        }
        Ok(Self {
            client: build_client()?,
            settings,
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }
}

#[async_trait]
impl ModelAdapter for OpenAiAdapter {
    async fn chat(
        &self,
        prompt: &str,
        tools: &ToolCatalog,
        history: &[ConversationTurn],
    ) -> Result<AdapterResponse, AdapterError> {
        let request = build_request(&self.settings.model, prompt, tools, history);
        debug!(
            model = %self.settings.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "OpenAI chat completion"
        );

        let url = format!(
            "{}/chat/completions",
            self.settings.endpoint_root(DEFAULT_BASE_URL)
        );
        let http = self
            .client
            .post(url)
            .bearer_auth(&self.settings.api_key);
        let body = post_json("OpenAI", http, &request).await?;
        parse_response(body)
    }

    fn name(&self) -> &str {
        ProviderKind::OpenAi.as_str()
    }
}
