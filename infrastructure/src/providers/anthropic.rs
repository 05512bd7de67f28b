//! Anthropic Messages API adapter (native `tool_use` blocks).
//!
//! The Messages API wants strictly alternating user/assistant turns, so tool
//! results and the follow-up prompt share one user message.

use async_trait::async_trait;
use cloudgenie_application::{AdapterError, ModelAdapter};
use cloudgenie_domain::{
    AdapterResponse, ConversationTurn, PromptTemplate, StopReason, TokenUsage, ToolCatalog,
    ToolInvocation,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::http::{build_client, post_json};
use super::{AdapterSettings, ProviderKind};

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

// ─── Wire types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'static str,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSpec<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Block {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Serialize)]
struct ToolSpec<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<Block>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

// ─── Conversions ────────────────────────────────────────────────

/// Append blocks to the last message when it has the same role, otherwise
/// start a new message.
fn push_blocks(messages: &mut Vec<Message>, role: &'static str, blocks: Vec<Block>) {
    if blocks.is_empty() {
        return;
    }
    match messages.last_mut() {
        Some(last) if last.role == role => last.content.extend(blocks),
        _ => messages.push(Message {
            role,
            content: blocks,
        }),
    }
}

fn build_messages(prompt: &str, history: &[ConversationTurn]) -> Vec<Message> {
    let mut messages = Vec::new();

    for turn in history {
        match turn {
            ConversationTurn::User { text } => {
                push_blocks(&mut messages, "user", vec![Block::Text { text: text.clone() }]);
            }
            ConversationTurn::Assistant { text, invocations } => {
                let mut blocks = Vec::with_capacity(invocations.len() + 1);
                if !text.is_empty() {
                    blocks.push(Block::Text { text: text.clone() });
                }
                blocks.extend(invocations.iter().map(|inv| Block::ToolUse {
                    id: inv.id.clone(),
                    name: inv.name.clone(),
                    input: inv.arguments_json(),
                }));
                push_blocks(&mut messages, "assistant", blocks);
            }
            ConversationTurn::ToolResults { results } => {
                let blocks = results
                    .iter()
                    .map(|r| Block::ToolResult {
                        tool_use_id: r.invocation_id.clone(),
                        content: r.content.clone(),
                        is_error: r.is_error,
                    })
                    .collect();
                push_blocks(&mut messages, "user", blocks);
            }
        }
    }

    push_blocks(
        &mut messages,
        "user",
        vec![Block::Text {
            text: prompt.to_string(),
        }],
    );
    messages
}

fn build_request<'a>(
    model: &'a str,
    prompt: &str,
    tools: &'a ToolCatalog,
    history: &[ConversationTurn],
) -> MessagesRequest<'a> {
    MessagesRequest {
        model,
        max_tokens: MAX_TOKENS,
        system: PromptTemplate::native_tools_system(),
        messages: build_messages(prompt, history),
        tools: tools
            .iter()
            .map(|t| ToolSpec {
                name: &t.name,
                description: &t.description,
                input_schema: &t.input_schema,
            })
            .collect(),
    }
}

fn parse_response(body: Value) -> Result<AdapterResponse, AdapterError> {
    let response: MessagesResponse = serde_json::from_value(body).map_err(|e| {
        AdapterError::InvalidResponse(format!("unexpected Anthropic response: {}", e))
    })?;

    let mut text = String::new();
    let mut invocations = Vec::new();
    for block in response.content {
        match block {
            Block::Text { text: t } => text.push_str(&t),
            Block::ToolUse { id, name, input } => {
                let arguments = match input {
                    Value::Object(map) => map.into_iter().collect::<HashMap<_, _>>(),
                    Value::Null => HashMap::new(),
                    other => {
                        warn!("Ignoring non-object input for tool {}: {}", name, other);
                        HashMap::new()
                    }
                };
                invocations.push(ToolInvocation::new(id, name).with_arguments(arguments));
            }
            Block::ToolResult { .. } | Block::Unsupported => {}
        }
    }

    let termination_reason = match response.stop_reason.as_deref() {
        Some(reason) => StopReason::from_provider(reason),
        None if !invocations.is_empty() => StopReason::ToolUse,
        None => StopReason::EndTurn,
    };

    Ok(AdapterResponse {
        text,
        invocations,
        termination_reason,
        usage: response.usage.map(|u| TokenUsage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
            total_tokens: u.input_tokens + u.output_tokens,
        }),
    })
}

// ─── Adapter ────────────────────────────────────────────────────

pub struct AnthropicAdapter {
    client: reqwest::Client,
    settings: AdapterSettings,
}

impl AnthropicAdapter {
    pub fn new(mut settings: AdapterSettings) -> Result<Self, AdapterError> {
        settings.require_key(ProviderKind::Anthropic)?;
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
impl ModelAdapter for AnthropicAdapter {
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
            "Anthropic messages request"
        );

        let url = format!("{}/messages", self.settings.endpoint_root(DEFAULT_BASE_URL));
        let http = self
            .client
            .post(url)
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", API_VERSION);
        let body = post_json("Anthropic", http, &request).await?;
        parse_response(body)
    }

    fn name(&self) -> &str {
        ProviderKind::Anthropic.as_str()
    }
}
