//! Glean Chat adapter.
//!
//! Glean has no tool declarations and no system role. The catalog goes in
//! an opening user message, tool results are appended to the assistant turn
//! that requested them, and invocations come back as `TOOL_CALL:` lines.

use async_trait::async_trait;
use cloudgenie_application::{AdapterError, ModelAdapter};
use cloudgenie_domain::{
    AdapterResponse, ConversationTurn, PromptTemplate, StopReason, ToolCatalog, extract_tool_calls,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as _;
use tracing::debug;

use super::http::{build_client, post_json};
use super::{AdapterSettings, ProviderKind};

/// Glean picks the model server-side; this only labels the backend.
pub const DEFAULT_MODEL: &str = "default";

const USER: &str = "USER";
const ASSISTANT: &str = "GLEAN_AI";
const ACKNOWLEDGEMENT: &str = "Understood. I will use the TOOL_CALL format when I need to use tools.";

/// Client API root for a Glean instance name.
pub fn instance_base_url(instance: &str) -> String {
    format!("https://{}-be.glean.com/rest/api/v1", instance.trim())
}

// ─── Wire types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    fragments: Vec<Fragment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Fragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

impl ChatMessage {
    fn new(author: &str, text: impl Into<String>) -> Self {
        Self {
            author: Some(author.to_string()),
            fragments: vec![Fragment {
                text: Some(text.into()),
            }],
        }
    }

    fn text(&self) -> String {
        self.fragments.iter().filter_map(|f| f.text.as_deref()).collect()
    }
}

// ─── Conversions ────────────────────────────────────────────────

fn build_messages(prompt: &str, tools: &ToolCatalog, history: &[ConversationTurn]) -> Vec<ChatMessage> {
    let mut messages = vec![
        ChatMessage::new(USER, PromptTemplate::text_tools_system(tools)),
        ChatMessage::new(ASSISTANT, ACKNOWLEDGEMENT),
    ];

    for turn in history {
        match turn {
            ConversationTurn::User { text } => messages.push(ChatMessage::new(USER, text.as_str())),
            ConversationTurn::Assistant { text, invocations } => {
                let mut content = text.clone();
                for inv in invocations {
                    let _ = write!(content, "\nTOOL_CALL: {}({})", inv.name, inv.arguments_json());
                }
                messages.push(ChatMessage::new(ASSISTANT, content));
            }
            ConversationTurn::ToolResults { results } => {
                let mut summary = String::from("\n\nTool Results:\n");
                for r in results {
                    if r.is_error {
                        let _ = writeln!(summary, "Error: {}", r.content);
                    } else {
                        let _ = writeln!(summary, "✓ {}", r.content);
                    }
                }
                match messages.last_mut() {
                    Some(last) if last.author.as_deref() == Some(ASSISTANT) => {
                        last.fragments.push(Fragment {
                            text: Some(summary),
                        });
                    }
                    _ => messages.push(ChatMessage::new(ASSISTANT, summary.trim_start())),
                }
            }
        }
    }

    messages.push(ChatMessage::new(USER, prompt));
    messages
}

fn parse_response(body: Value, tools: &ToolCatalog) -> Result<AdapterResponse, AdapterError> {
    let response: ChatResponse = serde_json::from_value(body)
        .map_err(|e| AdapterError::InvalidResponse(format!("unexpected Glean response: {}", e)))?;

    let text = response
        .messages
        .last()
        .map(ChatMessage::text)
        .ok_or_else(|| AdapterError::InvalidResponse("no response from Glean".to_string()))?;
    let invocations = extract_tool_calls(&text, tools);
    let termination_reason = if invocations.is_empty() {
        StopReason::EndTurn
    } else {
        StopReason::ToolUse
    };

    Ok(AdapterResponse {
        text,
        invocations,
        termination_reason,
        usage: None,
    })
}

// ─── Adapter ────────────────────────────────────────────────────

pub struct GleanAdapter {
    client: reqwest::Client,
    settings: AdapterSettings,
}

impl GleanAdapter {
    /// `settings.base_url` must point at the instance's client API root
    /// (see [`instance_base_url`]).
    pub fn new(mut settings: AdapterSettings) -> Result<Self, AdapterError> {
        settings.require_key(ProviderKind::Glean)?;
        if settings.base_url.as_deref().is_none_or(|u| u.trim().is_empty()) {
            return Err(AdapterError::Configuration(
                "Glean instance is required (e.g. 'your-company')".to_string(),
            ));
        }
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
impl ModelAdapter for GleanAdapter {
    async fn chat(
        &self,
        prompt: &str,
        tools: &ToolCatalog,
        history: &[ConversationTurn],
    ) -> Result<AdapterResponse, AdapterError> {
        let request = ChatRequest {
            messages: build_messages(prompt, tools, history),
            stream: false,
        };
        debug!(messages = request.messages.len(), tools = tools.len(), "Glean chat request");

        let url = format!("{}/chat", self.settings.endpoint_root(""));
        let http = self.client.post(url).bearer_auth(&self.settings.api_key);
        let body = post_json("Glean", http, &request).await?;
        parse_response(body, tools)
    }

    fn name(&self) -> &str {
        ProviderKind::Glean.as_str()
    }
}
