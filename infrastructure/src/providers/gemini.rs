//! Google Gemini adapter.
//!
//! Tools are not passed as structured declarations. The catalog is described
//! in the prompt and the model answers with `TOOL_CALL:` lines, which are
//! parsed back out of the response text.

use async_trait::async_trait;
use cloudgenie_application::{AdapterError, ModelAdapter};
use cloudgenie_domain::{
    AdapterResponse, ConversationTurn, PromptTemplate, StopReason, TokenUsage, ToolCatalog,
    extract_tool_calls,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as _;
use tracing::debug;

use super::http::{build_client, post_json};
use super::{AdapterSettings, ProviderKind};

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ─── Wire types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

// ─── Conversions ────────────────────────────────────────────────

/// Flatten the system prompt, history and prompt into one transcript.
fn build_transcript(prompt: &str, tools: &ToolCatalog, history: &[ConversationTurn]) -> String {
    let mut out = PromptTemplate::text_tools_system(tools);
    out.push_str("\n\n");

    for turn in history {
        match turn {
            ConversationTurn::User { text } => {
                let _ = writeln!(out, "User: {}", text);
            }
            ConversationTurn::Assistant { text, invocations } => {
                let _ = write!(out, "Assistant: {}", text);
                for inv in invocations {
                    let _ = write!(out, "\nTOOL_CALL: {}({})", inv.name, inv.arguments_json());
                }
                out.push('\n');
            }
            ConversationTurn::ToolResults { results } => {
                for r in results {
                    let status = if r.is_error { "error" } else { "ok" };
                    let _ = writeln!(out, "Tool {} ({}): {}", r.tool_name, status, r.content);
                }
            }
        }
    }

    let _ = write!(out, "\nUser: {}\n\nAssistant:", prompt);
    out
}

fn build_request(prompt: &str, tools: &ToolCatalog, history: &[ConversationTurn]) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(build_transcript(prompt, tools, history)),
            }],
        }],
        generation_config: GenerationConfig::default(),
    }
}

fn parse_response(body: Value, tools: &ToolCatalog) -> Result<AdapterResponse, AdapterError> {
    let response: GenerateResponse = serde_json::from_value(body)
        .map_err(|e| AdapterError::InvalidResponse(format!("unexpected Gemini response: {}", e)))?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AdapterError::InvalidResponse("no response from Gemini".to_string()))?;

    let text: String = candidate
        .content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    let invocations = extract_tool_calls(&text, tools);

    let termination_reason = if !invocations.is_empty() {
        StopReason::ToolUse
    } else {
        candidate
            .finish_reason
            .as_deref()
            .map(StopReason::from_provider)
            .unwrap_or(StopReason::EndTurn)
    };

    Ok(AdapterResponse {
        text,
        invocations,
        termination_reason,
        usage: response.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        }),
    })
}

// ─── Adapter ────────────────────────────────────────────────────

pub struct GeminiAdapter {
    client: reqwest::Client,
    settings: AdapterSettings,
}

impl GeminiAdapter {
    pub fn new(mut settings: AdapterSettings) -> Result<Self, AdapterError> {
        settings.require_key(ProviderKind::Gemini)?;
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
impl ModelAdapter for GeminiAdapter {
    async fn chat(
        &self,
        prompt: &str,
        tools: &ToolCatalog,
        history: &[ConversationTurn],
    ) -> Result<AdapterResponse, AdapterError> {
        let request = build_request(prompt, tools, history);
        debug!(
            model = %self.settings.model,
            turns = history.len(),
            tools = tools.len(),
            "Gemini generateContent"
        );

        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.endpoint_root(DEFAULT_BASE_URL),
            self.settings.model
        );
        let http = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.settings.api_key);
        let body = post_json("Gemini", http, &request).await?;
        parse_response(body, tools)
    }

    fn name(&self) -> &str {
        ProviderKind::Gemini.as_str()
    }
}
