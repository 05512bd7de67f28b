//! Model adapter response types.
//!
//! Every backend, whether it reports tool calls as structured fields or as
//! `TOOL_CALL:` lines in its text, is normalized into an [`AdapterResponse`].
//! The orchestration loop only looks at whether `invocations` is empty.

use crate::tool::entities::ToolInvocation;
use serde::{Deserialize, Serialize};

/// Reason the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response — the model is done.
    EndTurn,
    /// The model wants to call tools.
    ToolUse,
    /// Hit the token limit — response may be truncated.
    MaxTokens,
    /// Provider-specific stop reason.
    Other(String),
}

impl StopReason {
    /// Map a provider's raw finish reason string.
    pub fn from_provider(reason: &str) -> Self {
        match reason {
            "stop" | "end_turn" | "STOP" => StopReason::EndTurn,
            "tool_calls" | "tool_use" | "function_call" => StopReason::ToolUse,
            "length" | "max_tokens" | "MAX_TOKENS" => StopReason::MaxTokens,
            other => StopReason::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StopReason::EndTurn => "end_turn",
            StopReason::ToolUse => "tool_use",
            StopReason::MaxTokens => "max_tokens",
            StopReason::Other(s) => s,
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token accounting reported by the backend, when available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Normalized output of one `ModelAdapter::chat` call.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterResponse {
    pub text: String,
    pub invocations: Vec<ToolInvocation>,
    pub termination_reason: StopReason,
    pub usage: Option<TokenUsage>,
}

impl AdapterResponse {
    /// A text-only response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            invocations: Vec::new(),
            termination_reason: StopReason::EndTurn,
            usage: None,
        }
    }

    /// A response requesting tools.
    pub fn with_invocations(text: impl Into<String>, invocations: Vec<ToolInvocation>) -> Self {
        Self {
            text: text.into(),
            invocations,
            termination_reason: StopReason::ToolUse,
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn has_invocations(&self) -> bool {
        !self.invocations.is_empty()
    }
}
