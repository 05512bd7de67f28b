//! Conversation entities
//!
//! A conversation lives only for the duration of one orchestration call:
//! turns are appended, never edited, and the whole history is dropped when
//! the call returns.

use crate::tool::entities::ToolInvocation;
use crate::tool::value_objects::ToolResult;
use serde::{Deserialize, Serialize};

/// Role of a turn in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ConversationTurn {
    /// Text sent to the model on behalf of the user (the original prompt or
    /// a tool-result summary).
    User { text: String },
    /// Model output: text plus the invocations it requested.
    Assistant {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        invocations: Vec<ToolInvocation>,
    },
    /// Results for every invocation of the preceding assistant turn.
    ToolResults { results: Vec<ToolResult> },
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        ConversationTurn::User { text: text.into() }
    }

    pub fn assistant(text: impl Into<String>, invocations: Vec<ToolInvocation>) -> Self {
        ConversationTurn::Assistant {
            text: text.into(),
            invocations,
        }
    }

    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        ConversationTurn::ToolResults { results }
    }

    pub fn role(&self) -> Role {
        match self {
            ConversationTurn::User { .. } => Role::User,
            ConversationTurn::Assistant { .. } => Role::Assistant,
            ConversationTurn::ToolResults { .. } => Role::Tool,
        }
    }
}

/// Append-only conversation history.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_appends_in_order() {
        let mut conversation = Conversation::new();
        conversation.push(ConversationTurn::user("list blueprints"));
        conversation.push(ConversationTurn::assistant(
            "",
            vec![ToolInvocation::new("call_1", "list_blueprints")],
        ));
        conversation.push(ConversationTurn::tool_results(vec![ToolResult::success(
            "call_1",
            "list_blueprints",
            "[]",
        )]));

        let roles: Vec<_> = conversation.turns().iter().map(|t| t.role()).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Tool]);
    }

    #[test]
    fn assistant_turn_serializes_with_role_tag() {
        let json = serde_json::to_value(ConversationTurn::assistant("hi", vec![])).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json.get("invocations").is_none());
    }
}
