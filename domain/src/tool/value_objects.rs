//! Tool domain value objects — outcomes returned by the tool endpoint and
//! the per-invocation results folded back into the conversation.
//!
//! A [`ToolOutcome`] is what the endpoint said (ordered content parts plus
//! an `is_error` flag for tool-level failure). A [`ToolResult`] is what the
//! orchestration loop records for one invocation: the outcome rendered to
//! text, or a locally synthesized error when the call never completed.

use serde::{Deserialize, Serialize};

/// Fixed text used when a tool succeeds without producing any content.
pub const EMPTY_OUTPUT_MESSAGE: &str = "Tool executed successfully with no output";

/// One piece of tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    Resource {
        resource: EmbeddedResource,
    },
}

/// Resource payload embedded in a tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedResource {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<String>,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Result of one `tools/call` exchange.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutcome {
    #[serde(default)]
    pub content: Vec<ContentPart>,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolOutcome {
    pub fn success(content: Vec<ContentPart>) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::success(vec![ContentPart::text(text)])
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentPart::text(text)],
            is_error: true,
        }
    }

    /// Render the outcome as the text handed back to the model.
    ///
    /// - no parts: [`EMPTY_OUTPUT_MESSAGE`]
    /// - one text part: that text verbatim
    /// - several text parts: a pretty-printed JSON array of the texts
    /// - no text parts at all: the whole outcome as JSON
    pub fn render(&self) -> String {
        if self.content.is_empty() {
            return EMPTY_OUTPUT_MESSAGE.to_string();
        }

        let texts: Vec<&str> = self.content.iter().filter_map(|c| c.as_text()).collect();
        match texts.as_slice() {
            [] => serde_json::to_string(self)
                .unwrap_or_else(|_| "Tool result could not be formatted".to_string()),
            [single] => (*single).to_string(),
            many => serde_json::to_string_pretty(many).unwrap_or_else(|_| many.join("\n")),
        }
    }
}

/// What the loop records for one resolved invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(rename = "tool_call_id")]
    pub invocation_id: String,
    #[serde(rename = "name")]
    pub tool_name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
    /// Served from the result cache instead of the tool endpoint.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cached: bool,
}

impl ToolResult {
    pub fn success(
        invocation_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            tool_name: tool_name.into(),
            content: content.into(),
            is_error: false,
            cached: false,
        }
    }

    pub fn failure(
        invocation_id: impl Into<String>,
        tool_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            is_error: true,
            ..Self::success(invocation_id, tool_name, message)
        }
    }

    pub fn with_cached(mut self, cached: bool) -> Self {
        self.cached = cached;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_empty_outcome() {
        assert_eq!(ToolOutcome::default().render(), EMPTY_OUTPUT_MESSAGE);
    }

    #[test]
    fn render_single_text_verbatim() {
        assert_eq!(ToolOutcome::text("[]").render(), "[]");
    }

    #[test]
    fn render_multiple_texts_as_json_array() {
        let outcome = ToolOutcome::success(vec![ContentPart::text("a"), ContentPart::text("b")]);
        let rendered = outcome.render();
        let parsed: Vec<String> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, vec!["a", "b"]);
    }

    #[test]
    fn render_non_text_falls_back_to_json() {
        let outcome = ToolOutcome::success(vec![ContentPart::Image {
            data: "aGk=".to_string(),
            mime_type: "image/png".to_string(),
        }]);
        let rendered = outcome.render();
        assert!(rendered.contains("image/png"));
        assert!(rendered.contains("\"type\":\"image\""));
    }

    #[test]
    fn outcome_deserializes_wire_shape() {
        let json = serde_json::json!({
            "content": [
                {"type": "text", "text": "hello"},
                {"type": "resource", "resource": {"uri": "file:///a", "text": "x"}}
            ],
            "isError": true
        });
        let outcome: ToolOutcome = serde_json::from_value(json).unwrap();
        assert!(outcome.is_error);
        assert_eq!(outcome.content.len(), 2);
        assert_eq!(outcome.content[0].as_text(), Some("hello"));
    }

    #[test]
    fn tool_result_serializes_trace_shape() {
        let result = ToolResult::failure("call_1", "get_resources", "boom");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["tool_call_id"], "call_1");
        assert_eq!(json["name"], "get_resources");
        assert_eq!(json["is_error"], true);
        assert!(json.get("cached").is_none());
    }
}
