//! Extraction of tool invocations from free text.
//!
//! Backends without native tool calling are instructed to emit lines like
//!
//! ```text
//! TOOL_CALL: create_resource({"name": "my-app", "blueprint": "web-server"})
//! TOOL_CALL: list_blueprints
//! ```
//!
//! Only names present in the catalog are accepted. Unparseable argument
//! JSON degrades to an empty argument map rather than dropping the call.

use super::entities::{ToolCatalog, ToolInvocation};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static CALL_WITH_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"TOOL_CALL:\s*([a-zA-Z0-9_-]+)\s*\((.*?)\)").expect("valid tool call pattern")
});

static CALL_WITHOUT_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"TOOL_CALL:\s*([a-zA-Z0-9_-]+)\s*(?:\n|$)").expect("valid bare tool call pattern")
});

/// Parse `TOOL_CALL:` directives out of a model response.
///
/// The bare form (no parentheses) is only consulted when no call with an
/// argument list was found.
pub fn extract_tool_calls(content: &str, catalog: &ToolCatalog) -> Vec<ToolInvocation> {
    let mut calls: Vec<(String, HashMap<String, serde_json::Value>)> = CALL_WITH_ARGS
        .captures_iter(content)
        .filter(|caps| catalog.contains(&caps[1]))
        .map(|caps| {
            let args = parse_arguments(&caps[2]);
            (caps[1].to_string(), args)
        })
        .collect();

    if calls.is_empty() {
        calls = CALL_WITHOUT_ARGS
            .captures_iter(content)
            .filter(|caps| catalog.contains(&caps[1]))
            .map(|caps| (caps[1].to_string(), HashMap::new()))
            .collect();
    }

    calls
        .into_iter()
        .enumerate()
        .map(|(i, (name, args))| {
            ToolInvocation::new(format!("call_{}", i + 1), name).with_arguments(args)
        })
        .collect()
}

fn parse_arguments(raw: &str) -> HashMap<String, serde_json::Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return HashMap::new();
    }
    serde_json::from_str(trimmed).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ToolDescriptor;

    fn catalog() -> ToolCatalog {
        ToolCatalog::new(vec![
            ToolDescriptor::new("get_blueprints", ""),
            ToolDescriptor::new("create_resource", ""),
        ])
    }

    #[test]
    fn parses_call_with_arguments() {
        let text = "I'll create that.\nTOOL_CALL: create_resource({\"name\": \"my-app\", \"blueprint\": \"web-server\"})";
        let calls = extract_tool_calls(text, &catalog());
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].name, "create_resource");
        assert_eq!(calls[0].arguments["name"], "my-app");
    }

    #[test]
    fn parses_empty_argument_list() {
        let calls = extract_tool_calls("TOOL_CALL: get_blueprints({})", &catalog());
        assert_eq!(calls.len(), 1);
        assert!(calls[0].arguments.is_empty());
    }

    #[test]
    fn parses_bare_call() {
        let calls = extract_tool_calls("Let me check.\nTOOL_CALL: get_blueprints\n", &catalog());
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "get_blueprints");
    }

    #[test]
    fn unknown_tools_are_ignored() {
        let calls = extract_tool_calls(
            "TOOL_CALL: drop_database({})\nTOOL_CALL: get_blueprints({})",
            &catalog(),
        );
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "get_blueprints");
        assert_eq!(calls[0].id, "call_1");
    }

    #[test]
    fn malformed_arguments_become_empty() {
        let calls = extract_tool_calls("TOOL_CALL: create_resource(name=my-app)", &catalog());
        assert_eq!(calls.len(), 1);
        assert!(calls[0].arguments.is_empty());
    }

    #[test]
    fn multiple_calls_numbered_in_order() {
        let text = "TOOL_CALL: get_blueprints({})\nTOOL_CALL: create_resource({\"name\": \"x\"})";
        let calls = extract_tool_calls(text, &catalog());
        let ids: Vec<_> = calls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["call_1", "call_2"]);
    }

    #[test]
    fn plain_text_has_no_calls() {
        assert!(extract_tool_calls("Kubernetes is a container orchestrator.", &catalog()).is_empty());
    }
}
