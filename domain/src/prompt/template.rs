//! Prompt templates for the tool loop

use crate::tool::entities::ToolCatalog;
use crate::tool::value_objects::ToolResult;

/// Templates for generating prompts at each step of the tool loop
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for backends with native tool calling
    pub fn native_tools_system() -> &'static str {
        "You are a helpful AI assistant that can interact with the CloudGenie infrastructure management platform. \
You have access to various tools to help manage cloud resources. \
When asked to perform operations, use the available tools to accomplish the task."
    }

    /// System prompt for backends that can only request tools in free text.
    ///
    /// Lists every tool with its parameters and required fields, and
    /// describes the `TOOL_CALL:` line format the response parser expects.
    pub fn text_tools_system(catalog: &ToolCatalog) -> String {
        let mut prompt = String::from(
            r#"You are a helpful AI assistant that can interact with the CloudGenie infrastructure management platform.

You have access to the following tools to help manage cloud resources. When you need to perform an action, call the appropriate tool by responding in this EXACT format:

TOOL_CALL: tool_name({"arg1": "value1", "arg2": "value2"})

For example:
TOOL_CALL: get_blueprints({})
TOOL_CALL: create_resource({"name": "my-app", "blueprint": "web-server"})

Available tools:
"#,
        );

        for tool in catalog.iter() {
            prompt.push_str(&format!("\n{}: {}\n", tool.name, tool.description));
            if !tool.parameters.is_empty() {
                prompt.push_str("  Parameters:\n");
                for param in &tool.parameters {
                    prompt.push_str(&format!(
                        "    - {} ({}): {}\n",
                        param.name, param.param_type, param.description
                    ));
                }
            }
            let required: Vec<&str> = tool.required_parameters().map(|p| p.name.as_str()).collect();
            if !required.is_empty() {
                prompt.push_str(&format!("  Required: {}\n", required.join(", ")));
            }
        }

        prompt.push_str(
            r#"
IMPORTANT RULES:
1. When you need to use a tool, output EXACTLY in the format: TOOL_CALL: tool_name({json_args})
2. You can call multiple tools by outputting multiple TOOL_CALL lines
3. After calling tools, explain what you're doing
4. Use proper JSON format for arguments
5. Don't make up tool names - only use the tools listed above
"#,
        );

        prompt
    }

    /// Summary of one iteration's tool results, sent as the next user turn.
    pub fn tool_results(results: &[ToolResult]) -> String {
        let mut prompt = String::from("Tool execution results:\n\n");
        for result in results {
            if result.is_error {
                prompt.push_str(&format!("❌ Error: {}\n\n", result.content));
            } else {
                prompt.push_str(&format!("✓ Success: {}\n\n", result.content));
            }
        }
        prompt.push_str("Please analyze these results and provide a response to the user.");
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::{ToolDescriptor, ToolParameter};

    #[test]
    fn tool_results_marks_success_and_error() {
        let results = vec![
            ToolResult::success("call_1", "list_blueprints", "[]"),
            ToolResult::failure(
                "call_2",
                "create_resource",
                "Error calling tool create_resource: transport closed",
            ),
        ];
        let prompt = PromptTemplate::tool_results(&results);
        assert_eq!(
            prompt,
            "Tool execution results:\n\n\
             ✓ Success: []\n\n\
             ❌ Error: Error calling tool create_resource: transport closed\n\n\
             Please analyze these results and provide a response to the user."
        );
    }

    #[test]
    fn tool_results_empty() {
        let prompt = PromptTemplate::tool_results(&[]);
        assert!(prompt.starts_with("Tool execution results:\n\n"));
        assert!(prompt.ends_with("provide a response to the user."));
    }

    #[test]
    fn text_tools_system_lists_catalog() {
        let catalog = ToolCatalog::new(vec![
            ToolDescriptor::new("create_resource", "Create a resource from a blueprint")
                .with_parameter(ToolParameter::new("name", "Resource name", true))
                .with_parameter(ToolParameter::new("blueprint", "Blueprint id", false)),
        ]);
        let prompt = PromptTemplate::text_tools_system(&catalog);
        assert!(prompt.contains("create_resource: Create a resource from a blueprint"));
        assert!(prompt.contains("    - name (string): Resource name"));
        assert!(prompt.contains("  Required: name\n"));
        assert!(prompt.contains("TOOL_CALL: tool_name({json_args})"));
    }
}
