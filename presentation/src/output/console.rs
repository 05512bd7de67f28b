//! Console output formatter for orchestration results

use crate::output::formatter::OutputFormatter;
use cloudgenie_application::{HealthReport, ToolInfo};
use cloudgenie_domain::OrchestrationOutcome;
use cloudgenie_domain::util::preview;
use colored::Colorize;

const RESULT_PREVIEW_BYTES: usize = 100;

/// Formats orchestration results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete outcome
    pub fn format(outcome: &OrchestrationOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("CloudGenie"));
        output.push('\n');

        if !outcome.invocations.is_empty() {
            output.push_str(&Self::section_header("Tool Calls"));
            for (invocation, result) in outcome.invocations.iter().zip(&outcome.results) {
                let mark = if result.is_error {
                    "x".red().bold()
                } else {
                    "v".green().bold()
                };
                let cached = if result.cached {
                    format!(" {}", "(cached)".dimmed())
                } else {
                    String::new()
                };
                output.push_str(&format!(
                    "  {} {}{}{}\n",
                    mark,
                    invocation.name.yellow(),
                    invocation.arguments_json().to_string().dimmed(),
                    cached
                ));
                output.push_str(&format!(
                    "      {}\n",
                    preview(&result.content, RESULT_PREVIEW_BYTES)
                ));
            }
        }

        output.push_str(&Self::section_header("Response"));
        output.push_str(&format!("\n{}\n", outcome.final_text));

        if outcome.is_limit_reached() {
            output.push_str(&format!(
                "\n{}\n",
                "Stopped at the tool iteration limit.".yellow().bold()
            ));
        }

        output.push_str(&format!("\n{}\n", Self::stats_line(outcome).dimmed()));
        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(outcome: &OrchestrationOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final answer only (concise output)
    pub fn format_answer_only(outcome: &OrchestrationOutcome) -> String {
        format!("{}\n", outcome.final_text)
    }

    pub fn format_tools(tools: &[ToolInfo]) -> String {
        if tools.is_empty() {
            return format!("{}\n", "The MCP server offers no tools.".yellow());
        }

        let mut output = format!("{} ({})\n", "Available tools".cyan().bold(), tools.len());
        for tool in tools {
            output.push_str(&format!("\n  {}\n", tool.name.yellow().bold()));
            if !tool.description.is_empty() {
                output.push_str(&Self::indent(&tool.description, "    "));
                output.push('\n');
            }
            for param in &tool.parameters {
                let required = if param.required {
                    " (required)".red().to_string()
                } else {
                    String::new()
                };
                output.push_str(&format!(
                    "    - {} {}{}: {}\n",
                    param.name,
                    format!("<{}>", param.param_type).dimmed(),
                    required,
                    param.description
                ));
            }
        }
        output
    }

    pub fn format_health(report: &HealthReport) -> String {
        let status = if report.is_healthy() {
            "healthy".green().bold()
        } else {
            "unhealthy".red().bold()
        };
        let server = report
            .server
            .as_ref()
            .map(|s| format!("{} {} (protocol {})", s.name, s.version, s.protocol_version))
            .unwrap_or_else(|| "not initialized".to_string());

        format!(
            "{} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n",
            "Status:".cyan().bold(),
            status,
            "MCP server:".cyan(),
            server,
            "Model adapter:".cyan(),
            report.model_adapter,
            "Tools:".cyan(),
            report.tools_count,
            "Cached results:".cyan(),
            report.cache_entries
        )
    }

    fn stats_line(outcome: &OrchestrationOutcome) -> String {
        let m = &outcome.metadata;
        format!(
            "iterations: {} | tools: {} | cache: {} hit / {} miss | provider: {}",
            m.iterations, m.tools_available, m.cache_hits, m.cache_misses, m.provider
        )
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, outcome: &OrchestrationOutcome) -> String {
        Self::format(outcome)
    }

    fn format_json(&self, outcome: &OrchestrationOutcome) -> String {
        Self::format_json(outcome)
    }

    fn format_answer_only(&self, outcome: &OrchestrationOutcome) -> String {
        Self::format_answer_only(outcome)
    }

    fn format_tools(&self, tools: &[ToolInfo]) -> String {
        Self::format_tools(tools)
    }

    fn format_health(&self, report: &HealthReport) -> String {
        Self::format_health(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudgenie_application::ServerInfo;
    use cloudgenie_domain::{
        CacheStats, OrchestrationMetadata, Termination, ToolInvocation, ToolParameter, ToolResult,
    };

    fn outcome() -> OrchestrationOutcome {
        OrchestrationOutcome {
            final_text: "No blueprints found".to_string(),
            invocations: vec![ToolInvocation::new("call_1", "list_blueprints")],
            results: vec![ToolResult::success("call_1", "list_blueprints", "[]").with_cached(true)],
            termination: Termination::Done,
            metadata: OrchestrationMetadata {
                iterations: 2,
                cache_hits: 1,
                tools_available: 3,
                provider: "openai".to_string(),
                cache_stats: CacheStats { total_entries: 1 },
                ..Default::default()
            },
        }
    }

    #[test]
    fn full_format_shows_trace_and_stats() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&outcome());
        assert!(text.contains("v list_blueprints{} (cached)"));
        assert!(text.contains("No blueprints found"));
        assert!(text.contains("iterations: 2 | tools: 3 | cache: 1 hit / 0 miss | provider: openai"));
        assert!(!text.contains("iteration limit"));
    }

    #[test]
    fn full_format_flags_limit() {
        colored::control::set_override(false);
        let mut outcome = outcome();
        outcome.termination = Termination::IterationLimitReached;
        assert!(ConsoleFormatter::format(&outcome).contains("iteration limit"));
    }

    #[test]
    fn json_format_uses_api_field_names() {
        let value: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&outcome())).unwrap();
        assert_eq!(value["response"], "No blueprints found");
        assert_eq!(value["tool_calls"][0]["name"], "list_blueprints");
        assert_eq!(value["metadata"]["cache_hits"], 1);
    }

    #[test]
    fn answer_only() {
        assert_eq!(
            ConsoleFormatter::format_answer_only(&outcome()),
            "No blueprints found\n"
        );
    }

    #[test]
    fn tools_listing() {
        colored::control::set_override(false);
        let tools = vec![ToolInfo {
            name: "create_resource".to_string(),
            description: "Create a resource from a blueprint".to_string(),
            parameters: vec![
                ToolParameter::new("name", "Resource name", true).with_type("string"),
            ],
        }];
        let text = ConsoleFormatter::format_tools(&tools);
        assert!(text.contains("Available tools (1)"));
        assert!(text.contains("- name <string> (required): Resource name"));
        assert!(ConsoleFormatter::format_tools(&[]).contains("no tools"));
    }

    #[test]
    fn health_report() {
        colored::control::set_override(false);
        let report = HealthReport {
            tool_client: true,
            server: Some(ServerInfo {
                name: "cloudgenie-mcp".to_string(),
                version: "1.0.0".to_string(),
                protocol_version: "2024-11-05".to_string(),
            }),
            model_adapter: "gemini".to_string(),
            tools_count: 4,
            cache_entries: 0,
        };
        let text = ConsoleFormatter::format_health(&report);
        assert!(text.contains("Status: healthy"));
        assert!(text.contains("cloudgenie-mcp 1.0.0 (protocol 2024-11-05)"));
        assert!(text.contains("Model adapter: gemini"));
    }
}
