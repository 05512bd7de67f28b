//! Output formatter trait

use cloudgenie_application::{HealthReport, ToolInfo};
use cloudgenie_domain::OrchestrationOutcome;

/// Trait for formatting orchestration results
pub trait OutputFormatter {
    /// Format the outcome with its tool trace and statistics
    fn format(&self, outcome: &OrchestrationOutcome) -> String;

    /// Format as JSON
    fn format_json(&self, outcome: &OrchestrationOutcome) -> String;

    /// Format the final answer only
    fn format_answer_only(&self, outcome: &OrchestrationOutcome) -> String;

    fn format_tools(&self, tools: &[ToolInfo]) -> String;

    fn format_health(&self, report: &HealthReport) -> String;
}
