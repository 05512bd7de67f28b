//! Progress reporting for orchestration runs

use cloudgenie_application::OrchestrationProgress;
use cloudgenie_domain::util::preview;
use cloudgenie_domain::{OrchestrationOutcome, ToolInvocation, ToolResult};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const RESULT_PREVIEW_BYTES: usize = 60;

/// Reports progress with a spinner; tool results are printed above it.
pub struct ProgressReporter {
    spinner: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(Self::spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn result_line(result: &ToolResult) -> String {
        let mark = if result.is_error {
            "x".red()
        } else {
            "v".green()
        };
        let cached = if result.cached { " (cached)" } else { "" };
        format!(
            "  {} {}{}: {}",
            mark,
            result.tool_name,
            cached.dimmed(),
            preview(&result.content, RESULT_PREVIEW_BYTES)
        )
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestrationProgress for ProgressReporter {
    fn on_iteration_start(&self, iteration: usize, max_iterations: usize) {
        self.spinner
            .set_prefix(format!("Iteration {}/{}", iteration, max_iterations));
        self.spinner.set_message("Waiting for model...");
    }

    fn on_tool_call(&self, invocation: &ToolInvocation) {
        self.spinner
            .set_message(format!("Calling {}...", invocation.name));
    }

    fn on_tool_result(&self, result: &ToolResult) {
        self.spinner.println(Self::result_line(result));
    }

    fn on_complete(&self, _outcome: &OrchestrationOutcome) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

/// Simple text-based progress on stderr (no fancy UI)
pub struct SimpleProgress;

impl OrchestrationProgress for SimpleProgress {
    fn on_iteration_start(&self, iteration: usize, max_iterations: usize) {
        eprintln!(
            "{} {}",
            "->".cyan(),
            format!("Iteration {}/{}", iteration, max_iterations).bold()
        );
    }

    fn on_tool_call(&self, invocation: &ToolInvocation) {
        eprintln!("  {} {}", "call".dimmed(), invocation.name);
    }

    fn on_tool_result(&self, result: &ToolResult) {
        eprintln!("{}", ProgressReporter::result_line(result));
    }

    fn on_complete(&self, outcome: &OrchestrationOutcome) {
        eprintln!(
            "{} done after {} iteration(s)",
            "->".cyan(),
            outcome.metadata.iterations
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_line_marks_errors_and_cache_hits() {
        colored::control::set_override(false);
        let ok = ToolResult::success("call_1", "list_blueprints", "[\n  \"web\"\n]").with_cached(true);
        assert_eq!(
            ProgressReporter::result_line(&ok),
            "  v list_blueprints (cached): [ \"web\" ]"
        );

        let err = ToolResult::failure("call_2", "get_resource", "Tool not found: get_resource");
        assert_eq!(
            ProgressReporter::result_line(&err),
            "  x get_resource: Tool not found: get_resource"
        );
    }

    #[test]
    fn reporter_finishes_spinner() {
        let reporter = ProgressReporter::new();
        reporter.on_iteration_start(1, 5);
        reporter.on_tool_call(&ToolInvocation::new("call_1", "list_blueprints"));
        reporter.on_complete(&OrchestrationOutcome {
            final_text: String::new(),
            invocations: Vec::new(),
            results: Vec::new(),
            termination: cloudgenie_domain::Termination::Done,
            metadata: Default::default(),
        });
        assert!(reporter.spinner.is_finished());
    }
}
