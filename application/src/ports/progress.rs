//! Progress notification port
//!
//! Defines the interface for reporting progress while the tool loop runs.

use cloudgenie_domain::{OrchestrationOutcome, ToolInvocation, ToolResult};

/// Callback for progress updates during orchestration
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, plain log lines, etc.)
pub trait OrchestrationProgress: Send + Sync {
    /// Called before each adapter call.
    fn on_iteration_start(&self, iteration: usize, max_iterations: usize);

    /// Called when an invocation is dispatched (or served from cache).
    fn on_tool_call(&self, _invocation: &ToolInvocation) {}

    /// Called when an invocation has resolved.
    fn on_tool_result(&self, _result: &ToolResult) {}

    /// Called once when the loop finishes without error.
    fn on_complete(&self, _outcome: &OrchestrationOutcome) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl OrchestrationProgress for NoProgress {
    fn on_iteration_start(&self, _iteration: usize, _max_iterations: usize) {}
}
