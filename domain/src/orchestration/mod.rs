//! Tool orchestration domain
//!
//! The bounded request/act/observe loop: the model is asked, any tools it
//! requests are run, their results are folded back, and the model is asked
//! again, until it stops requesting tools or the iteration ceiling is hit.

pub mod outcome;
pub mod state;

/// Hard ceiling on adapter calls per orchestration call.
pub const MAX_TOOL_ITERATIONS: usize = 5;

/// Final text when the ceiling is hit while the model still wants tools.
pub const ITERATION_LIMIT_MESSAGE: &str =
    "Maximum tool execution iterations reached. Please try breaking down your request.";
