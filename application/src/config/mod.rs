//! Application-level configuration.
//!
//! - [`OrchestrationParams`] — tool loop control (iteration ceiling, per-call timeout)

pub mod orchestration_params;

pub use orchestration_params::OrchestrationParams;
