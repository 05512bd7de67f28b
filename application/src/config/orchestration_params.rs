//! Orchestration parameters — tool loop control.
//!
//! [`OrchestrationParams`] groups the static parameters that control the
//! loop in [`ProcessPromptUseCase`](crate::use_cases::process_prompt::ProcessPromptUseCase).
//! These are application-layer concerns, not domain policy.

use cloudgenie_domain::MAX_TOOL_ITERATIONS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tool loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationParams {
    /// Maximum adapter calls per prompt.
    pub max_iterations: usize,
    /// Upper bound on a single `call_tool`, independent of cancellation.
    pub call_timeout: Duration,
}

impl Default for OrchestrationParams {
    fn default() -> Self {
        Self {
            max_iterations: MAX_TOOL_ITERATIONS,
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl OrchestrationParams {
    // ==================== Builder Methods ====================

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = OrchestrationParams::default();
        assert_eq!(params.max_iterations, 5);
        assert_eq!(params.call_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder() {
        let params = OrchestrationParams::default()
            .with_max_iterations(3)
            .with_call_timeout(Duration::from_millis(500));

        assert_eq!(params.max_iterations, 3);
        assert_eq!(params.call_timeout, Duration::from_millis(500));
    }
}
