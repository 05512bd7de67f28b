//! Loop state machine for one orchestration call.
//!
//! ```text
//! AwaitingModel ──(no invocations)──▶ Done
//!       │
//!       └──(invocations)──▶ AwaitingTools ──(results folded back)──▶ AwaitingModel
//!                                  ...
//! AwaitingModel at iteration > max ──▶ IterationLimitReached
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestrationState {
    /// Waiting for the adapter to answer the current prompt.
    AwaitingModel { iteration: usize },
    /// Waiting for `pending` invocations of this iteration to resolve.
    AwaitingTools { iteration: usize, pending: usize },
    Done { iterations: usize },
    IterationLimitReached { iterations: usize },
}

impl OrchestrationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrchestrationState::Done { .. } | OrchestrationState::IterationLimitReached { .. }
        )
    }

    /// Terminal states map to a [`Termination`]; in-flight states do not.
    pub fn termination(&self) -> Option<Termination> {
        match self {
            OrchestrationState::Done { .. } => Some(Termination::Done),
            OrchestrationState::IterationLimitReached { .. } => {
                Some(Termination::IterationLimitReached)
            }
            _ => None,
        }
    }
}

impl fmt::Display for OrchestrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestrationState::AwaitingModel { iteration } => {
                write!(f, "awaiting model (iteration {})", iteration)
            }
            OrchestrationState::AwaitingTools { iteration, pending } => {
                write!(f, "awaiting {} tool(s) (iteration {})", pending, iteration)
            }
            OrchestrationState::Done { iterations } => {
                write!(f, "done after {} iteration(s)", iterations)
            }
            OrchestrationState::IterationLimitReached { iterations } => {
                write!(f, "iteration limit reached after {}", iterations)
            }
        }
    }
}

/// How an orchestration call ended. Neither variant is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The model answered without requesting tools.
    Done,
    /// The model was still requesting tools when the ceiling was hit.
    IterationLimitReached,
}
