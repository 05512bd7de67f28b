//! Orchestration outcome - what one call to the loop hands back.
//!
//! The serialized shape is what API callers see:
//!
//! ```json
//! {
//!   "response": "...",
//!   "tool_calls": [...],
//!   "tool_results": [...],
//!   "metadata": { "iterations": 2, "cache_hits": 0, "cache_misses": 1, ... }
//! }
//! ```

use super::state::Termination;
use crate::cache::CacheStats;
use crate::tool::entities::ToolInvocation;
use crate::tool::value_objects::ToolResult;
use serde::{Deserialize, Serialize};

/// Counters and context gathered during one orchestration call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationMetadata {
    /// Number of adapter calls made.
    pub iterations: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    /// Size of the tool catalog the model was offered.
    pub tools_available: usize,
    /// Name of the model adapter that served the call.
    pub provider: String,
    /// Provider finish reason of the last adapter response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    pub max_reached: bool,
    pub cache_stats: CacheStats,
}

/// Final answer plus the full invocation/result trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationOutcome {
    #[serde(rename = "response")]
    pub final_text: String,
    /// Every invocation across all iterations, in request order.
    #[serde(rename = "tool_calls")]
    pub invocations: Vec<ToolInvocation>,
    /// One result per invocation, same order as `invocations`.
    #[serde(rename = "tool_results")]
    pub results: Vec<ToolResult>,
    #[serde(skip, default = "default_termination")]
    pub termination: Termination,
    pub metadata: OrchestrationMetadata,
}

fn default_termination() -> Termination {
    Termination::Done
}

impl OrchestrationOutcome {
    pub fn is_limit_reached(&self) -> bool {
        self.termination == Termination::IterationLimitReached
    }

    pub fn error_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.results.iter().filter(|r| r.is_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OrchestrationOutcome {
        OrchestrationOutcome {
            final_text: "No blueprints found".to_string(),
            invocations: vec![ToolInvocation::new("call_1", "list_blueprints")],
            results: vec![ToolResult::success("call_1", "list_blueprints", "[]")],
            termination: Termination::Done,
            metadata: OrchestrationMetadata {
                iterations: 2,
                cache_misses: 1,
                tools_available: 1,
                provider: "openai".to_string(),
                finish_reason: Some("end_turn".to_string()),
                cache_stats: CacheStats { total_entries: 1 },
                ..Default::default()
            },
        }
    }

    #[test]
    fn serializes_to_api_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["response"], "No blueprints found");
        assert_eq!(json["tool_calls"][0]["name"], "list_blueprints");
        assert_eq!(json["tool_results"][0]["tool_call_id"], "call_1");
        assert_eq!(json["tool_results"][0]["content"], "[]");
        assert_eq!(json["metadata"]["iterations"], 2);
        assert_eq!(json["metadata"]["cache_hits"], 0);
        assert_eq!(json["metadata"]["cache_misses"], 1);
        assert_eq!(json["metadata"]["max_reached"], false);
        assert_eq!(json["metadata"]["cache_stats"]["total_entries"], 1);
        assert!(json.get("termination").is_none());
    }

    #[test]
    fn error_results_filters() {
        let mut outcome = sample();
        outcome.results.push(ToolResult::failure(
            "call_2",
            "create_resource",
            "Error calling tool create_resource: transport closed",
        ));
        assert_eq!(outcome.error_results().count(), 1);
        assert!(!outcome.is_limit_reached());
    }
}
