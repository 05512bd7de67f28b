//! Orchestration loop configuration from TOML (`[orchestration]` section)

use crate::config::validation::{ConfigIssue, ConfigIssueCode};
use cloudgenie_domain::MAX_TOOL_ITERATIONS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestrationConfig {
    /// Model/tool round trips per prompt
    pub max_iterations: usize,
    /// Lifetime of a cached tool result
    pub cache_ttl_secs: u64,
    /// How often expired cache entries are swept
    pub sweep_interval_secs: u64,
    /// JSONL transcript of every model response and tool call
    pub transcript_path: Option<PathBuf>,
}

impl Default for FileOrchestrationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            cache_ttl_secs: 300,
            sweep_interval_secs: 60,
            transcript_path: None,
        }
    }
}

impl FileOrchestrationConfig {
    /// `max_iterations` capped at the loop ceiling.
    pub fn effective_max_iterations(&self) -> usize {
        self.max_iterations.min(MAX_TOOL_ITERATIONS)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_iterations == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroValue {
                    field: "orchestration.max_iterations".to_string(),
                },
                "orchestration.max_iterations cannot be 0",
            ));
        }
        if self.max_iterations > MAX_TOOL_ITERATIONS {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "orchestration.max_iterations".to_string(),
                    max: MAX_TOOL_ITERATIONS as u64,
                },
                format!(
                    "orchestration.max_iterations {} exceeds {}, using {}",
                    self.max_iterations, MAX_TOOL_ITERATIONS, MAX_TOOL_ITERATIONS
                ),
            ));
        }
        if self.sweep_interval_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroValue {
                    field: "orchestration.sweep_interval_secs".to_string(),
                },
                "orchestration.sweep_interval_secs cannot be 0",
            ));
        }
        if self.cache_ttl_secs == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroValue {
                    field: "orchestration.cache_ttl_secs".to_string(),
                },
                "orchestration.cache_ttl_secs is 0: tool results will never be reused",
            ));
        }
        issues
    }
}
