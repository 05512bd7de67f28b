//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to runtime types on demand.

mod mcp;
mod orchestration;
mod providers;

pub use mcp::{FileMcpConfig, McpTransport};
pub use orchestration::FileOrchestrationConfig;
pub use providers::{FileProviderConfig, FileProviderEntry};

use super::validation::ConfigIssue;
use cloudgenie_application::OrchestrationParams;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Tool server connection
    pub mcp: FileMcpConfig,
    /// Model backends
    pub provider: FileProviderConfig,
    /// Loop and cache settings
    pub orchestration: FileOrchestrationConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// API keys named by `api_key_env` are looked up in the process
    /// environment.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        self.validate_with(|name| std::env::var(name).ok())
    }

    pub fn validate_with(&self, env: impl Fn(&str) -> Option<String>) -> Vec<ConfigIssue> {
        let mut issues = self.mcp.validate();
        issues.extend(self.provider.validate_with(env));
        issues.extend(self.orchestration.validate());
        issues
    }

    /// Loop parameters for [`ProcessPromptUseCase`](cloudgenie_application::ProcessPromptUseCase).
    pub fn orchestration_params(&self) -> OrchestrationParams {
        OrchestrationParams::default()
            .with_max_iterations(self.orchestration.effective_max_iterations())
            .with_call_timeout(self.mcp.call_timeout())
    }

    /// Render as TOML with inline API keys masked.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        let mut redacted = self.clone();
        for entry in [
            &mut redacted.provider.openai,
            &mut redacted.provider.anthropic,
            &mut redacted.provider.gemini,
            &mut redacted.provider.glean,
        ] {
            if entry.api_key.is_some() {
                entry.api_key = Some("********".to_string());
            }
        }
        toml::to_string_pretty(&redacted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::ConfigIssueCode;
    use crate::providers::ProviderKind;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[mcp]
transport = "stdio"
command = "cloudgenie-mcp"
args = ["--log-level", "info"]
call_timeout_secs = 45

[mcp.env]
CLOUDGENIE_BACKEND_URL = "http://localhost:8080"

[provider]
default = "gemini"

[provider.gemini]
api_key_env = "GOOGLE_API_KEY"
model = "gemini-1.5-flash"

[orchestration]
max_iterations = 3
cache_ttl_secs = 120
transcript_path = "/tmp/cloudgenie.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.mcp.command.as_deref(), Some("cloudgenie-mcp"));
        assert_eq!(config.mcp.args.len(), 2);
        assert_eq!(
            config.mcp.env["CLOUDGENIE_BACKEND_URL"],
            "http://localhost:8080"
        );
        assert_eq!(config.provider.parse_default().0, ProviderKind::Gemini);
        assert_eq!(config.provider.model(ProviderKind::Gemini), "gemini-1.5-flash");
        assert_eq!(
            config.provider.api_key_env(ProviderKind::Gemini),
            "GOOGLE_API_KEY"
        );
        assert_eq!(config.orchestration.max_iterations, 3);
        assert_eq!(
            config.orchestration.transcript_path.as_deref(),
            Some(std::path::Path::new("/tmp/cloudgenie.jsonl"))
        );

        let params = config.orchestration_params();
        assert_eq!(params.max_iterations, 3);
        assert_eq!(params.call_timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[mcp]
transport = "http"
url = "http://localhost:3001/mcp"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.mcp.parse_transport().0, McpTransport::Http);
        // Defaults should apply
        assert_eq!(config.mcp.call_timeout_secs, 30);
        assert_eq!(config.provider.default, "openai");
        assert_eq!(config.orchestration.cache_ttl_secs, 300);
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.mcp.transport, "stdio");
        assert!(config.mcp.command.is_none());
        assert_eq!(config.orchestration.max_iterations, 5);
        assert!(config.orchestration.transcript_path.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let mut config = FileConfig::default();
        config.mcp.command = Some("cloudgenie-mcp".to_string());
        let issues = config.validate_with(|name| (name == "OPENAI_API_KEY").then(|| "sk".to_string()));
        assert!(issues.is_empty(), "{:?}", issues);
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let mut config = FileConfig::default();
        config.orchestration.max_iterations = 0;
        let codes: Vec<_> = config
            .validate_with(|_| None)
            .into_iter()
            .map(|i| i.code)
            .collect();

        assert_eq!(codes.len(), 3);
        assert!(matches!(&codes[0], ConfigIssueCode::MissingField { .. }));
        assert!(matches!(&codes[1], ConfigIssueCode::MissingApiKey { .. }));
        assert!(matches!(&codes[2], ConfigIssueCode::ZeroValue { .. }));
    }

    #[test]
    fn test_redacted_toml_masks_keys() {
        let mut config = FileConfig::default();
        config.provider.anthropic.api_key = Some("sk-ant-secret".to_string());
        let rendered = config.to_redacted_toml().unwrap();
        assert!(!rendered.contains("sk-ant-secret"));
        assert!(rendered.contains("********"));
        assert!(rendered.contains("[orchestration]"));
    }
}
