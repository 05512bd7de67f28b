//! Tool server configuration from TOML (`[mcp]` section)

use crate::config::validation::{ConfigIssue, ConfigIssueCode};
use crate::mcp::ServerCommand;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// How the MCP server is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum McpTransport {
    /// Spawn `command` and speak newline-delimited JSON-RPC over its stdio.
    #[default]
    Stdio,
    /// POST JSON-RPC messages to `url`.
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMcpConfig {
    /// "stdio" or "http"
    pub transport: String,
    /// Server executable (stdio)
    pub command: Option<String>,
    pub args: Vec<String>,
    /// Extra environment for the server process (stdio)
    pub env: HashMap<String, String>,
    /// Server endpoint (http)
    pub url: Option<String>,
    /// Per tool call timeout
    pub call_timeout_secs: u64,
}

impl Default for FileMcpConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".to_string(),
            command: None,
            args: Vec::new(),
            env: HashMap::new(),
            url: None,
            call_timeout_secs: 30,
        }
    }
}

impl FileMcpConfig {
    /// Parse `transport`, falling back to stdio with an issue on unknown values.
    pub fn parse_transport(&self) -> (McpTransport, Vec<ConfigIssue>) {
        match self.transport.to_ascii_lowercase().as_str() {
            "stdio" => (McpTransport::Stdio, Vec::new()),
            "http" => (McpTransport::Http, Vec::new()),
            other => (
                McpTransport::Stdio,
                vec![ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "mcp.transport".to_string(),
                        value: other.to_string(),
                        valid_values: vec!["stdio".to_string(), "http".to_string()],
                    },
                    format!("mcp.transport: unknown value '{}'", other),
                )],
            ),
        }
    }

    /// Process description for the stdio transport.
    pub fn server_command(&self) -> Option<ServerCommand> {
        let command = self.command.as_deref().filter(|c| !c.trim().is_empty())?;
        let mut server = ServerCommand::new(command).with_args(self.args.iter().cloned());
        server.env = self.env.clone();
        Some(server)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let (transport, mut issues) = self.parse_transport();
        match transport {
            McpTransport::Stdio if self.server_command().is_none() => {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::MissingField {
                        field: "mcp.command".to_string(),
                    },
                    "mcp.command is required for the stdio transport",
                ));
            }
            McpTransport::Http if self.url.as_deref().is_none_or(|u| u.trim().is_empty()) => {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::MissingField {
                        field: "mcp.url".to_string(),
                    },
                    "mcp.url is required for the http transport",
                ));
            }
            _ => {}
        }
        if self.call_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroValue {
                    field: "mcp.call_timeout_secs".to_string(),
                },
                "mcp.call_timeout_secs cannot be 0",
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdio_requires_command() {
        let issues = FileMcpConfig::default().validate();
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            &issues[0].code,
            ConfigIssueCode::MissingField { field } if field == "mcp.command"
        ));
    }

    #[test]
    fn http_requires_url() {
        let config = FileMcpConfig {
            transport: "HTTP".to_string(),
            ..Default::default()
        };
        assert_eq!(config.parse_transport().0, McpTransport::Http);
        let issues = config.validate();
        assert!(matches!(
            &issues[0].code,
            ConfigIssueCode::MissingField { field } if field == "mcp.url"
        ));
    }

    #[test]
    fn unknown_transport_is_error() {
        let config = FileMcpConfig {
            transport: "websocket".to_string(),
            command: Some("server".to_string()),
            ..Default::default()
        };
        let (transport, issues) = config.parse_transport();
        assert_eq!(transport, McpTransport::Stdio);
        assert!(issues[0].is_error());
    }

    #[test]
    fn server_command_carries_args_and_env() {
        let config = FileMcpConfig {
            command: Some("cloudgenie-mcp".to_string()),
            args: vec!["--stdio".to_string()],
            env: HashMap::from([("BACKEND_URL".to_string(), "http://localhost:8080".to_string())]),
            ..Default::default()
        };
        let server = config.server_command().unwrap();
        assert_eq!(server.command, "cloudgenie-mcp");
        assert_eq!(server.args, vec!["--stdio"]);
        assert_eq!(server.env["BACKEND_URL"], "http://localhost:8080");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn blank_command_is_missing() {
        let config = FileMcpConfig {
            command: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.server_command().is_none());
    }
}
