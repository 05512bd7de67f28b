//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for orchestration results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tool trace, final answer and run statistics
    Full,
    /// Only the final answer
    Answer,
    /// JSON output
    Json,
}

/// CLI arguments for cloudgenie
#[derive(Parser, Debug)]
#[command(name = "cloudgenie")]
#[command(author, version, about = "Ask a model to manage CloudGenie infrastructure through MCP tools")]
#[command(long_about = r#"
cloudgenie connects to an MCP tool server, offers its tools to a model, and
runs the model/tool loop until the model answers (at most 5 model calls).
Successful tool results are cached for a few minutes.

Configuration files are loaded from (in priority order):
1. CLOUDGENIE_* environment variables (CLOUDGENIE_MCP__URL=...)
2. --config <path>                      Explicit config file
3. ./cloudgenie.toml                    Project-level config
4. ~/.config/cloudgenie/config.toml     Global config

Example:
  cloudgenie "Which blueprints are available?"
  cloudgenie --list-tools
  cloudgenie -o json "Create a postgres database named orders-db"
"#)]
pub struct Cli {
    /// The request for the model (not required with --list-tools, --health or --show-config)
    pub prompt: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the model provider (openai, anthropic, gemini, glean)
    #[arg(short, long, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// List the tools offered by the MCP server and exit
    #[arg(long)]
    pub list_tools: bool,

    /// Connect, report service health and exit
    #[arg(long)]
    pub health: bool,

    /// Show configuration file locations and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// `tracing` filter directive for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_prompt_and_flags() {
        let cli = Cli::parse_from(["cloudgenie", "-vv", "-o", "json", "list blueprints"]);
        assert_eq!(cli.prompt.as_deref(), Some("list blueprints"));
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.log_filter(), "debug");
        assert!(!cli.list_tools);
    }

    #[test]
    fn mode_flags_without_prompt() {
        let cli = Cli::parse_from(["cloudgenie", "--list-tools", "--config", "cg.toml"]);
        assert!(cli.prompt.is_none());
        assert!(cli.list_tools);
        assert_eq!(cli.config, Some(PathBuf::from("cg.toml")));
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn verbosity_saturates_at_trace() {
        let cli = Cli::parse_from(["cloudgenie", "-vvvvv", "hi"]);
        assert_eq!(cli.log_filter(), "trace");
    }
}
