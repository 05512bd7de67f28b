//! Configuration file loading for cloudgenie
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CLOUDGENIE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./cloudgenie.toml` or `./.cloudgenie.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/cloudgenie/config.toml`
//!    (fallback `~/.config/cloudgenie/config.toml`)
//! 5. Default values

mod file_config;
mod loader;
pub mod validation;

pub use file_config::{
    FileConfig, FileMcpConfig, FileOrchestrationConfig, FileProviderConfig, FileProviderEntry,
    McpTransport,
};
pub use loader::{ConfigError, ConfigLoader, ENV_PREFIX};
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
