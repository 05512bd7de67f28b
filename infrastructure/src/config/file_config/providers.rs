//! Model provider configuration from TOML (`[provider]` section)

use crate::config::validation::{ConfigIssue, ConfigIssueCode};
use crate::providers::{AdapterSettings, ProviderKind, anthropic, gemini, glean, openai};
use serde::{Deserialize, Serialize};

/// Credentials and model for one backend. Unset fields fall back to the
/// backend's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderEntry {
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    /// Override the public API root (proxies, Azure OpenAI, local gateways).
    pub base_url: Option<String>,
    /// Glean instance name; the API root becomes `https://{instance}-be.glean.com/rest/api/v1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Backend used for chat: "openai", "anthropic", "gemini" or "glean".
    pub default: String,
    pub openai: FileProviderEntry,
    pub anthropic: FileProviderEntry,
    pub gemini: FileProviderEntry,
    pub glean: FileProviderEntry,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            default: ProviderKind::default().as_str().to_string(),
            openai: FileProviderEntry::default(),
            anthropic: FileProviderEntry::default(),
            gemini: FileProviderEntry::default(),
            glean: FileProviderEntry::default(),
        }
    }
}

/// Default `(api_key_env, model)` per backend.
fn builtin_defaults(kind: ProviderKind) -> (&'static str, &'static str) {
    match kind {
        ProviderKind::OpenAi => ("OPENAI_API_KEY", openai::DEFAULT_MODEL),
        ProviderKind::Anthropic => ("ANTHROPIC_API_KEY", anthropic::DEFAULT_MODEL),
        ProviderKind::Gemini => ("GEMINI_API_KEY", gemini::DEFAULT_MODEL),
        ProviderKind::Glean => ("GLEAN_API_KEY", glean::DEFAULT_MODEL),
    }
}

impl FileProviderConfig {
    pub fn parse_default(&self) -> (ProviderKind, Vec<ConfigIssue>) {
        match self.default.parse::<ProviderKind>() {
            Ok(kind) => (kind, Vec::new()),
            Err(_) => (
                ProviderKind::default(),
                vec![ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "provider.default".to_string(),
                        value: self.default.clone(),
                        valid_values: ["openai", "anthropic", "gemini", "glean"]
                            .iter()
                            .map(|s| s.to_string())
                            .collect(),
                    },
                    format!("provider.default: unknown provider '{}'", self.default),
                )],
            ),
        }
    }

    pub fn entry(&self, kind: ProviderKind) -> &FileProviderEntry {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::Glean => &self.glean,
        }
    }

    pub fn api_key_env(&self, kind: ProviderKind) -> &str {
        self.entry(kind)
            .api_key_env
            .as_deref()
            .unwrap_or(builtin_defaults(kind).0)
    }

    pub fn model(&self, kind: ProviderKind) -> &str {
        self.entry(kind)
            .model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(builtin_defaults(kind).1)
    }

    /// The inline key, else the value of the backend's key variable looked
    /// up with `env`.
    pub fn resolve_api_key_with(
        &self,
        kind: ProviderKind,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        self.entry(kind)
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env(self.api_key_env(kind)).filter(|k| !k.trim().is_empty()))
    }

    /// Resolve the settings for `kind`, reading the key from the process
    /// environment when not given inline. `None` when no key is available.
    pub fn settings_for(&self, kind: ProviderKind) -> Option<AdapterSettings> {
        self.settings_for_with(kind, |name| std::env::var(name).ok())
    }

    pub fn settings_for_with(
        &self,
        kind: ProviderKind,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<AdapterSettings> {
        let api_key = self.resolve_api_key_with(kind, env)?;
        let mut settings = AdapterSettings::new(api_key, self.model(kind));
        settings.base_url = self.base_url(kind);
        Some(settings)
    }

    /// Explicit `base_url`, else for Glean the root derived from `instance`.
    fn base_url(&self, kind: ProviderKind) -> Option<String> {
        let entry = self.entry(kind);
        let explicit = entry.base_url.clone().filter(|u| !u.trim().is_empty());
        match kind {
            ProviderKind::Glean => explicit.or_else(|| {
                entry
                    .instance
                    .as_deref()
                    .filter(|i| !i.trim().is_empty())
                    .map(glean::instance_base_url)
            }),
            _ => explicit,
        }
    }

    pub(super) fn validate_with(&self, env: impl Fn(&str) -> Option<String>) -> Vec<ConfigIssue> {
        let (kind, mut issues) = self.parse_default();
        if !issues.is_empty() {
            return issues;
        }
        if self.resolve_api_key_with(kind, env).is_none() {
            let env_var = self.api_key_env(kind);
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingApiKey {
                    provider: kind.to_string(),
                    env_var: env_var.to_string(),
                },
                format!(
                    "no API key for provider '{}': set {} or provider.{}.api_key",
                    kind, env_var, kind
                ),
            ));
        }
        if kind == ProviderKind::Glean && self.base_url(kind).is_none() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingField {
                    field: "provider.glean.instance".to_string(),
                },
                "provider.glean.instance is required for the glean provider",
            ));
        }
        issues
    }
}
