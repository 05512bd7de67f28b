//! Model backend adapters
//!
//! Each backend implements [`ModelAdapter`] over its REST API. The binary
//! picks one at startup from `provider.default` and wraps it in
//! [`ModelBackend`].

pub mod anthropic;
pub mod gemini;
pub mod glean;
mod http;
pub mod openai;

use async_trait::async_trait;
use cloudgenie_application::{AdapterError, ModelAdapter};
use cloudgenie_domain::{AdapterResponse, ConversationTurn, ToolCatalog};
use std::fmt;
use std::str::FromStr;

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use glean::GleanAdapter;
pub use openai::OpenAiAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Anthropic,
    Gemini,
    Glean,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Glean => "glean",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "glean" => Ok(ProviderKind::Glean),
            other => Err(AdapterError::Configuration(format!(
                "unknown provider '{}' (expected openai, anthropic, gemini or glean)",
                other
            ))),
        }
    }
}

/// Resolved credentials and endpoint for one backend.
#[derive(Clone, Default)]
pub struct AdapterSettings {
    pub api_key: String,
    pub model: String,
    /// Overrides the backend's public API root.
    pub base_url: Option<String>,
}

impl fmt::Debug for AdapterSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AdapterSettings {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn require_key(&self, provider: ProviderKind) -> Result<(), AdapterError> {
        if self.api_key.trim().is_empty() {
            return Err(AdapterError::Configuration(format!(
                "{} API key is required",
                provider
            )));
        }
        Ok(())
    }

    fn endpoint_root<'a>(&'a self, default: &'a str) -> &'a str {
        self.base_url
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
    }
}

/// The configured model backend.
pub enum ModelBackend {
    OpenAi(OpenAiAdapter),
    Anthropic(AnthropicAdapter),
    Gemini(GeminiAdapter),
    Glean(GleanAdapter),
}

impl ModelBackend {
    pub fn new(kind: ProviderKind, settings: AdapterSettings) -> Result<Self, AdapterError> {
        Ok(match kind {
            ProviderKind::OpenAi => ModelBackend::OpenAi(OpenAiAdapter::new(settings)?),
            ProviderKind::Anthropic => ModelBackend::Anthropic(AnthropicAdapter::new(settings)?),
            ProviderKind::Gemini => ModelBackend::Gemini(GeminiAdapter::new(settings)?),
            ProviderKind::Glean => ModelBackend::Glean(GleanAdapter::new(settings)?),
        })
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            ModelBackend::OpenAi(_) => ProviderKind::OpenAi,
            ModelBackend::Anthropic(_) => ProviderKind::Anthropic,
            ModelBackend::Gemini(_) => ProviderKind::Gemini,
            ModelBackend::Glean(_) => ProviderKind::Glean,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ModelBackend::OpenAi(a) => a.model(),
            ModelBackend::Anthropic(a) => a.model(),
            ModelBackend::Gemini(a) => a.model(),
            ModelBackend::Glean(a) => a.model(),
        }
    }
}

#[async_trait]
impl ModelAdapter for ModelBackend {
    async fn chat(
        &self,
        prompt: &str,
        tools: &ToolCatalog,
        history: &[ConversationTurn],
    ) -> Result<AdapterResponse, AdapterError> {
        match self {
            ModelBackend::OpenAi(a) => a.chat(prompt, tools, history).await,
            ModelBackend::Anthropic(a) => a.chat(prompt, tools, history).await,
            ModelBackend::Gemini(a) => a.chat(prompt, tools, history).await,
            ModelBackend::Glean(a) => a.chat(prompt, tools, history).await,
        }
    }

    fn name(&self) -> &str {
        self.kind().as_str()
    }
}
