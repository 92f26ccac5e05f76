//! AI provider adapters and the startup selector

pub mod gemini;
pub mod openrouter;
pub mod retry;

use std::fmt;
use std::sync::Arc;

use crate::application::ports::outbound::AiPort;
use crate::infrastructure::config::AiConfig;

pub use gemini::GeminiAdapter;
pub use openrouter::OpenRouterAdapter;

/// Supported providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenRouter,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Gemini, ProviderKind::OpenRouter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenRouter => "openrouter",
        }
    }

    /// Case-insensitive lookup
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }

    /// Lookup that falls back to the default provider for unknown names
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!(
                provider = name,
                "Unknown AI provider, falling back to {}",
                Self::default()
            );
            Self::default()
        })
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the adapter named by the configuration
pub fn select_adapter(config: &AiConfig) -> Arc<dyn AiPort> {
    match ProviderKind::resolve(&config.provider) {
        ProviderKind::Gemini => Arc::new(GeminiAdapter::new(config)),
        ProviderKind::OpenRouter => Arc::new(OpenRouterAdapter::new(config)),
    }
}
