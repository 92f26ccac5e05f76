//! Application configuration

use anyhow::{Context, Result};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OPENROUTER_MODEL: &str = "google/gemini-2.0-flash-001";

/// AI provider settings
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Provider name as configured, lower-cased
    pub provider: String,
    /// Shared key (`API_KEY`)
    pub api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,

    pub gemini_base_url: String,
    /// Model for structured and utility calls
    pub gemini_model: String,
    /// Model for episode prose
    pub gemini_creative_model: String,

    pub openrouter_base_url: String,
    /// Forces one model for every OpenRouter call when set
    pub openrouter_model: Option<String>,
    pub openrouter_referer: Option<String>,
}

impl AiConfig {
    /// `API_KEY`, then `GEMINI_API_KEY`
    pub fn gemini_key(&self) -> Option<String> {
        self.api_key.clone().or_else(|| self.gemini_api_key.clone())
    }

    /// `OPENROUTER_API_KEY`, then `API_KEY`
    pub fn openrouter_key(&self) -> Option<String> {
        self.openrouter_api_key
            .clone()
            .or_else(|| self.api_key.clone())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            api_key: None,
            gemini_api_key: None,
            openrouter_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_creative_model: DEFAULT_GEMINI_MODEL.to_string(),
            openrouter_base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            openrouter_model: None,
            openrouter_referer: None,
        }
    }
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP server port
    pub server_port: u16,
    /// SQLite connection string
    pub database_url: String,
    /// Upper bound on a single HTTP request, generation included
    pub request_timeout_secs: u64,
    pub ai: AiConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("Failed to read environment configuration")?;
        Self::from_settings(&settings)
    }

    /// Build from an already loaded source; keys are lower-case variable names
    pub fn from_settings(settings: &config::Config) -> Result<Self> {
        let get = |key: &str| -> Option<String> {
            settings
                .get_string(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider = get("ai_provider")
            .or_else(|| get("vite_ai_provider"))
            .unwrap_or_else(|| "gemini".to_string())
            .to_lowercase();

        let ai = AiConfig {
            provider,
            api_key: get("api_key"),
            gemini_api_key: get("gemini_api_key"),
            openrouter_api_key: get("openrouter_api_key"),
            gemini_base_url: get("gemini_base_url")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            gemini_model: get("gemini_model").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_creative_model: get("gemini_creative_model")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            openrouter_base_url: get("openrouter_base_url")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string()),
            openrouter_model: get("openrouter_model"),
            openrouter_referer: get("openrouter_referer"),
        };

        Ok(Self {
            server_port: get("server_port")
                .unwrap_or_else(|| "3001".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            database_url: get("database_url")
                .unwrap_or_else(|| "sqlite://storyverse.db?mode=rwc".to_string()),
            request_timeout_secs: get("request_timeout_secs")
                .unwrap_or_else(|| "120".to_string())
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            ai,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> config::Config {
        let mut builder = config::Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value).unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_settings(&settings(&[])).unwrap();

        assert_eq!(config.server_port, 3001);
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.ai.provider, "gemini");
        assert_eq!(config.ai.gemini_model, "gemini-3-flash-preview");
        assert_eq!(config.ai.gemini_creative_model, "gemini-3-flash-preview");
        assert!(config.ai.gemini_key().is_none());
        assert!(config.ai.openrouter_model.is_none());
    }

    #[test]
    fn test_provider_fallback_and_case() {
        let config =
            AppConfig::from_settings(&settings(&[("vite_ai_provider", "OpenRouter")])).unwrap();
        assert_eq!(config.ai.provider, "openrouter");

        let config = AppConfig::from_settings(&settings(&[
            ("ai_provider", "GEMINI"),
            ("vite_ai_provider", "openrouter"),
        ]))
        .unwrap();
        assert_eq!(config.ai.provider, "gemini");
    }

    #[test]
    fn test_key_precedence() {
        let config = AppConfig::from_settings(&settings(&[
            ("api_key", "shared"),
            ("gemini_api_key", "gemini-only"),
            ("openrouter_api_key", "  router  "),
        ]))
        .unwrap();
        assert_eq!(config.ai.gemini_key().as_deref(), Some("shared"));
        assert_eq!(config.ai.openrouter_key().as_deref(), Some("router"));

        let config = AppConfig::from_settings(&settings(&[
            ("gemini_api_key", "gemini-only"),
            ("openrouter_api_key", "   "),
        ]))
        .unwrap();
        assert_eq!(config.ai.gemini_key().as_deref(), Some("gemini-only"));
        assert!(config.ai.openrouter_key().is_none());
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(AppConfig::from_settings(&settings(&[("server_port", "lots")])).is_err());
    }
}
