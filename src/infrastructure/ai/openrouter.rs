//! OpenRouter adapter (OpenAI-compatible chat completions)

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::application::ports::outbound::{AiError, AiPort, GenerateOptions, GenerateResult};
use crate::infrastructure::ai::retry::{retry_with_backoff, RetryPolicy};
use crate::infrastructure::config::{AiConfig, DEFAULT_OPENROUTER_MODEL};

const PROVIDER: &str = "openrouter";
const APP_TITLE: &str = "StoryVerse";
const STRUCTURED_MAX_TOKENS: u32 = 4096;

/// OpenRouter adapter; one model serves every tier
#[derive(Clone)]
pub struct OpenRouterAdapter {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    /// Overrides per-call model choices when set
    forced_model: Option<String>,
    referer: Option<String>,
    retry: RetryPolicy,
}

impl OpenRouterAdapter {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.openrouter_base_url.trim_end_matches('/').to_string(),
            api_key: config.openrouter_key(),
            forced_model: config.openrouter_model.clone(),
            referer: config.openrouter_referer.clone(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Configured model, then the per-call model, then the default
    fn model_for<'a>(&'a self, options: &'a GenerateOptions) -> &'a str {
        self.forced_model
            .as_deref()
            .or(options.model.as_deref())
            .unwrap_or(DEFAULT_OPENROUTER_MODEL)
    }

    fn build_body(&self, prompt: &str, options: &GenerateOptions) -> Value {
        let content = match &options.json_schema {
            // No native schema support; describe the shape in the prompt
            Some(schema) => format!(
                "{}\n\nRespond with a single JSON object matching this JSON Schema:\n{}",
                prompt,
                schema.to_json_schema()
            ),
            None => prompt.to_string(),
        };

        let mut body = json!({
            "model": self.model_for(options),
            "messages": [{ "role": "user", "content": content }]
        });
        if options.json_schema.is_some() {
            body["response_format"] = json!({ "type": "json_object" });
            body["max_tokens"] = json!(STRUCTURED_MAX_TOKENS);
        }
        body
    }

    async fn send(&self, url: &str, api_key: &str, body: &Value) -> Result<GenerateResult, AiError> {
        let mut request = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .header("content-type", "application/json")
            .header("X-Title", APP_TITLE);
        if let Some(referer) = &self.referer {
            request = request.header("HTTP-Referer", referer);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| AiError::Transport {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = if text.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                text
            };
            return Err(AiError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message,
            });
        }

        let json: Value = response.json().await.map_err(|e| AiError::InvalidResponse {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

        Ok(GenerateResult::new(extract_text(&json)))
    }
}

/// `choices[0].message.content`, then `choices[0].text`
pub fn extract_text(response: &Value) -> String {
    let choice = &response["choices"][0];
    choice["message"]["content"]
        .as_str()
        .or_else(|| choice["text"].as_str())
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[async_trait]
impl AiPort for OpenRouterAdapter {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate_content(
        &self,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<GenerateResult, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey {
            provider: PROVIDER,
            env_hint: "OPENROUTER_API_KEY or API_KEY",
        })?;

        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(prompt, &options);

        tracing::debug!(model = %body["model"], structured = options.json_schema.is_some(), "OpenRouter request");
        retry_with_backoff(&self.retry, PROVIDER, || self.send(&url, api_key, &body)).await
    }
}
