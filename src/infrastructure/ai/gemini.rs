//! Gemini adapter (Generative Language API, key-based)

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::application::ports::outbound::{
    AiError, AiPort, GenerateOptions, GenerateResult, ModelTier,
};
use crate::infrastructure::ai::retry::{retry_with_backoff, RetryPolicy};
use crate::infrastructure::config::AiConfig;

const PROVIDER: &str = "gemini";

/// Gemini adapter with a fast and a creative model
#[derive(Clone)]
pub struct GeminiAdapter {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    fast_model: String,
    creative_model: String,
    retry: RetryPolicy,
}

impl GeminiAdapter {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            api_key: config.gemini_key(),
            fast_model: config.gemini_model.clone(),
            creative_model: config.gemini_creative_model.clone(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn model_for<'a>(&'a self, options: &'a GenerateOptions) -> &'a str {
        if let Some(model) = options.model.as_deref() {
            return model;
        }
        match options.tier {
            ModelTier::Fast => &self.fast_model,
            ModelTier::Creative => &self.creative_model,
        }
    }

    /// Request body: the prompt as a single user turn, structured output
    /// settings and any extras merged into `generationConfig`
    fn build_body(prompt: &str, options: &GenerateOptions) -> Value {
        let mut generation_config = serde_json::Map::new();

        if let Some(schema) = &options.json_schema {
            generation_config.insert("responseMimeType".to_string(), json!("application/json"));
            generation_config.insert(
                "responseSchema".to_string(),
                schema.render_with(&|kind| kind.json_name().to_uppercase()),
            );
        }
        if let Some(Value::Object(extra)) = &options.extra {
            for (key, value) in extra {
                generation_config.insert(key.clone(), value.clone());
            }
        }

        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        });
        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }
        body
    }

    async fn send(&self, url: &str, api_key: &str, body: &Value) -> Result<GenerateResult, AiError> {
        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", api_key)
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
            return Err(AiError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let json: Value = response.json().await.map_err(|e| AiError::InvalidResponse {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

        Ok(GenerateResult::new(extract_text(&json)))
    }
}

/// Concatenate the text parts of the first candidate, skipping thoughts
pub fn extract_text(response: &Value) -> String {
    response["candidates"]
        .as_array()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate["content"]["parts"].as_array())
        .map(|parts| {
            parts
                .iter()
                .filter(|part| !part["thought"].as_bool().unwrap_or(false))
                .filter_map(|part| part["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Prefer the structured `error.message`, fall back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            let error = &json["error"];
            let message = error["message"].as_str()?;
            Some(match error["status"].as_str() {
                Some(status) => format!("{}: {}", status, message),
                None => message.to_string(),
            })
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl AiPort for GeminiAdapter {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supports_creative_model(&self) -> bool {
        true
    }

    async fn generate_content(
        &self,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<GenerateResult, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey {
            provider: PROVIDER,
            env_hint: "API_KEY or GEMINI_API_KEY",
        })?;

        let model = self.model_for(&options);
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = Self::build_body(prompt, &options);

        tracing::debug!(model, structured = options.json_schema.is_some(), "Gemini request");
        retry_with_backoff(&self.retry, PROVIDER, || self.send(&url, api_key, &body)).await
    }
}
