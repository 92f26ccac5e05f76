//! AI port - the generation contract every provider adapter satisfies

use async_trait::async_trait;
use serde_json::{json, Map, Value};

/// Markers in provider error text that indicate a transient condition
const TRANSIENT_MARKERS: &[&str] = &["429", "503", "quota", "RESOURCE_EXHAUSTED", "overloaded"];

/// Which class of model a call should run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelTier {
    /// Cheaper model for structured or utility calls
    #[default]
    Fast,
    /// Higher quality model for narrative prose
    Creative,
}

/// Primitive kinds a structured-output schema can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Integer,
}

impl SchemaKind {
    /// JSON Schema type name
    pub fn json_name(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Integer => "integer",
        }
    }
}

/// Provider-neutral description of the shape a response should take
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub kind: SchemaKind,
    pub description: Option<String>,
    pub enum_values: Vec<String>,
    /// Ordered object properties
    pub properties: Vec<(String, ResponseSchema)>,
    pub required: Vec<String>,
    pub items: Option<Box<ResponseSchema>>,
}

impl ResponseSchema {
    fn of(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
            enum_values: Vec::new(),
            properties: Vec::new(),
            required: Vec::new(),
            items: None,
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaKind::String)
    }

    pub fn integer() -> Self {
        Self::of(SchemaKind::Integer)
    }

    pub fn object() -> Self {
        Self::of(SchemaKind::Object)
    }

    pub fn array_of(items: ResponseSchema) -> Self {
        let mut schema = Self::of(SchemaKind::Array);
        schema.items = Some(Box::new(items));
        schema
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn property(mut self, name: impl Into<String>, schema: ResponseSchema) -> Self {
        self.properties.push((name.into(), schema));
        self
    }

    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = names.into_iter().map(Into::into).collect();
        self
    }

    /// Render as JSON Schema, mapping each type name through `type_name`.
    ///
    /// Gemini wants upper-case names ("OBJECT"), JSON Schema wants lower-case.
    pub fn render_with(&self, type_name: &dyn Fn(SchemaKind) -> String) -> Value {
        let mut out = Map::new();
        out.insert("type".to_string(), Value::String(type_name(self.kind)));
        if let Some(description) = &self.description {
            out.insert("description".to_string(), json!(description));
        }
        if !self.enum_values.is_empty() {
            out.insert("enum".to_string(), json!(self.enum_values));
        }
        if !self.properties.is_empty() {
            let properties: Map<String, Value> = self
                .properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.render_with(type_name)))
                .collect();
            out.insert("properties".to_string(), Value::Object(properties));
        }
        if !self.required.is_empty() {
            out.insert("required".to_string(), json!(self.required));
        }
        if let Some(items) = &self.items {
            out.insert("items".to_string(), items.render_with(type_name));
        }
        Value::Object(out)
    }

    /// Standard JSON Schema rendering
    pub fn to_json_schema(&self) -> Value {
        self.render_with(&|kind| kind.json_name().to_string())
    }
}

/// Options for a single generation call
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Structured-output hint; adapters honor it natively or via prompt framing
    pub json_schema: Option<ResponseSchema>,
    /// Explicit model identifier, overriding the tier mapping
    pub model: Option<String>,
    pub tier: ModelTier,
    /// Provider-specific generation settings (e.g. a thinking budget)
    pub extra: Option<Value>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structured(schema: ResponseSchema) -> Self {
        Self {
            json_schema: Some(schema),
            ..Self::default()
        }
    }

    pub fn with_tier(mut self, tier: ModelTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = Some(extra);
        self
    }
}

/// Result of a generation call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResult {
    /// Response text, empty when the model returned nothing
    pub text: String,
}

impl GenerateResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Errors an adapter can raise
#[derive(Debug, Clone, thiserror::Error)]
pub enum AiError {
    /// Required credential missing from configuration
    #[error("{provider}: {env_hint} is not set")]
    MissingApiKey {
        provider: &'static str,
        env_hint: &'static str,
    },

    /// Provider answered with a non-success status
    #[error("{provider} {status}: {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The request never produced a response
    #[error("{provider} request failed: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    /// The response envelope could not be read
    #[error("{provider} returned an unreadable response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },
}

impl AiError {
    /// Rate limits, overload and quota exhaustion are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::MissingApiKey { .. } | Self::InvalidResponse { .. } => false,
            Self::Api {
                status, message, ..
            } => matches!(status, 429 | 503) || has_transient_marker(message),
            Self::Transport { message, .. } => has_transient_marker(message),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey { .. })
    }
}

fn has_transient_marker(message: &str) -> bool {
    TRANSIENT_MARKERS.iter().any(|m| message.contains(m))
}

/// Port for AI text generation providers
#[async_trait]
pub trait AiPort: Send + Sync {
    /// Provider name used for selection and logging
    fn name(&self) -> &str;

    /// Whether the provider distinguishes a creative model from a fast one
    fn supports_creative_model(&self) -> bool {
        false
    }

    /// Generate text for a prompt.
    ///
    /// A model declining to answer is returned as empty text, not an error.
    async fn generate_content(
        &self,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<GenerateResult, AiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let rate_limited = AiError::Api {
            provider: "gemini",
            status: 429,
            message: String::new(),
        };
        let overloaded = AiError::Api {
            provider: "gemini",
            status: 500,
            message: "The model is overloaded".to_string(),
        };
        let quota = AiError::Transport {
            provider: "gemini",
            message: "RESOURCE_EXHAUSTED: quota".to_string(),
        };
        let bad_request = AiError::Api {
            provider: "openrouter",
            status: 400,
            message: "invalid model".to_string(),
        };
        let missing_key = AiError::MissingApiKey {
            provider: "openrouter",
            env_hint: "OPENROUTER_API_KEY or API_KEY",
        };

        assert!(rate_limited.is_retryable());
        assert!(overloaded.is_retryable());
        assert!(quota.is_retryable());
        assert!(!bad_request.is_retryable());
        assert!(!missing_key.is_retryable());
        assert!(missing_key.is_configuration());
    }

    #[test]
    fn test_schema_renders_nested_json_schema() {
        let schema = ResponseSchema::object()
            .property(
                "tags",
                ResponseSchema::array_of(ResponseSchema::string()).with_description("labels"),
            )
            .property("count", ResponseSchema::integer())
            .required(["tags"]);

        let rendered = schema.to_json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["properties"]["tags"]["items"]["type"], "string");
        assert_eq!(rendered["properties"]["tags"]["description"], "labels");
        assert_eq!(rendered["required"], json!(["tags"]));

        let upper = schema.render_with(&|k| k.json_name().to_uppercase());
        assert_eq!(upper["properties"]["count"]["type"], "INTEGER");
    }
}
