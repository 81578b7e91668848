//! Gemini Provider Implementation
//!
//! Talks to the Google Generative Language API for text generation and
//! embeddings. The API key is read from `GOOGLE_API_KEY`; constructing a
//! provider without it is a configuration error.

use crate::http::{self, DEFAULT_TIMEOUT_SECS};
use crate::LlmError;
use selfrag_domain::traits::{Embedder, LlmProvider as LlmProviderTrait};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "gemini-embedding-001";

/// Dimension of [`DEFAULT_EMBEDDING_MODEL`] vectors
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 3072;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Gemini API provider
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    model: String,
    embedding_model: String,
    embedding_dimension: usize,
    temperature: f32,
    client: reqwest::Client,
    runtime: Runtime,
    max_retries: u32,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Serialize)]
struct EmbedContentRequest {
    content: Content,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

fn text_content(text: &str) -> Content {
    Content {
        parts: vec![Part { text: text.to_string() }],
    }
}

impl GeminiProvider {
    /// Create a provider with an explicit API key
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingCredential(API_KEY_ENV.to_string()));
        }

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: model.into(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            temperature: DEFAULT_TEMPERATURE,
            client: http::build_client(DEFAULT_TIMEOUT_SECS)?,
            runtime: http::build_runtime()?,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a provider reading the key from `GOOGLE_API_KEY`
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingCredential`] when the variable is unset or empty.
    pub fn from_env(model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| LlmError::MissingCredential(API_KEY_ENV.to_string()))?;
        Self::new(api_key, model)
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum number of retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Use a different embedding model producing `dimension`-sized vectors
    pub fn with_embedding_model(mut self, model: impl Into<String>, dimension: usize) -> Self {
        self.embedding_model = model.into();
        self.embedding_dimension = dimension;
        self
    }

    /// Generate text with `generateContent`
    pub async fn generate_async(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest {
            contents: vec![text_content(prompt)],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response: GenerateContentResponse = http::post_json(
            &self.client,
            &url,
            &[("x-goog-api-key", self.api_key.as_str())],
            &body,
            self.max_retries,
            &self.model,
        )
        .await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect())
            .ok_or_else(|| LlmError::InvalidResponse("No candidates in response".to_string()))?;

        Ok(text)
    }

    /// Embed text with `embedContent`
    pub async fn embed_async(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let url = format!("{}/models/{}:embedContent", self.base_url, self.embedding_model);
        let body = EmbedContentRequest {
            content: text_content(text),
        };

        let response: EmbedContentResponse = http::post_json(
            &self.client,
            &url,
            &[("x-goog-api-key", self.api_key.as_str())],
            &body,
            self.max_retries,
            &self.embedding_model,
        )
        .await?;

        Ok(response.embedding.values)
    }
}

impl LlmProviderTrait for GeminiProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.runtime.block_on(self.generate_async(prompt))
    }
}

impl Embedder for GeminiProvider {
    type Error = LlmError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        self.runtime.block_on(self.embed_async(text))
    }

    fn dimension(&self) -> usize {
        self.embedding_dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_configuration_error() {
        let result = GeminiProvider::new("  ", DEFAULT_MODEL);
        assert!(matches!(result, Err(LlmError::MissingCredential(_))));
    }

    #[test]
    fn test_provider_defaults() {
        let provider = GeminiProvider::new("key", DEFAULT_MODEL).unwrap();
        assert_eq!(provider.model, "gemini-1.5-flash");
        assert_eq!(provider.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(provider.dimension(), DEFAULT_EMBEDDING_DIMENSION);
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_request_serialization() {
        let body = GenerateContentRequest {
            contents: vec![text_content("hi")],
            generation_config: GenerationConfig { temperature: 0.5 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn test_response_deserialization() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"world"}],"role":"model"}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let content = response.candidates.into_iter().next().unwrap().content.unwrap();
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn test_unreachable_endpoint() {
        let provider = GeminiProvider::new("key", DEFAULT_MODEL)
            .unwrap()
            .with_base_url("http://127.0.0.1:9")
            .with_max_retries(1);

        assert!(matches!(provider.generate("test"), Err(LlmError::Communication(_))));
    }
}
