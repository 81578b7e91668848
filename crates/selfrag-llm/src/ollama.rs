//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API, for both text
//! generation and embeddings.
//!
//! # Features
//!
//! - Async HTTP communication with Ollama API
//! - Configurable endpoint, model and embedding model
//! - Retry logic with exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use selfrag_llm::OllamaProvider;
//! use selfrag_domain::traits::LlmProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3").unwrap();
//! let answer = provider.generate("Why is the sky blue?").unwrap();
//! ```

use crate::http::{self, DEFAULT_TIMEOUT_SECS};
use crate::LlmError;
use selfrag_domain::traits::{Embedder, LlmProvider as LlmProviderTrait};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Dimension of [`DEFAULT_EMBEDDING_MODEL`] vectors
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 768;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    embedding_model: String,
    embedding_dimension: usize,
    client: reqwest::Client,
    runtime: Runtime,
    max_retries: u32,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Request body for Ollama embeddings API
#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response from Ollama embeddings API
#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            client: http::build_client(DEFAULT_TIMEOUT_SECS)?,
            runtime: http::build_runtime()?,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a new Ollama provider on `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
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

    /// Generate text using Ollama API
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running
    /// - Model is not available
    /// - Network communication fails
    /// - Response format is invalid
    pub async fn generate_async(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response: OllamaGenerateResponse =
            http::post_json(&self.client, &url, &[], &body, self.max_retries, &self.model).await?;
        Ok(response.response)
    }

    /// Embed text using Ollama's embeddings API
    pub async fn embed_async(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let url = format!("{}/api/embeddings", self.endpoint);
        let body = OllamaEmbeddingRequest {
            model: &self.embedding_model,
            prompt: text,
        };

        let response: OllamaEmbeddingResponse = http::post_json(
            &self.client,
            &url,
            &[],
            &body,
            self.max_retries,
            &self.embedding_model,
        )
        .await?;

        if response.embedding.is_empty() {
            return Err(LlmError::InvalidResponse("Empty embedding".to_string()));
        }
        Ok(response.embedding)
    }
}

impl LlmProviderTrait for OllamaProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.runtime.block_on(self.generate_async(prompt))
    }
}

impl Embedder for OllamaProvider {
    type Error = LlmError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        self.runtime.block_on(self.embed_async(text))
    }

    fn dimension(&self) -> usize {
        self.embedding_dimension
    }
}
