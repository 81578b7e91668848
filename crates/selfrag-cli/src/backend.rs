//! Runtime selection of the generation provider and embedder.

use crate::config::{AppConfig, EmbeddingKind, ProviderKind, DEFAULT_MOCK_RESPONSE, DEFAULT_OLLAMA_MODEL};
use crate::error::{CliError, Result};
use selfrag_domain::traits::{Embedder, LlmProvider};
use selfrag_llm::{gemini, ollama, GeminiProvider, LlmError, MockProvider, OllamaProvider};
use selfrag_pipeline::AdaptivePipeline;
use selfrag_store::{HashingEmbedder, SqliteStore};
use tracing::info;

/// The configured generation backend.
pub enum Provider {
    /// Local Ollama server
    Ollama(OllamaProvider),
    /// Google Generative Language API
    Gemini(GeminiProvider),
    /// Fixed-response mock
    Mock(MockProvider),
}

impl LlmProvider for Provider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> std::result::Result<String, LlmError> {
        match self {
            Provider::Ollama(p) => p.generate(prompt),
            Provider::Gemini(p) => p.generate(prompt),
            Provider::Mock(p) => p.generate(prompt),
        }
    }
}

/// The configured embedding backend.
pub enum AnyEmbedder {
    /// Local token hashing
    Hashing(HashingEmbedder),
    /// Ollama embeddings endpoint
    Ollama(OllamaProvider),
    /// Gemini embedContent endpoint
    Gemini(GeminiProvider),
}

impl Embedder for AnyEmbedder {
    type Error = CliError;

    fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, CliError> {
        match self {
            AnyEmbedder::Hashing(e) => Ok(e.embed(text)?),
            AnyEmbedder::Ollama(e) => Ok(e.embed(text)?),
            AnyEmbedder::Gemini(e) => Ok(e.embed(text)?),
        }
    }

    fn dimension(&self) -> usize {
        match self {
            AnyEmbedder::Hashing(e) => e.dimension(),
            AnyEmbedder::Ollama(e) => e.dimension(),
            AnyEmbedder::Gemini(e) => e.dimension(),
        }
    }
}

/// The pipeline as wired by the CLI.
pub type CliPipeline = AdaptivePipeline<Provider, SqliteStore<AnyEmbedder>>;

/// Build the generation provider.
pub fn build_provider(config: &AppConfig) -> Result<Provider> {
    let settings = &config.provider;
    let provider = match settings.kind {
        ProviderKind::Ollama => Provider::Ollama(build_ollama(config)?),
        ProviderKind::Gemini => Provider::Gemini(build_gemini(config)?),
        ProviderKind::Mock => Provider::Mock(MockProvider::new(
            settings
                .mock_response
                .clone()
                .unwrap_or_else(|| DEFAULT_MOCK_RESPONSE.to_string()),
        )),
    };
    Ok(provider)
}

/// Build the embedder.
pub fn build_embedder(config: &AppConfig) -> Result<AnyEmbedder> {
    let dimension = config.store.dimension;
    let embedder = match (config.store.embedding, config.provider.kind) {
        (EmbeddingKind::Hashing, _) => AnyEmbedder::Hashing(HashingEmbedder::new(
            dimension.unwrap_or(selfrag_store::embedding::DEFAULT_DIMENSION),
        )),
        (EmbeddingKind::Provider, ProviderKind::Ollama) => {
            let model = config
                .store
                .embedding_model
                .clone()
                .unwrap_or_else(|| ollama::DEFAULT_EMBEDDING_MODEL.to_string());
            let dimension = dimension.unwrap_or(ollama::DEFAULT_EMBEDDING_DIMENSION);
            AnyEmbedder::Ollama(build_ollama(config)?.with_embedding_model(model, dimension))
        }
        (EmbeddingKind::Provider, ProviderKind::Gemini) => {
            let model = config
                .store
                .embedding_model
                .clone()
                .unwrap_or_else(|| gemini::DEFAULT_EMBEDDING_MODEL.to_string());
            let dimension = dimension.unwrap_or(gemini::DEFAULT_EMBEDDING_DIMENSION);
            AnyEmbedder::Gemini(build_gemini(config)?.with_embedding_model(model, dimension))
        }
        (EmbeddingKind::Provider, ProviderKind::Mock) => {
            return Err(CliError::Config("The mock provider cannot embed".into()));
        }
    };
    Ok(embedder)
}

/// Open the knowledge base and wire the pipeline.
pub fn build_pipeline(config: &AppConfig) -> Result<CliPipeline> {
    let path = config.database_path()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let store = SqliteStore::new(&path, build_embedder(config)?)?
        .with_ef_search(config.store.ef_search);
    info!("Opened knowledge base at {}", path.display());

    let pipeline = AdaptivePipeline::with_critics_config(
        build_provider(config)?,
        store,
        config.pipeline.clone(),
        config.critics.clone(),
    )?;
    Ok(pipeline)
}

fn build_ollama(config: &AppConfig) -> Result<OllamaProvider> {
    let settings = &config.provider;
    let endpoint = settings
        .endpoint
        .clone()
        .unwrap_or_else(|| ollama::DEFAULT_ENDPOINT.to_string());
    let model = settings
        .model
        .clone()
        .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());

    let mut provider = OllamaProvider::new(endpoint, model)?;
    if let Some(retries) = settings.max_retries {
        provider = provider.with_max_retries(retries);
    }
    Ok(provider)
}

fn build_gemini(config: &AppConfig) -> Result<GeminiProvider> {
    let settings = &config.provider;
    let model = settings
        .model
        .clone()
        .unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string());

    let mut provider = GeminiProvider::from_env(model)?;
    if let Some(base_url) = &settings.endpoint {
        provider = provider.with_base_url(base_url.clone());
    }
    if let Some(temperature) = settings.temperature {
        provider = provider.with_temperature(temperature);
    }
    if let Some(retries) = settings.max_retries {
        provider = provider.with_max_retries(retries);
    }
    Ok(provider)
}
