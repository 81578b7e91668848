//! Error types for the CLI application.

use selfrag_llm::LlmError;
use selfrag_pipeline::PipelineError;
use selfrag_store::{EmbeddingError, StoreError};
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generation or embedding provider error
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Local embedder error
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Knowledge store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Pipeline setup error
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
