//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use selfrag_critics::CriticsConfig;
use selfrag_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default model for the Ollama provider
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

/// Response used by the mock provider when none is configured
pub const DEFAULT_MOCK_RESPONSE: &str = "DECISION: YES\nCONFIDENCE: 0.5\nREASONING: mock provider";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation provider settings
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Knowledge base settings
    #[serde(default)]
    pub store: StoreSettings,

    /// Pipeline thresholds
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Critic prompt budgets
    #[serde(default)]
    pub critics: CriticsConfig,
}

/// Which generation backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server
    #[default]
    Ollama,
    /// Google Generative Language API
    Gemini,
    /// Fixed-response mock, for offline smoke tests
    Mock,
}

/// Generation provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Backend
    #[serde(default)]
    pub kind: ProviderKind,

    /// Generation model (backend default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Ollama endpoint or Gemini base URL (backend default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Sampling temperature (Gemini only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Attempts per request before giving up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Fixed response for the mock backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_response: Option<String>,
}

/// How documents and queries are embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingKind {
    /// Local token-hashing embedder, no network needed
    #[default]
    Hashing,
    /// The configured provider's embedding endpoint
    Provider,
}

/// Knowledge base settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// SQLite database path (`~/.selfrag/knowledge.db` when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Embedding backend
    #[serde(default)]
    pub embedding: EmbeddingKind,

    /// Embedding model for the provider backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,

    /// Vector dimension (backend default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,

    /// HNSW search breadth
    #[serde(default = "default_ef_search")]
    pub ef_search: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: None,
            embedding: EmbeddingKind::Hashing,
            embedding_model: None,
            dimension: None,
            ef_search: default_ef_search(),
        }
    }
}

fn default_ef_search() -> usize {
    selfrag_store::DEFAULT_EF_SEARCH
}

impl AppConfig {
    /// Directory holding the config file and default database.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".selfrag"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from `path`, or the default location.
    ///
    /// A missing file yields the defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::path()?, false),
        };

        if !path.exists() {
            if explicit {
                return Err(CliError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate().map_err(CliError::Config)?;
        self.critics.validate().map_err(CliError::Config)?;
        if self.store.dimension == Some(0) {
            return Err(CliError::Config("store.dimension must be greater than 0".into()));
        }
        if self.store.embedding == EmbeddingKind::Provider && self.provider.kind == ProviderKind::Mock
        {
            return Err(CliError::Config(
                "The mock provider cannot embed; use store.embedding = \"hashing\"".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the database path.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.store.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::home()?.join("knowledge.db")),
        }
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider.kind, ProviderKind::Ollama);
        assert_eq!(config.store.embedding, EmbeddingKind::Hashing);
        assert_eq!(config.pipeline.top_k, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[provider]\nkind = \"gemini\"\nmodel = \"gemini-1.5-pro\"\n\n[pipeline]\nrelevance_threshold = 4"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.provider.kind, ProviderKind::Gemini);
        assert_eq!(config.provider.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(config.pipeline.relevance_threshold, 4);
        assert_eq!(config.pipeline.max_context_length, 3000);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_invalid_pipeline_section_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[pipeline]\nretrieval_confidence_threshold = 1.5").unwrap();
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_mock_provider_cannot_embed() {
        let mut config = AppConfig::default();
        config.provider.kind = ProviderKind::Mock;
        config.store.embedding = EmbeddingKind::Provider;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let parsed: AppConfig = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed.store.ef_search, config.store.ef_search);
        assert_eq!(parsed.pipeline, config.pipeline);
    }
}
