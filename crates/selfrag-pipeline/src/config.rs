//! Configuration for the AdaptivePipeline

use serde::{Deserialize, Serialize};

/// Thresholds and budgets that drive the pipeline's branching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum confidence in a NO decision before retrieval is skipped
    pub retrieval_confidence_threshold: f64,

    /// Minimum relevance score (1-5) a document needs to be used
    pub relevance_threshold: u8,

    /// Number of documents requested from the knowledge store
    pub top_k: usize,

    /// Character budget for assembled context
    pub max_context_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retrieval_confidence_threshold: 0.7,
            relevance_threshold: 3,
            top_k: 5,
            max_context_length: 3000,
        }
    }
}

impl PipelineConfig {
    /// Strict preset: rarely skips retrieval, only uses highly relevant documents
    pub fn strict() -> Self {
        Self {
            retrieval_confidence_threshold: 0.9,
            relevance_threshold: 4,
            top_k: 5,
            max_context_length: 3000,
        }
    }

    /// Lenient preset: trusts the model more, keeps tangential documents
    pub fn lenient() -> Self {
        Self {
            retrieval_confidence_threshold: 0.5,
            relevance_threshold: 2,
            top_k: 8,
            max_context_length: 6000,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let threshold = self.retrieval_confidence_threshold;
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(format!(
                "retrieval_confidence_threshold must be in (0, 1), got {}",
                threshold
            ));
        }
        if !(1..=5).contains(&self.relevance_threshold) {
            return Err(format!(
                "relevance_threshold must be in [1, 5], got {}",
                self.relevance_threshold
            ));
        }
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.max_context_length == 0 {
            return Err("max_context_length must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
        assert!(PipelineConfig::strict().validate().is_ok());
        assert!(PipelineConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut config = PipelineConfig::default();
        config.retrieval_confidence_threshold = 1.0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.retrieval_confidence_threshold = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.relevance_threshold = 6;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.top_k = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.max_context_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PipelineConfig::from_toml("top_k = 10").unwrap();
        assert_eq!(config.top_k, 10);
        assert_eq!(config.relevance_threshold, 3);
        assert_eq!(config.max_context_length, 3000);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::strict();
        let parsed = PipelineConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
