//! Configuration for the reflection critics

use serde::{Deserialize, Serialize};

/// Prompt-size bounds for the critics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticsConfig {
    /// Characters of each document shown to the relevance grader
    pub document_preview_chars: usize,

    /// Characters of assembled context shown to the support checker
    pub context_preview_chars: usize,
}

impl Default for CriticsConfig {
    fn default() -> Self {
        Self {
            document_preview_chars: 800,
            context_preview_chars: 2000,
        }
    }
}

impl CriticsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.document_preview_chars == 0 {
            return Err("document_preview_chars must be greater than 0".to_string());
        }
        if self.context_preview_chars == 0 {
            return Err("context_preview_chars must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}
