//! Error types for the pipeline

use thiserror::Error;

/// Errors raised while setting up a pipeline
///
/// Nothing that happens during a query is reported through this type: a
/// query always produces a (possibly degraded) result.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid pipeline or critic configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
