//! Self-RAG Domain Layer
//!
//! This crate contains the core domain model for the adaptive retrieval
//! pipeline. It has ZERO external dependencies and defines the documents,
//! the typed judgments produced by the reflection stages, and the trait
//! interfaces (ports) that every other layer depends upon.
//!
//! ## Key Concepts
//!
//! - **Document**: Content plus opaque scalar metadata; identity is assigned by the store
//! - **RetrievalDecision**: Whether a question needs external knowledge at all
//! - **RelevanceJudgment**: A 1-5 relevance grade for one retrieved document
//! - **SupportVerdict**: Whether a generated answer is grounded in its context
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Pure value types only
//! - Generation, embedding and storage live behind the traits in [`traits`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod judgment;
pub mod traits;

// Re-exports for convenience
pub use document::{truncate_chars, Document, DocumentId, Metadata, MetadataValue, DEFAULT_ID_PREFIX};
pub use judgment::{
    clamp_confidence, RelevanceJudgment, RetrievalDecision, SupportLevel, SupportVerdict,
    SUPPORT_CONFIDENCE_BAR,
};
