//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the adaptive pipeline and the
//! black-box capabilities it calls. Infrastructure implementations live in
//! other crates.

use crate::{Document, DocumentId};

/// Trait for text generation (the generation port)
///
/// Single-shot, no conversation memory: one prompt in, one text block out.
///
/// Implemented by the infrastructure layer (selfrag-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;
}

impl<T: LlmProvider + ?Sized> LlmProvider for &T {
    type Error = T::Error;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        (**self).generate(prompt)
    }
}

/// Trait for text-to-vector conversion used by knowledge stores
///
/// Implemented by the infrastructure layer (selfrag-llm, selfrag-store)
pub trait Embedder {
    /// Error type for embedding operations
    type Error;

    /// Generate an embedding vector for the given text
    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error>;

    /// Dimension of the vectors produced by [`Embedder::embed`]
    fn dimension(&self) -> usize;
}

/// Trait for storing and searching documents (the knowledge store port)
///
/// Ingestion takes `&mut self`, so identifier assignment is serialized for
/// any single store value. Share a store across threads behind a mutex.
///
/// Implemented by the infrastructure layer (selfrag-store)
pub trait KnowledgeStore {
    /// Error type for store operations
    type Error;

    /// Ingest documents, returning their newly assigned identifiers in order
    fn ingest(&mut self, documents: Vec<Document>) -> Result<Vec<DocumentId>, Self::Error>;

    /// Return up to `k` documents, most similar first
    fn search(&self, query: &str, k: usize) -> Result<Vec<Document>, Self::Error>;

    /// Return up to `k` documents with their similarity scores, most similar first
    fn search_with_score(&self, query: &str, k: usize) -> Result<Vec<(Document, f32)>, Self::Error>;

    /// Delete documents by identifier
    fn delete(&mut self, ids: &[DocumentId]) -> Result<(), Self::Error>;

    /// Number of stored documents
    fn count(&self) -> Result<usize, Self::Error>;
}
