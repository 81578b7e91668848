//! Brute-force in-memory knowledge store
//!
//! Scores every stored document against the query with cosine similarity.
//! Ties keep insertion order, so results are fully deterministic. Intended
//! for tests and small throwaway corpora.

use crate::embedding::cosine_similarity;
use crate::StoreError;
use selfrag_domain::traits::{Embedder, KnowledgeStore};
use selfrag_domain::{Document, DocumentId, DEFAULT_ID_PREFIX};
use std::fmt::Display;

struct Entry {
    document: Document,
    embedding: Vec<f32>,
}

/// In-memory implementation of `KnowledgeStore`
pub struct InMemoryStore<E> {
    embedder: E,
    entries: Vec<Entry>,
    next_seq: u64,
}

impl<E> InMemoryStore<E>
where
    E: Embedder,
    E::Error: Display,
{
    /// Create an empty store
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        self.embedder
            .embed(text)
            .map_err(|e| StoreError::Embedding(e.to_string()))
    }
}

impl<E> KnowledgeStore for InMemoryStore<E>
where
    E: Embedder,
    E::Error: Display,
{
    type Error = StoreError;

    fn ingest(&mut self, documents: Vec<Document>) -> Result<Vec<DocumentId>, Self::Error> {
        let mut staged = Vec::with_capacity(documents.len());
        for (offset, document) in documents.into_iter().enumerate() {
            if document.content.trim().is_empty() {
                return Err(StoreError::InvalidData(format!(
                    "Document at position {} has empty content",
                    offset
                )));
            }
            let embedding = self.embed(&document.content)?;
            let id = DocumentId::sequential(DEFAULT_ID_PREFIX, self.next_seq + offset as u64);
            staged.push(Entry {
                document: document.with_id(id),
                embedding,
            });
        }

        self.next_seq += staged.len() as u64;
        let ids = staged
            .iter()
            .filter_map(|entry| entry.document.id.clone())
            .collect();
        self.entries.extend(staged);
        Ok(ids)
    }

    fn search(&self, query: &str, k: usize) -> Result<Vec<Document>, Self::Error> {
        Ok(self
            .search_with_score(query, k)?
            .into_iter()
            .map(|(document, _)| document)
            .collect())
    }

    fn search_with_score(&self, query: &str, k: usize) -> Result<Vec<(Document, f32)>, Self::Error> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embed(query)?;
        let mut scored: Vec<(Document, f32)> = self
            .entries
            .iter()
            .map(|entry| {
                (
                    entry.document.clone(),
                    cosine_similarity(&query_embedding, &entry.embedding),
                )
            })
            .collect();

        // Stable sort: equal scores keep insertion order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    fn delete(&mut self, ids: &[DocumentId]) -> Result<(), Self::Error> {
        self.entries
            .retain(|entry| entry.document.id.as_ref().is_none_or(|id| !ids.contains(id)));
        Ok(())
    }

    fn count(&self) -> Result<usize, Self::Error> {
        Ok(self.entries.len())
    }
}
