//! HNSW Vector Index for Semantic Search
//!
//! Wraps the HNSW algorithm for nearest-neighbor search over document
//! embeddings.
//!
//! # Architecture
//!
//! - In-memory index, rebuilt from SQLite when a store is opened
//! - HNSW has no removal, so deleted documents are tombstoned and filtered
//!   out of search results
//! - Once tombstones outnumber live entries the owner should rebuild the
//!   index (see [`VectorIndex::needs_compaction`])
//!
//! # HNSW Parameters
//!
//! - **M**: Number of bi-directional links per node (default: 16)
//! - **efConstruction**: Size of dynamic candidate list during construction (default: 200)
//! - **efSearch**: Size of dynamic candidate list during search (caller supplied)

use hnsw_rs::prelude::*;
use selfrag_domain::DocumentId;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

const DEFAULT_M: usize = 16;
const DEFAULT_EF_CONSTRUCTION: usize = 200;
const DEFAULT_MAX_ELEMENTS: usize = 1_000_000;

/// Errors that can occur during vector index operations
#[derive(Error, Debug)]
pub enum VectorIndexError {
    /// Invalid embedding dimension
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        actual: usize,
    },
}

/// A wrapper around HNSW for vector similarity search
///
/// Stores `(DocumentId, embedding)` pairs and answers k-nearest-neighbor
/// queries with cosine similarity.
///
/// # Examples
///
/// ```no_run
/// use selfrag_store::vector_index::VectorIndex;
/// use selfrag_domain::DocumentId;
///
/// let mut index = VectorIndex::new(384);
/// let embedding = vec![0.1; 384];
/// index.add(DocumentId::new("doc_0"), &embedding).unwrap();
///
/// let results = index.search(&embedding, 5, 64).unwrap();
/// ```
pub struct VectorIndex {
    dimension: usize,
    hnsw: Hnsw<'static, f32, DistCosine>,

    /// Mapping from internal HNSW IDs to live documents
    id_map: HashMap<usize, DocumentId>,

    /// Reverse mapping used by removal
    internal_ids: HashMap<DocumentId, usize>,

    /// Internal IDs of removed documents still present in the graph
    tombstones: HashSet<usize>,

    next_id: usize,
}

fn new_hnsw() -> Hnsw<'static, f32, DistCosine> {
    let nb_layer = 16.min((DEFAULT_MAX_ELEMENTS as f32).ln().trunc() as usize);
    Hnsw::<'static, f32, DistCosine>::new(
        DEFAULT_M,
        DEFAULT_MAX_ELEMENTS,
        nb_layer,
        DEFAULT_EF_CONSTRUCTION,
        DistCosine {},
    )
}

impl VectorIndex {
    /// Create a new vector index for `dimension`-sized embeddings
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            hnsw: new_hnsw(),
            id_map: HashMap::new(),
            internal_ids: HashMap::new(),
            tombstones: HashSet::new(),
            next_id: 0,
        }
    }

    /// Embedding dimension accepted by this index
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<(), VectorIndexError> {
        if embedding.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }
        Ok(())
    }

    /// Add a document embedding to the index
    pub fn add(&mut self, id: DocumentId, embedding: &[f32]) -> Result<(), VectorIndexError> {
        self.check_dimension(embedding)?;

        let internal_id = self.next_id;
        self.next_id += 1;

        // hnsw_rs takes owned vector data for the 'static graph
        let embedding_vec = embedding.to_vec();
        self.hnsw.insert((&embedding_vec, internal_id));
        self.id_map.insert(internal_id, id.clone());
        self.internal_ids.insert(id, internal_id);

        Ok(())
    }

    /// Remove a document; returns false if it was not indexed
    pub fn remove(&mut self, id: &DocumentId) -> bool {
        match self.internal_ids.remove(id) {
            Some(internal_id) => {
                self.id_map.remove(&internal_id);
                self.tombstones.insert(internal_id);
                true
            }
            None => false,
        }
    }

    /// Search for the k nearest live neighbors to the given embedding
    ///
    /// Returns `(DocumentId, similarity)` pairs sorted by similarity, descending.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        ef_search: usize,
    ) -> Result<Vec<(DocumentId, f32)>, VectorIndexError> {
        self.check_dimension(query)?;
        if k == 0 || self.id_map.is_empty() {
            return Ok(Vec::new());
        }

        // Over-fetch so tombstoned neighbours cannot starve the result
        let fetch = k + self.tombstones.len();
        let neighbours = self.hnsw.search(query, fetch, ef_search.max(fetch));

        let mut results: Vec<(DocumentId, f32)> = neighbours
            .into_iter()
            .filter_map(|neighbour| {
                self.id_map.get(&neighbour.d_id).map(|id| {
                    // HNSW returns cosine distance; similarity is 1 - distance
                    (id.clone(), 1.0 - neighbour.distance)
                })
            })
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);
        Ok(results)
    }

    /// Get the number of live vectors in the index
    pub fn len(&self) -> usize {
        self.id_map.len()
    }

    /// Number of removed entries still occupying the graph
    pub fn tombstone_count(&self) -> usize {
        self.tombstones.len()
    }

    /// Whether tombstones outnumber live entries
    ///
    /// Searches over-fetch by the tombstone count, so a mostly-dead graph
    /// should be rebuilt from the live embeddings.
    pub fn needs_compaction(&self) -> bool {
        self.tombstones.len() > self.id_map.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all vectors from the index
    pub fn clear(&mut self) {
        self.hnsw = new_hnsw();
        self.id_map.clear();
        self.internal_ids.clear();
        self.tombstones.clear();
        self.next_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> DocumentId {
        DocumentId::sequential("doc_", n)
    }

    #[test]
    fn test_vector_index_creation() {
        let index = VectorIndex::new(384);
        assert_eq!(index.dimension(), 384);
        assert!(index.is_empty());
    }

    #[test]
    fn test_add_and_search() {
        let mut index = VectorIndex::new(384);

        let embedding1: Vec<f32> = (0..384).map(|i| (i as f32) / 384.0).collect();
        index.add(id(1), &embedding1).unwrap();

        let mut embedding2 = embedding1.clone();
        embedding2[0] = 0.5;
        index.add(id(2), &embedding2).unwrap();

        assert_eq!(index.len(), 2);

        let results = index.search(&embedding1, 2, 64).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, id(1));
        assert!(results[0].1 > 0.99);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = VectorIndex::new(384);
        let result = index.add(id(1), &vec![0.1; 128]);
        assert!(matches!(result, Err(VectorIndexError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_removed_documents_never_returned() {
        let mut index = VectorIndex::new(3);
        index.add(id(1), &[1.0, 0.0, 0.0]).unwrap();
        index.add(id(2), &[0.9, 0.1, 0.0]).unwrap();
        index.add(id(3), &[0.0, 1.0, 0.0]).unwrap();

        assert!(index.remove(&id(1)));
        assert!(!index.remove(&id(1)));
        assert_eq!(index.len(), 2);

        let results = index.search(&[1.0, 0.0, 0.0], 2, 64).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(found, _)| *found != id(1)));
        assert_eq!(results[0].0, id(2));
    }

    #[test]
    fn test_needs_compaction_once_tombstones_dominate() {
        let mut index = VectorIndex::new(3);
        index.add(id(1), &[1.0, 0.0, 0.0]).unwrap();
        index.add(id(2), &[0.0, 1.0, 0.0]).unwrap();
        index.add(id(3), &[0.0, 0.0, 1.0]).unwrap();

        index.remove(&id(1));
        assert_eq!(index.tombstone_count(), 1);
        assert!(!index.needs_compaction());

        index.remove(&id(2));
        assert!(index.needs_compaction());

        index.clear();
        assert_eq!(index.tombstone_count(), 0);
        assert!(!index.needs_compaction());
    }

    #[test]
    fn test_clear() {
        let mut index = VectorIndex::new(3);
        index.add(id(1), &[1.0, 0.0, 0.0]).unwrap();
        index.clear();
        assert!(index.is_empty());
        assert!(index.search(&[1.0, 0.0, 0.0], 3, 64).unwrap().is_empty());
    }

    #[test]
    fn test_cosine_ordering() {
        let mut index = VectorIndex::new(3);
        index.add(id(1), &[1.0, 0.0, 0.0]).unwrap();
        index.add(id(2), &[0.0, 1.0, 0.0]).unwrap();
        index.add(id(3), &[0.7071, 0.7071, 0.0]).unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 3, 64).unwrap();

        assert_eq!(results[0].0, id(1));
        assert!(results[0].1 > 0.99);
        assert_eq!(results[1].0, id(3));
        assert!(results[1].1 > 0.5);
        assert_eq!(results[2].0, id(2));
        assert!(results[2].1 < 0.1);
    }
}
