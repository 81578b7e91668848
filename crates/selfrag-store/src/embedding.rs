//! Embedding Model for Text Vectorization
//!
//! Provides a deterministic, dependency-free embedder so the store works
//! offline and in tests. Real models are plugged in through the
//! [`Embedder`] trait (see `selfrag-llm`).
//!
//! # Examples
//!
//! ```rust
//! use selfrag_store::embedding::HashingEmbedder;
//! use selfrag_domain::traits::Embedder;
//!
//! let model = HashingEmbedder::new(256);
//! let embedding = model.embed("The sky is blue").unwrap();
//! assert_eq!(embedding.len(), 256);
//!
//! // Same text always produces same embedding
//! assert_eq!(embedding, model.embed("The sky is blue").unwrap());
//! ```

use selfrag_domain::traits::Embedder;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Default dimension for [`HashingEmbedder`]
pub const DEFAULT_DIMENSION: usize = 384;

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Invalid input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Token-hashing embedder
///
/// Each lowercase word is hashed into one of `dimension` buckets and the
/// bucket counts are L2-normalized, so texts sharing vocabulary have a
/// positive cosine similarity. This is lexical overlap, not semantics.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Create a new hashing embedder
    ///
    /// `dimension` is clamped to `[8, 4096]`.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.clamp(8, 4096),
        }
    }

    fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .map(|token| token.to_lowercase())
    }

    /// Bucket of a token
    ///
    /// Embeddings are persisted, so the hash must be stable across builds.
    fn bucket(&self, token: &str) -> usize {
        (token_hash(token) % self.dimension as u64) as usize
    }
}

/// Seedless xxh3 of a token's UTF-8 bytes
fn token_hash(token: &str) -> u64 {
    xxh3_64(token.as_bytes())
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl Embedder for HashingEmbedder {
    type Error = EmbeddingError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        let mut embedding = vec![0.0f32; self.dimension];
        let mut seen = 0usize;

        for token in Self::tokens(text) {
            embedding[self.bucket(&token)] += 1.0;
            seen += 1;
        }

        if seen == 0 {
            return Err(EmbeddingError::InvalidInput(
                "Text contains no words to embed".to_string(),
            ));
        }

        // Normalize to unit length for cosine similarity
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        for value in &mut embedding {
            *value /= magnitude;
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Calculate cosine similarity between two embedding vectors
///
/// Returns a value in [-1, 1]; zero-length or mismatched vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}
