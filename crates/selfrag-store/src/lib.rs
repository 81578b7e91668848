//! Self-RAG Storage Layer
//!
//! Implements the `KnowledgeStore` trait using SQLite + an HNSW vector index.
//!
//! # Architecture
//!
//! - SQLite for document content, metadata and embeddings (persistence)
//! - HNSW for vector similarity search, rebuilt from SQLite on open
//! - Any [`Embedder`] for text vectorization ([`HashingEmbedder`] offline)
//! - [`InMemoryStore`]: brute-force, fully deterministic store for tests
//!
//! # Examples
//!
//! ```no_run
//! use selfrag_domain::traits::KnowledgeStore;
//! use selfrag_domain::Document;
//! use selfrag_store::{HashingEmbedder, SqliteStore};
//!
//! let mut store = SqliteStore::new(":memory:", HashingEmbedder::default()).unwrap();
//! let ids = store.ingest(vec![Document::new("Rust has no garbage collector")]).unwrap();
//! assert_eq!(ids[0].as_str(), "doc_0");
//! ```

#![warn(missing_docs)]

pub mod embedding;
pub mod memory;
pub mod vector_index;

use rusqlite::{params, Connection, OptionalExtension};
use selfrag_domain::traits::{Embedder, KnowledgeStore};
use selfrag_domain::{Document, DocumentId, Metadata, MetadataValue, DEFAULT_ID_PREFIX};
use std::fmt::Display;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info};

pub use embedding::{EmbeddingError, HashingEmbedder};
pub use memory::InMemoryStore;
pub use vector_index::{VectorIndex, VectorIndexError};

/// Default HNSW search breadth
pub const DEFAULT_EF_SEARCH: usize = 64;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Document not found
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Embedder failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index error
    #[error("Index error: {0}")]
    Index(#[from] VectorIndexError),
}

/// SQLite-based implementation of `KnowledgeStore`
///
/// Documents, metadata and embeddings persist in SQLite; the HNSW index is
/// rebuilt from the stored embeddings when the store is opened, and the
/// identifier counter resumes after the highest stored sequence number so
/// identifiers are never reused.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store across threads
/// behind a mutex; ingestion already requires `&mut self`.
pub struct SqliteStore<E> {
    conn: Connection,
    embedder: E,
    index: VectorIndex,
    prefix: String,
    next_seq: u64,
    ef_search: usize,
}

impl<E> SqliteStore<E>
where
    E: Embedder,
    E::Error: Display,
{
    /// Open (or create) a store at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P, embedder: E) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;

        let mut store = Self {
            conn,
            index: VectorIndex::new(embedder.dimension()),
            embedder,
            prefix: DEFAULT_ID_PREFIX.to_string(),
            next_seq: 0,
            ef_search: DEFAULT_EF_SEARCH,
        };
        store.rebuild_index()?;
        Ok(store)
    }

    /// Set the HNSW search breadth
    pub fn with_ef_search(mut self, ef_search: usize) -> Self {
        self.ef_search = ef_search.max(1);
        self
    }

    /// Use a different identifier prefix for newly ingested documents
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Reload every stored embedding into a fresh index
    fn rebuild_index(&mut self) -> Result<(), StoreError> {
        self.index.clear();

        let mut stmt = self.conn.prepare("SELECT id, embedding FROM documents ORDER BY seq")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        for (id, raw) in &rows {
            let embedding: Vec<f32> = serde_json::from_str(raw)
                .map_err(|e| StoreError::InvalidData(format!("Bad embedding for {}: {}", id, e)))?;
            self.index.add(DocumentId::new(id.as_str()), &embedding)?;
        }

        let max_seq: Option<i64> =
            self.conn.query_row("SELECT MAX(seq) FROM documents", [], |row| row.get(0))?;
        self.next_seq = max_seq.map(|s| s as u64 + 1).unwrap_or(0);

        if !rows.is_empty() {
            info!(documents = rows.len(), next_seq = self.next_seq, "Rebuilt vector index");
        }
        Ok(())
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        self.embedder
            .embed(text)
            .map_err(|e| StoreError::Embedding(e.to_string()))
    }

    fn load_document(&self, id: &DocumentId) -> Result<Document, StoreError> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT content, metadata FROM documents WHERE id = ?1",
                params![id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (content, metadata) = row.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(Document {
            id: Some(id.clone()),
            content,
            metadata: metadata_from_json(&metadata)?,
        })
    }
}

impl<E> KnowledgeStore for SqliteStore<E>
where
    E: Embedder,
    E::Error: Display,
{
    type Error = StoreError;

    fn ingest(&mut self, documents: Vec<Document>) -> Result<Vec<DocumentId>, Self::Error> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        // Embed everything first so a failure leaves the store untouched
        let mut prepared = Vec::with_capacity(documents.len());
        for (offset, document) in documents.into_iter().enumerate() {
            if document.content.trim().is_empty() {
                return Err(StoreError::InvalidData(format!(
                    "Document at position {} has empty content",
                    offset
                )));
            }
            let embedding = self.embed(&document.content)?;
            if embedding.len() != self.index.dimension() {
                return Err(VectorIndexError::DimensionMismatch {
                    expected: self.index.dimension(),
                    actual: embedding.len(),
                }
                .into());
            }
            let seq = self.next_seq + offset as u64;
            prepared.push((DocumentId::sequential(&self.prefix, seq), seq, document, embedding));
        }

        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let tx = self.conn.transaction()?;
        for (id, seq, document, embedding) in &prepared {
            let embedding_json = serde_json::to_string(embedding)
                .map_err(|e| StoreError::InvalidData(e.to_string()))?;
            tx.execute(
                "INSERT INTO documents (id, seq, content, metadata, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.as_str(),
                    *seq as i64,
                    &document.content,
                    metadata_to_json(&document.metadata),
                    embedding_json,
                    created_at,
                ],
            )?;
        }
        tx.commit()?;

        let mut ids = Vec::with_capacity(prepared.len());
        for (id, _, _, embedding) in prepared {
            self.index.add(id.clone(), &embedding)?;
            ids.push(id);
        }
        self.next_seq += ids.len() as u64;

        debug!(ingested = ids.len(), next_seq = self.next_seq, "Ingested documents");
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
        if k == 0 || self.index.is_empty() {
            return Ok(Vec::new());
        }

        let embedding = self.embed(query)?;
        let hits = self.index.search(&embedding, k, self.ef_search)?;

        hits.into_iter()
            .map(|(id, score)| Ok((self.load_document(&id)?, score)))
            .collect()
    }

    fn delete(&mut self, ids: &[DocumentId]) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        for id in ids {
            tx.execute("DELETE FROM documents WHERE id = ?1", params![id.as_str()])?;
        }
        tx.commit()?;

        for id in ids {
            self.index.remove(id);
        }
        debug!(deleted = ids.len(), "Deleted documents");

        if self.index.needs_compaction() {
            // Identifiers stay monotonic within a session even if the newest row went
            let next_seq = self.next_seq;
            self.rebuild_index()?;
            self.next_seq = self.next_seq.max(next_seq);
            debug!(live = self.index.len(), "Compacted vector index");
        }
        Ok(())
    }

    fn count(&self) -> Result<usize, Self::Error> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Serialize metadata as a JSON object
pub(crate) fn metadata_to_json(metadata: &Metadata) -> String {
    let object: serde_json::Map<String, serde_json::Value> = metadata
        .iter()
        .map(|(key, value)| {
            let json = match value {
                MetadataValue::String(s) => serde_json::Value::from(s.as_str()),
                MetadataValue::Integer(i) => serde_json::Value::from(*i),
                MetadataValue::Float(x) => serde_json::Value::from(*x),
                MetadataValue::Bool(b) => serde_json::Value::from(*b),
            };
            (key.clone(), json)
        })
        .collect();
    serde_json::Value::Object(object).to_string()
}

/// Parse metadata stored by [`metadata_to_json`]
pub(crate) fn metadata_from_json(raw: &str) -> Result<Metadata, StoreError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| StoreError::InvalidData(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| StoreError::InvalidData("Metadata is not a JSON object".to_string()))?;

    object
        .iter()
        .map(|(key, value)| {
            let scalar = match value {
                serde_json::Value::String(s) => MetadataValue::String(s.clone()),
                serde_json::Value::Bool(b) => MetadataValue::Bool(*b),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => MetadataValue::Integer(i),
                    None => MetadataValue::Float(n.as_f64().unwrap_or(0.0)),
                },
                other => {
                    return Err(StoreError::InvalidData(format!(
                        "Metadata '{}' is not a scalar: {}",
                        key, other
                    )))
                }
            };
            Ok((key.clone(), scalar))
        })
        .collect()
}
