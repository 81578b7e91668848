//! Integration tests for on-disk persistence
//!
//! These tests verify that reopening a database rebuilds the vector index
//! and resumes identifier assignment where it left off.

use selfrag_domain::traits::KnowledgeStore;
use selfrag_domain::{Document, DocumentId, MetadataValue};
use selfrag_store::{HashingEmbedder, SqliteStore, StoreError};
use tempfile::TempDir;

fn open(dir: &TempDir) -> SqliteStore<HashingEmbedder> {
    SqliteStore::new(dir.path().join("knowledge.db"), HashingEmbedder::new(256)).unwrap()
}

#[test]
fn test_reopen_rebuilds_index() {
    let dir = TempDir::new().unwrap();

    {
        let mut store = open(&dir);
        store
            .ingest(vec![
                Document::new("The Eiffel Tower is in Paris").with_metadata("lang", "en"),
                Document::new("Photosynthesis converts light into chemical energy"),
            ])
            .unwrap();
    }

    let store = open(&dir);
    assert_eq!(store.count().unwrap(), 2);

    let results = store.search("Where is the Eiffel Tower", 1).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, Some(DocumentId::new("doc_0")));
    assert_eq!(results[0].metadata["lang"], MetadataValue::from("en"));
}

#[test]
fn test_reopen_resumes_identifier_counter() {
    let dir = TempDir::new().unwrap();

    {
        let mut store = open(&dir);
        let ids = store
            .ingest(vec![Document::new("a first"), Document::new("b second")])
            .unwrap();
        // Deleting the newest document must not allow its id to be reused
        store.delete(&ids[1..]).unwrap();
    }

    let mut store = open(&dir);
    let ids = store.ingest(vec![Document::new("c third")]).unwrap();
    assert_eq!(ids, vec![DocumentId::new("doc_1")]);
}

#[test]
fn test_scores_are_descending() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    store
        .ingest(vec![
            Document::new("rust ownership borrowing lifetimes"),
            Document::new("rust cargo crates"),
            Document::new("gardening tomatoes in summer"),
        ])
        .unwrap();

    let results = store.search_with_score("rust ownership borrowing", 3).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0.id, Some(DocumentId::new("doc_0")));
    assert!(results.windows(2).all(|w| w[0].1 >= w[1].1));
}

#[test]
fn test_dimension_mismatch_is_reported() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open(&dir);
        store.ingest(vec![Document::new("stored at 256")]).unwrap();
    }

    // Reopening with a different embedder dimension cannot rebuild the index
    let result = SqliteStore::new(dir.path().join("knowledge.db"), HashingEmbedder::new(128));
    assert!(matches!(result, Err(StoreError::Index(_))));
}
