//! Self-RAG Adaptive Pipeline
//!
//! Orchestrates the reflection critics around a knowledge store and a
//! generation provider.
//!
//! # Query Flow
//!
//! ```text
//! question
//!   │
//!   ├─ decide_retrieval ── confident NO ──→ direct answer          (exit 1)
//!   │
//!   ├─ store.search ────── nothing found ─→ apology                (exit 2)
//!   │
//!   ├─ grade_relevance ─── nothing kept ──→ "none relevant"        (exit 3)
//!   │
//!   ├─ assemble context (greedy, truncate-and-stop)
//!   │
//!   └─ generate → check_support ─────────→ answer (+ warning)      (exit 4/5)
//! ```
//!
//! Every exit carries a [`ReflectionTrace`] explaining the path taken.
//!
//! # Example Usage
//!
//! ```
//! use selfrag_domain::Document;
//! use selfrag_llm::MockProvider;
//! use selfrag_pipeline::{AdaptivePipeline, PipelineConfig};
//! use selfrag_store::{HashingEmbedder, InMemoryStore};
//!
//! let llm = MockProvider::new("4")
//!     .with_response("retrieval decision", "DECISION: NO\nCONFIDENCE: 0.95\nREASONING: simple math");
//! let store = InMemoryStore::new(HashingEmbedder::default());
//!
//! let mut pipeline = AdaptivePipeline::new(llm, store, PipelineConfig::default()).unwrap();
//! let outcome = pipeline.add_documents(vec![Document::new("Paris is the capital of France.")]);
//! assert!(outcome.success);
//!
//! let result = pipeline.query("What is 2+2?", false);
//! assert_eq!(result.answer.as_deref(), Some("4"));
//! assert!(!result.reflection_trace.retrieval_used);
//! ```

#![warn(missing_docs)]

mod config;
mod context;
mod error;
mod pipeline;
mod types;

pub use config::PipelineConfig;
pub use context::{AssembledContext, ContextAssembler, CONTEXT_SEPARATOR};
pub use error::PipelineError;
pub use pipeline::{
    AdaptivePipeline, DIRECT_GENERATION_FAILED_ANSWER, GENERATION_FAILED_ANSWER,
    NO_DOCUMENTS_ANSWER, NO_RELEVANT_DOCUMENTS_ANSWER,
};
pub use types::{
    DebugInfo, DecisionTrace, IngestOutcome, QueryResult, ReflectionTrace, RelevanceTrace,
    ScoredDocument, SupportTrace,
};
