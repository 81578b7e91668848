//! Self-RAG Reflection Critics
//!
//! The three reflection stages of the adaptive pipeline, each built on the
//! generation port:
//!
//! 1. **Retrieval decision**: does this question need external knowledge?
//! 2. **Relevance grading**: which retrieved documents actually help?
//! 3. **Support verification**: is the generated answer grounded in its context?
//!
//! # Architecture
//!
//! ```text
//! inputs → PromptBuilder → LlmProvider → parser → judgment
//!                               │           │
//!                               └─ failure ─┴→ fallback judgment
//! ```
//!
//! Every operation follows the same pattern: render a fixed template, call
//! the provider once, extract labeled fields with tolerant patterns, and
//! substitute a conservative fallback on any call or parse failure. The
//! critics never return an error to their caller.
//!
//! # Example Usage
//!
//! ```
//! use selfrag_critics::ReflectionCritics;
//! use selfrag_llm::MockProvider;
//!
//! let llm = MockProvider::new("DECISION: NO\nCONFIDENCE: 0.95\nREASONING: simple math");
//! let critics = ReflectionCritics::new(llm);
//!
//! let decision = critics.decide_retrieval("What is 2+2?", 0.7);
//! assert!(!decision.should_retrieve);
//! assert_eq!(decision.confidence, 0.95);
//! ```

#![warn(missing_docs)]

mod config;
mod critics;
pub mod parser;
pub mod prompt;

pub use config::CriticsConfig;
pub use critics::{CriticFailure, ReflectionCritics};
pub use parser::ParseError;
