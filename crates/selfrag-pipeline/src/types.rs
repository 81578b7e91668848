//! Result types returned by the pipeline

use selfrag_domain::{DocumentId, RelevanceJudgment, RetrievalDecision, SupportVerdict};
use serde::Serialize;

/// Full outcome of one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// The question as asked
    pub question: String,

    /// Final answer text, possibly carrying an unsupported-claims warning
    pub answer: Option<String>,

    /// Every judgment made while answering
    pub reflection_trace: ReflectionTrace,

    /// Counts and lengths for diagnostics
    pub debug: DebugInfo,
}

impl QueryResult {
    pub(crate) fn new(question: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: None,
            reflection_trace: ReflectionTrace::default(),
            debug: DebugInfo::default(),
        }
    }
}

/// Audit record of why an answer was or wasn't produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReflectionTrace {
    /// Retrieval decision, absent when retrieval was forced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_decision: Option<DecisionTrace>,

    /// Whether the knowledge store was consulted
    pub retrieval_used: bool,

    /// Relevance grading summary, present once documents were graded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_grading: Option<RelevanceTrace>,

    /// Number of documents that passed relevance grading
    pub relevant_docs_found: usize,

    /// Support verdict for a grounded answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_check: Option<SupportTrace>,

    /// Explanation for paths that skip verification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Port failures absorbed while answering
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Serializable view of a [`RetrievalDecision`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionTrace {
    /// Whether retrieval was requested
    pub should_retrieve: bool,
    /// Confidence in [0.0, 1.0]
    pub confidence: f64,
    /// Model reasoning
    pub reasoning: String,
}

impl From<&RetrievalDecision> for DecisionTrace {
    fn from(decision: &RetrievalDecision) -> Self {
        Self {
            should_retrieve: decision.should_retrieve,
            confidence: decision.confidence,
            reasoning: decision.reasoning.clone(),
        }
    }
}

/// Summary of the relevance grading stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevanceTrace {
    /// Documents returned by the store
    pub total_retrieved: usize,
    /// Documents kept after grading
    pub relevant_count: usize,
    /// Kept documents in ranked order
    pub scores: Vec<ScoredDocument>,
}

/// One kept document with its grade
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    /// Store-assigned identifier, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Relevance score in [1, 5]
    pub score: u8,
    /// Model reasoning
    pub reasoning: String,
}

impl From<&RelevanceJudgment> for ScoredDocument {
    fn from(judgment: &RelevanceJudgment) -> Self {
        Self {
            id: judgment.document.id.as_ref().map(|id| id.to_string()),
            score: judgment.score,
            reasoning: judgment.reasoning.clone(),
        }
    }
}

/// Serializable view of a [`SupportVerdict`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportTrace {
    /// Support level label
    pub level: String,
    /// Confidence in [0.0, 1.0]
    pub confidence: f64,
    /// Claims flagged as unsupported
    pub unsupported_claims: String,
    /// Model reasoning
    pub reasoning: String,
    /// Derived support flag
    pub is_supported: bool,
}

impl From<&SupportVerdict> for SupportTrace {
    fn from(verdict: &SupportVerdict) -> Self {
        Self {
            level: verdict.level.to_string(),
            confidence: verdict.confidence,
            unsupported_claims: verdict.unsupported_claims.clone(),
            reasoning: verdict.reasoning.clone(),
            is_supported: verdict.is_supported(),
        }
    }
}

/// Diagnostics for a query
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DebugInfo {
    /// Documents returned by the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieved_count: Option<usize>,

    /// Length of the assembled context in characters, separators included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_length: Option<usize>,
}

/// Result of [`AdaptivePipeline::add_documents`](crate::AdaptivePipeline::add_documents)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestOutcome {
    /// Whether the store accepted the batch
    pub success: bool,

    /// Identifiers assigned to the documents, in input order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,

    /// Documents in the store after ingestion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,

    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IngestOutcome {
    /// A successful ingestion
    pub fn success(ids: &[DocumentId], total_count: usize) -> Self {
        Self {
            success: true,
            ids: Some(ids.iter().map(|id| id.to_string()).collect()),
            total_count: Some(total_count),
            error: None,
        }
    }

    /// A failed ingestion
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            ids: None,
            total_count: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selfrag_domain::SupportLevel;

    #[test]
    fn test_minimal_trace_serialization() {
        let mut result = QueryResult::new("What is 2+2?");
        result.answer = Some("4".to_string());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["question"], "What is 2+2?");
        assert_eq!(json["reflection_trace"]["retrieval_used"], false);
        assert!(json["reflection_trace"].get("support_check").is_none());
        assert!(json["reflection_trace"].get("errors").is_none());
    }

    #[test]
    fn test_support_trace_carries_derived_flag() {
        let verdict = SupportVerdict {
            level: SupportLevel::FullySupported,
            confidence: 0.65,
            unsupported_claims: "None".to_string(),
            reasoning: "close".to_string(),
        };
        let trace = SupportTrace::from(&verdict);
        assert_eq!(trace.level, "FULLY_SUPPORTED");
        assert!(!trace.is_supported);
    }

    #[test]
    fn test_ingest_outcome_shapes() {
        let ok = IngestOutcome::success(&[DocumentId::new("doc_0")], 1);
        assert_eq!(ok.ids, Some(vec!["doc_0".to_string()]));

        let failed = IngestOutcome::failure("disk full");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "disk full");
        assert!(json.get("ids").is_none());
    }
}
