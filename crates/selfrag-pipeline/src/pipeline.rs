//! Core AdaptivePipeline implementation

use crate::config::PipelineConfig;
use crate::context::ContextAssembler;
use crate::error::PipelineError;
use crate::types::{
    DecisionTrace, IngestOutcome, QueryResult, RelevanceTrace, ScoredDocument, SupportTrace,
};
use selfrag_critics::{CriticsConfig, ReflectionCritics};
use selfrag_domain::traits::{KnowledgeStore, LlmProvider};
use selfrag_domain::Document;
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Answer returned when the store has nothing for the question
pub const NO_DOCUMENTS_ANSWER: &str = "I apologize, but I couldn't find relevant information in my knowledge base to answer this question.";

/// Answer returned when nothing retrieved passes relevance grading
pub const NO_RELEVANT_DOCUMENTS_ANSWER: &str =
    "I found documents but none were sufficiently relevant to answer your question confidently.";

/// Answer returned when direct generation fails on the no-retrieval path
pub const DIRECT_GENERATION_FAILED_ANSWER: &str = "I was unable to generate an answer.";

/// Answer returned when grounded generation itself fails
pub const GENERATION_FAILED_ANSWER: &str =
    "I found relevant documents but was unable to generate an answer from them.";

const DIRECT_ANSWER_NOTE: &str = "No retrieval performed - answered from parametric knowledge";

/// Self-reflective retrieval-augmented generation over a knowledge store
///
/// Each query passes through up to three reflection stages (retrieval
/// decision, relevance grading, support verification) and exits at the
/// first point where a safe answer is known. Port failures never surface
/// as errors; they degrade the result and are recorded in the trace.
pub struct AdaptivePipeline<L, S> {
    critics: ReflectionCritics<L>,
    store: S,
    config: PipelineConfig,
}

impl<L, S> AdaptivePipeline<L, S>
where
    L: LlmProvider,
    L::Error: Display,
    S: KnowledgeStore,
    S::Error: Display,
{
    /// Wire a pipeline from its two ports
    pub fn new(llm: L, store: S, config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::with_critics_config(llm, store, config, CriticsConfig::default())
    }

    /// Wire a pipeline with explicit critic prompt budgets
    pub fn with_critics_config(
        llm: L,
        store: S,
        config: PipelineConfig,
        critics_config: CriticsConfig,
    ) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        critics_config.validate().map_err(PipelineError::Config)?;

        Ok(Self {
            critics: ReflectionCritics::with_config(llm, critics_config),
            store,
            config,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The reflection critics
    pub fn critics(&self) -> &ReflectionCritics<L> {
        &self.critics
    }

    /// The knowledge store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the knowledge store
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Add documents to the knowledge store
    ///
    /// Failures are reported in the outcome rather than returned as errors.
    pub fn add_documents(&mut self, documents: Vec<Document>) -> IngestOutcome {
        let submitted = documents.len();
        let ids = match self.store.ingest(documents) {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Ingestion of {} documents failed: {}", submitted, e);
                return IngestOutcome::failure(e.to_string());
            }
        };

        match self.store.count() {
            Ok(total) => {
                info!("Ingested {} documents ({} total)", ids.len(), total);
                IngestOutcome::success(&ids, total)
            }
            Err(e) => {
                warn!("Ingested {} documents but count failed: {}", ids.len(), e);
                IngestOutcome::failure(e.to_string())
            }
        }
    }

    /// Answer a question
    ///
    /// With `force_retrieve` the retrieval decision is skipped and the store
    /// is always consulted.
    pub fn query(&self, question: &str, force_retrieve: bool) -> QueryResult {
        let mut result = QueryResult::new(question);
        let threshold = self.config.retrieval_confidence_threshold;

        // Stage 1: retrieval decision
        if !force_retrieve {
            let decision = self.critics.decide_retrieval(question, threshold);
            result.reflection_trace.retrieval_decision = Some(DecisionTrace::from(&decision));

            if decision.skips_retrieval(threshold) {
                info!(
                    confidence = decision.confidence,
                    "Answering directly without retrieval"
                );
                result.reflection_trace.retrieval_used = false;
                result.reflection_trace.note = Some(DIRECT_ANSWER_NOTE.to_string());
                result.answer = Some(match self.critics.llm().generate(question) {
                    Ok(answer) => answer,
                    Err(e) => {
                        warn!("Direct generation failed: {}", e);
                        result.reflection_trace.errors.push(format!("generation: {}", e));
                        DIRECT_GENERATION_FAILED_ANSWER.to_string()
                    }
                });
                return result;
            }
        }

        // Stage 2: retrieval
        result.reflection_trace.retrieval_used = true;
        let retrieved = match self.store.search(question, self.config.top_k) {
            Ok(documents) => documents,
            Err(e) => {
                warn!("Knowledge store search failed: {}", e);
                result.reflection_trace.errors.push(format!("search: {}", e));
                Vec::new()
            }
        };
        let total_retrieved = retrieved.len();
        result.debug.retrieved_count = Some(total_retrieved);
        debug!("Retrieved {} documents", total_retrieved);

        if retrieved.is_empty() {
            result.reflection_trace.relevant_docs_found = 0;
            result.answer = Some(NO_DOCUMENTS_ANSWER.to_string());
            return result;
        }

        // Stage 3: relevance grading
        let relevant =
            self.critics
                .grade_relevance(question, retrieved, self.config.relevance_threshold);
        result.reflection_trace.relevance_grading = Some(RelevanceTrace {
            total_retrieved,
            relevant_count: relevant.len(),
            scores: relevant.iter().map(ScoredDocument::from).collect(),
        });
        info!(
            "{} of {} retrieved documents are relevant",
            relevant.len(),
            total_retrieved
        );

        if relevant.is_empty() {
            result.reflection_trace.relevant_docs_found = 0;
            result.answer = Some(NO_RELEVANT_DOCUMENTS_ANSWER.to_string());
            return result;
        }
        result.reflection_trace.relevant_docs_found = relevant.len();

        // Stage 4: context assembly
        let context = ContextAssembler::new(self.config.max_context_length)
            .assemble(relevant.iter().map(|j| j.document.content.as_str()));
        result.debug.context_length = Some(context.text.chars().count());
        debug!(
            documents_used = context.documents_used,
            truncated = context.truncated,
            "Assembled {} context characters",
            context.content_chars
        );

        // Stage 5: grounded generation and verification
        let answer = match self
            .critics
            .llm()
            .generate(&grounded_prompt(question, &context.text))
        {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Grounded generation failed: {}", e);
                result.reflection_trace.errors.push(format!("generation: {}", e));
                result.answer = Some(GENERATION_FAILED_ANSWER.to_string());
                return result;
            }
        };

        let verdict = self.critics.check_support(question, &answer, &context.text);
        let supported = verdict.is_supported();
        result.reflection_trace.support_check = Some(SupportTrace::from(&verdict));

        result.answer = Some(if supported {
            answer
        } else {
            info!(level = %verdict.level, "Answer flagged as not fully supported");
            format!(
                "{}\n\n⚠️ WARNING: This answer may contain unsupported claims. Confidence: {:.2}",
                answer, verdict.confidence
            )
        });
        result
    }

    /// Answer a question, returning only the answer text
    pub fn query_simple(&self, question: &str) -> String {
        self.query(question, false).answer.unwrap_or_default()
    }
}

/// Build the prompt that restricts generation to the assembled context
fn grounded_prompt(question: &str, context: &str) -> String {
    format!(
        r#"You are a helpful assistant. Answer the question using ONLY the information provided in the context below.

Context:
{context}

Question: {question}

Instructions:
- Answer based only on the context above
- If the context doesn't contain enough information, explicitly state this
- Be concise and factual
- Do not add information not present in the context

Answer:"#
    )
}
