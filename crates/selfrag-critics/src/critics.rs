//! Core ReflectionCritics implementation

use crate::config::CriticsConfig;
use crate::parser::{self, ParseError};
use crate::prompt;
use selfrag_domain::traits::LlmProvider;
use selfrag_domain::{
    Document, RelevanceJudgment, RetrievalDecision, SupportLevel, SupportVerdict,
};
use std::fmt::{self, Display};
use tracing::{debug, warn};

/// Why a critic fell back to its conservative default
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriticFailure {
    /// The generation port returned an error
    Call(String),
    /// The response did not follow the label format
    Parse(ParseError),
}

impl Display for CriticFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriticFailure::Call(e) => write!(f, "generation failed: {}", e),
            CriticFailure::Parse(e) => write!(f, "unparseable response: {}", e),
        }
    }
}

/// The three reflection stages, built on a single generation provider
///
/// No operation ever fails: a call or parse failure yields the stage's
/// fallback judgment, biased toward retrieving, including, and "not
/// supported" respectively.
pub struct ReflectionCritics<L> {
    llm: L,
    config: CriticsConfig,
}

impl<L> ReflectionCritics<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create critics with the default configuration
    pub fn new(llm: L) -> Self {
        Self::with_config(llm, CriticsConfig::default())
    }

    /// Create critics with an explicit configuration
    pub fn with_config(llm: L, config: CriticsConfig) -> Self {
        Self { llm, config }
    }

    /// The underlying generation provider
    pub fn llm(&self) -> &L {
        &self.llm
    }

    /// The active configuration
    pub fn config(&self) -> &CriticsConfig {
        &self.config
    }

    /// Call the provider once and parse the reply, or apply `fallback`
    fn judge<T>(
        &self,
        stage: &'static str,
        prompt: &str,
        parse: impl FnOnce(&str) -> Result<T, ParseError>,
        fallback: impl FnOnce(&CriticFailure) -> T,
    ) -> T {
        let failure = match self.llm.generate(prompt) {
            Ok(response) => match parse(&response) {
                Ok(judgment) => return judgment,
                Err(e) => CriticFailure::Parse(e),
            },
            Err(e) => CriticFailure::Call(e.to_string()),
        };

        warn!(stage, %failure, "Critic fell back to default judgment");
        fallback(&failure)
    }

    /// Decide whether `query` needs external retrieval
    ///
    /// Retrieval is skipped only when the model says NO with confidence at
    /// or above `confidence_threshold`; a NO with low confidence still
    /// retrieves. Failures yield `should_retrieve = true, confidence = 0.0`.
    pub fn decide_retrieval(&self, query: &str, confidence_threshold: f64) -> RetrievalDecision {
        let decision = self.judge(
            "retrieval_decision",
            &prompt::retrieval_decision(query),
            |response| {
                parser::parse_retrieval_decision(response).map(|fields| RetrievalDecision {
                    should_retrieve: fields.retrieve || fields.confidence < confidence_threshold,
                    confidence: fields.confidence,
                    reasoning: fields.reasoning,
                })
            },
            |failure| RetrievalDecision {
                should_retrieve: true,
                confidence: 0.0,
                reasoning: format!("Error in retrieval decision: {}", failure),
            },
        );

        debug!(
            should_retrieve = decision.should_retrieve,
            confidence = decision.confidence,
            "Retrieval decision"
        );
        decision
    }

    /// Grade each document independently and keep those scoring at least `threshold`
    ///
    /// The result is sorted by score, descending; equal scores keep their
    /// input order. A document whose grading fails is kept with
    /// `score = threshold` rather than silently dropped. `threshold` is
    /// clamped to `[1, 5]`.
    pub fn grade_relevance(
        &self,
        query: &str,
        documents: impl IntoIterator<Item = Document>,
        threshold: u8,
    ) -> Vec<RelevanceJudgment> {
        let threshold = threshold.clamp(1, 5);
        let mut relevant = Vec::new();

        for document in documents {
            let prompt = prompt::relevance_grade(
                query,
                &document.content,
                self.config.document_preview_chars,
            );
            let (score, reasoning) = self.judge(
                "relevance_grading",
                &prompt,
                |response| parser::parse_relevance(response).map(|f| (f.score, f.reasoning)),
                |failure| (threshold, format!("Error grading: {}", failure)),
            );

            debug!(document = ?document.id, score, "Graded document");
            if score >= threshold {
                relevant.push(RelevanceJudgment {
                    document,
                    score,
                    reasoning,
                });
            }
        }

        // Stable: ties keep encounter order
        relevant.sort_by(|a, b| b.score.cmp(&a.score));
        relevant
    }

    /// Verify that `answer` is supported by `context`
    ///
    /// Failures yield an `ERROR` verdict with confidence 0.0, which is never
    /// supported.
    pub fn check_support(&self, query: &str, answer: &str, context: &str) -> SupportVerdict {
        let prompt =
            prompt::support_check(query, answer, context, self.config.context_preview_chars);
        let verdict = self.judge(
            "support_check",
            &prompt,
            parser::parse_support,
            |failure| SupportVerdict {
                level: SupportLevel::Error,
                confidence: 0.0,
                unsupported_claims: format!("Error: {}", failure),
                reasoning: "Support check failed".to_string(),
            },
        );

        debug!(
            level = %verdict.level,
            confidence = verdict.confidence,
            supported = verdict.is_supported(),
            "Support verdict"
        );
        verdict
    }
}
