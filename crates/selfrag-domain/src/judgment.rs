//! Judgment types produced by the three reflection stages
//!
//! All judgments are ephemeral: they are produced while answering a single
//! question and discarded with the response.

use crate::document::Document;
use std::fmt;
use std::str::FromStr;

/// Confidence an answer must reach to count as supported
pub const SUPPORT_CONFIDENCE_BAR: f64 = 0.7;

/// Outcome of the retrieval-necessity stage
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalDecision {
    /// Whether external retrieval should be performed
    pub should_retrieve: bool,

    /// Model confidence in [0.0, 1.0]
    pub confidence: f64,

    /// Free-text explanation
    pub reasoning: String,
}

impl RetrievalDecision {
    /// True when the decision is confident enough to skip retrieval entirely
    ///
    /// A bare "no retrieval" is not trusted on its own: the confidence must
    /// also reach `threshold`.
    pub fn skips_retrieval(&self, threshold: f64) -> bool {
        !self.should_retrieve && self.confidence >= threshold
    }
}

/// A relevance grade for one retrieved document
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceJudgment {
    /// The graded document
    pub document: Document,

    /// Relevance score in [1, 5]
    pub score: u8,

    /// Free-text explanation
    pub reasoning: String,
}

/// How well an answer is supported by its context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportLevel {
    /// Every claim is backed by the context
    FullySupported,
    /// Some claims are backed by the context
    PartiallySupported,
    /// The answer is not backed by the context
    Unsupported,
    /// Verification could not be performed
    Error,
}

impl SupportLevel {
    /// The label used in model responses and traces
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportLevel::FullySupported => "FULLY_SUPPORTED",
            SupportLevel::PartiallySupported => "PARTIALLY_SUPPORTED",
            SupportLevel::Unsupported => "UNSUPPORTED",
            SupportLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for SupportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupportLevel {
    type Err = String;

    /// Parse a model-emitted label, case-insensitively
    ///
    /// `ERROR` is deliberately not accepted: it is only ever produced locally.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FULLY_SUPPORTED" => Ok(SupportLevel::FullySupported),
            "PARTIALLY_SUPPORTED" => Ok(SupportLevel::PartiallySupported),
            "UNSUPPORTED" => Ok(SupportLevel::Unsupported),
            other => Err(format!("Unknown support level: {}", other)),
        }
    }
}

/// Outcome of the support-verification stage
#[derive(Debug, Clone, PartialEq)]
pub struct SupportVerdict {
    /// Support level
    pub level: SupportLevel,

    /// Model confidence in [0.0, 1.0]
    pub confidence: f64,

    /// Claims the model flagged as unsupported (or "None")
    pub unsupported_claims: String,

    /// Free-text explanation
    pub reasoning: String,
}

impl SupportVerdict {
    /// Whether the answer counts as supported
    ///
    /// Requires both a FULLY_SUPPORTED level and confidence at or above
    /// [`SUPPORT_CONFIDENCE_BAR`].
    pub fn is_supported(&self) -> bool {
        self.level == SupportLevel::FullySupported && self.confidence >= SUPPORT_CONFIDENCE_BAR
    }
}

/// Clamp a parsed confidence into [0.0, 1.0]
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
