//! Parse labeled free-text judgments
//!
//! Model output is not guaranteed to be well-formed, so each field is
//! extracted independently with a tolerant, case-insensitive pattern.
//! Missing optional fields take safe defaults; only a missing key field is
//! a [`ParseError`].

use once_cell::sync::Lazy;
use regex::Regex;
use selfrag_domain::{clamp_confidence, SupportLevel, SupportVerdict};
use thiserror::Error;

/// Confidence assumed when a retrieval decision omits it
pub const DEFAULT_DECISION_CONFIDENCE: f64 = 0.5;

/// Errors produced when a response does not follow the label format
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The response was empty or whitespace
    #[error("Empty response")]
    Empty,

    /// A required label was not found
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

static DECISION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)DECISION:\s*(YES|NO)\b").expect("valid regex"));
static CONFIDENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)CONFIDENCE:\s*([01](?:\.\d+)?|\.\d+)").expect("valid regex")
});
static REASONING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)REASONING:\s*(.+)").expect("valid regex"));
static REASONING_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)REASONING:").expect("valid regex"));
static SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)SCORE:\s*\[?\s*([1-5])\b").expect("valid regex"));
static SUPPORT_LEVEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)SUPPORT_LEVEL:\s*(FULLY_SUPPORTED|PARTIALLY_SUPPORTED|UNSUPPORTED)")
        .expect("valid regex")
});
static UNSUPPORTED_CLAIMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)UNSUPPORTED_CLAIMS:\s*(.*)").expect("valid regex"));

/// Fields of a retrieval-necessity response
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionFields {
    /// The model answered YES (or gave no usable answer)
    pub retrieve: bool,

    /// Model confidence in [0.0, 1.0]
    pub confidence: f64,

    /// Free-text explanation
    pub reasoning: String,
}

/// Fields of a relevance-grading response
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceFields {
    /// Score in [1, 5]
    pub score: u8,

    /// Free-text explanation
    pub reasoning: String,
}

fn capture<'a>(pattern: &Regex, text: &'a str) -> Option<&'a str> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

fn confidence(text: &str) -> Option<f64> {
    capture(&CONFIDENCE, text)
        .and_then(|raw| raw.parse::<f64>().ok())
        .map(clamp_confidence)
}

fn reasoning(text: &str, default: &str) -> String {
    capture(&REASONING, text).unwrap_or(default).to_string()
}

fn non_empty(response: &str) -> Result<&str, ParseError> {
    if response.trim().is_empty() {
        Err(ParseError::Empty)
    } else {
        Ok(response)
    }
}

/// Parse a `DECISION / CONFIDENCE / REASONING` response
///
/// Each field falls back independently: decision to YES, confidence to
/// [`DEFAULT_DECISION_CONFIDENCE`], reasoning to a generic note. Unlabeled
/// prose therefore parses as a YES at the default confidence; only an empty
/// response is an error.
pub fn parse_retrieval_decision(response: &str) -> Result<DecisionFields, ParseError> {
    let response = non_empty(response)?;

    Ok(DecisionFields {
        retrieve: capture(&DECISION, response).is_none_or(|d| d.eq_ignore_ascii_case("YES")),
        confidence: confidence(response).unwrap_or(DEFAULT_DECISION_CONFIDENCE),
        reasoning: reasoning(response, "No reasoning provided"),
    })
}

/// Parse a `SCORE / REASONING` response
pub fn parse_relevance(response: &str) -> Result<RelevanceFields, ParseError> {
    let response = non_empty(response)?;

    let score = capture(&SCORE, response)
        .and_then(|raw| raw.parse::<u8>().ok())
        .ok_or(ParseError::MissingField("SCORE"))?;

    Ok(RelevanceFields {
        score,
        reasoning: reasoning(response, "No reasoning"),
    })
}

/// Parse a `SUPPORT_LEVEL / CONFIDENCE / UNSUPPORTED_CLAIMS / REASONING` response
///
/// The support level is required; a missing confidence counts as 0.0 so an
/// unscored verdict can never pass as supported.
pub fn parse_support(response: &str) -> Result<SupportVerdict, ParseError> {
    let response = non_empty(response)?;

    let level: SupportLevel = capture(&SUPPORT_LEVEL, response)
        .and_then(|raw| raw.parse().ok())
        .ok_or(ParseError::MissingField("SUPPORT_LEVEL"))?;

    Ok(SupportVerdict {
        level,
        confidence: confidence(response).unwrap_or(0.0),
        unsupported_claims: unsupported_claims(response).unwrap_or_else(|| "Unknown".to_string()),
        reasoning: reasoning(response, "No reasoning"),
    })
}

/// Text after `UNSUPPORTED_CLAIMS:` up to the next `REASONING:` label
fn unsupported_claims(response: &str) -> Option<String> {
    let tail = capture(&UNSUPPORTED_CLAIMS, response)?;
    let claims = match REASONING_LABEL.find(tail) {
        Some(label) => &tail[..label.start()],
        None => tail,
    };
    let claims = claims.trim();
    (!claims.is_empty()).then(|| claims.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete_decision() {
        let fields =
            parse_retrieval_decision("DECISION: NO\nCONFIDENCE: 0.95\nREASONING: simple math")
                .unwrap();
        assert!(!fields.retrieve);
        assert_eq!(fields.confidence, 0.95);
        assert_eq!(fields.reasoning, "simple math");
    }

    #[test]
    fn test_decision_fields_default_independently() {
        let fields = parse_retrieval_decision("REASONING: not sure what this is").unwrap();
        assert!(fields.retrieve);
        assert_eq!(fields.confidence, DEFAULT_DECISION_CONFIDENCE);

        let fields = parse_retrieval_decision("decision: no").unwrap();
        assert!(!fields.retrieve);
        assert_eq!(fields.confidence, DEFAULT_DECISION_CONFIDENCE);
        assert_eq!(fields.reasoning, "No reasoning provided");
    }

    #[test]
    fn test_decision_reordered_fields() {
        let fields =
            parse_retrieval_decision("CONFIDENCE: 1.0\nREASONING: greeting\nDECISION: no").unwrap();
        assert!(!fields.retrieve);
        assert_eq!(fields.confidence, 1.0);
    }

    #[test]
    fn test_decision_without_labels_takes_defaults() {
        assert_eq!(
            parse_retrieval_decision("I think you should look it up."),
            Ok(DecisionFields {
                retrieve: true,
                confidence: DEFAULT_DECISION_CONFIDENCE,
                reasoning: "No reasoning provided".to_string(),
            })
        );
        assert_eq!(parse_retrieval_decision("  \n"), Err(ParseError::Empty));
    }

    #[test]
    fn test_confidence_variants() {
        assert_eq!(confidence("CONFIDENCE: .8"), Some(0.8));
        assert_eq!(confidence("CONFIDENCE: 1"), Some(1.0));
        assert_eq!(confidence("confidence: 0"), Some(0.0));
        assert_eq!(confidence("CONFIDENCE: 1.7"), Some(1.0));
        assert_eq!(confidence("CONFIDENCE: high"), None);
    }

    #[test]
    fn test_parse_relevance() {
        let fields = parse_relevance("SCORE: 4\nREASONING: Covers the topic").unwrap();
        assert_eq!(fields.score, 4);
        assert_eq!(fields.reasoning, "Covers the topic");

        let fields = parse_relevance("SCORE: [5]").unwrap();
        assert_eq!(fields.score, 5);
        assert_eq!(fields.reasoning, "No reasoning");
    }

    #[test]
    fn test_relevance_out_of_range_is_error() {
        assert_eq!(parse_relevance("SCORE: 7"), Err(ParseError::MissingField("SCORE")));
        assert_eq!(parse_relevance("SCORE: 45"), Err(ParseError::MissingField("SCORE")));
        assert_eq!(parse_relevance("Very relevant!"), Err(ParseError::MissingField("SCORE")));
    }

    #[test]
    fn test_parse_full_support() {
        let verdict = parse_support(
            "SUPPORT_LEVEL: FULLY_SUPPORTED\nCONFIDENCE: 0.9\nUNSUPPORTED_CLAIMS: None\nREASONING: All claims match",
        )
        .unwrap();
        assert_eq!(verdict.level, SupportLevel::FullySupported);
        assert_eq!(verdict.confidence, 0.9);
        assert_eq!(verdict.unsupported_claims, "None");
        assert_eq!(verdict.reasoning, "All claims match");
        assert!(verdict.is_supported());
    }

    #[test]
    fn test_unsupported_claims_stop_at_reasoning() {
        let verdict = parse_support(
            "SUPPORT_LEVEL: partially_supported\nCONFIDENCE: 0.6\nUNSUPPORTED_CLAIMS:\n- It was built in 1850\n- It is blue\nREASONING: Two dates disagree",
        )
        .unwrap();
        assert_eq!(verdict.level, SupportLevel::PartiallySupported);
        assert_eq!(verdict.unsupported_claims, "- It was built in 1850\n- It is blue");
        assert_eq!(verdict.reasoning, "Two dates disagree");
        assert!(!verdict.is_supported());
    }

    #[test]
    fn test_support_defaults() {
        let verdict = parse_support("SUPPORT_LEVEL: FULLY_SUPPORTED").unwrap();
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.unsupported_claims, "Unknown");
        assert!(!verdict.is_supported());
    }

    #[test]
    fn test_support_without_level_is_error() {
        assert_eq!(
            parse_support("CONFIDENCE: 0.9\nREASONING: looks fine"),
            Err(ParseError::MissingField("SUPPORT_LEVEL"))
        );
    }
}
