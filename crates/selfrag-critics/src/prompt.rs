//! Prompt templates for the reflection stages
//!
//! Each template declares the exact label format the parser expects.

use selfrag_domain::truncate_chars;

/// Build the retrieval-necessity prompt
pub fn retrieval_decision(query: &str) -> String {
    format!(
        r#"You are a retrieval decision system. Decide whether answering the query requires looking up external documents.

Query: "{query}"

Classification rules:
- Answer "NO" for simple math, general knowledge, greetings, or requests for opinion
- Answer "YES" for specific facts, recent events, domain knowledge, or anything needing citations

Respond in this exact format:
DECISION: YES or NO
CONFIDENCE: 0.0 to 1.0
REASONING: Brief explanation

Your response:"#
    )
}

/// Build the relevance-grading prompt for one document
///
/// Only the first `preview_chars` characters of the document are included.
pub fn relevance_grade(query: &str, document: &str, preview_chars: usize) -> String {
    let excerpt = truncate_chars(document, preview_chars);
    format!(
        r#"Grade how relevant this document is to the query.

Query: "{query}"

Document excerpt:
{excerpt}

Rate on a scale of 1-5:
5 = Directly answers the query
4 = Highly relevant supporting information
3 = Somewhat relevant
2 = Tangentially related
1 = Not relevant

Respond in this exact format:
SCORE: [1-5]
REASONING: Brief explanation

Your response:"#
    )
}

/// Build the support-verification prompt
///
/// Only the first `context_chars` characters of the context are included.
pub fn support_check(query: &str, answer: &str, context: &str, context_chars: usize) -> String {
    let context = truncate_chars(context, context_chars);
    format!(
        r#"You are a fact-checking system. Verify whether the answer is fully supported by the context.

Context:
{context}

Question: "{query}"

Answer:
{answer}

Analysis tasks:
1. Identify every factual claim in the answer
2. Check whether EACH claim is supported by the context
3. List any unsupported or hallucinated claims

Respond in this exact format:
SUPPORT_LEVEL: FULLY_SUPPORTED | PARTIALLY_SUPPORTED | UNSUPPORTED
CONFIDENCE: 0.0 to 1.0
UNSUPPORTED_CLAIMS: List each unsupported claim (or "None")
REASONING: Brief explanation

Your response:"#
    )
}
