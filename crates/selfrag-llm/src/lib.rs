//! Self-RAG LLM Provider Layer
//!
//! Pluggable implementations of the generation port (`LlmProvider`) and of
//! the `Embedder` port used by knowledge stores.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, rule-based mock for testing
//! - `OllamaProvider`: Local Ollama API integration (generation + embeddings)
//! - `GeminiProvider`: Google Generative Language API (generation + embeddings)
//!
//! Retry and timeout policy belongs to these providers; the pipeline never
//! retries on its own.
//!
//! # Examples
//!
//! ```
//! use selfrag_llm::MockProvider;
//! use selfrag_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

mod http;
pub mod gemini;
pub mod ollama;

use selfrag_domain::traits::LlmProvider as LlmProviderTrait;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Required credential is not configured
    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error,
}

/// Mock LLM provider for deterministic testing
///
/// Responses are selected by rules: the first registered rule whose needle
/// occurs anywhere in the prompt wins; otherwise the default response is
/// returned. Every prompt is recorded so tests can assert on what was (or
/// was not) sent.
///
/// # Examples
///
/// ```
/// use selfrag_llm::MockProvider;
/// use selfrag_domain::traits::LlmProvider;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt").unwrap(), "Fixed response");
///
/// // Rule-based responses
/// let mut provider = MockProvider::default();
/// provider.add_response("retrieval decision", "DECISION: NO");
/// provider.add_response("fact-checking", "SUPPORT_LEVEL: FULLY_SUPPORTED");
/// assert_eq!(provider.generate("You are a retrieval decision system").unwrap(), "DECISION: NO");
/// assert_eq!(provider.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Respond with `response` to any prompt containing `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        lock(&self.rules).push((needle.into(), MockReply::Text(response.into())));
    }

    /// Fail any prompt containing `needle`
    pub fn add_error(&mut self, needle: impl Into<String>) {
        lock(&self.rules).push((needle.into(), MockReply::Error));
    }

    /// Builder form of [`MockProvider::add_response`]
    pub fn with_response(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.add_response(needle, response);
        self
    }

    /// Builder form of [`MockProvider::add_error`]
    pub fn with_error(mut self, needle: impl Into<String>) -> Self {
        self.add_error(needle);
        self
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// All prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Number of received prompts containing `needle`
    pub fn calls_containing(&self, needle: &str) -> usize {
        lock(&self.prompts).iter().filter(|p| p.contains(needle)).count()
    }

    /// Reset the recorded prompts
    pub fn reset_call_count(&self) {
        lock(&self.prompts).clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        lock(&self.prompts).push(prompt.to_string());

        let rules = lock(&self.rules);
        let matched = rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone());

        match matched {
            Some(MockReply::Text(response)) => Ok(response),
            Some(MockReply::Error) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_rule_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("say hello please").unwrap(), "world");
        assert_eq!(provider.generate("foo").unwrap(), "bar");
        assert_eq!(provider.generate("unknown").unwrap(), "Default mock response");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let provider = MockProvider::default()
            .with_response("alpha", "first")
            .with_response("alpha beta", "second");

        assert_eq!(provider.generate("alpha beta").unwrap(), "first");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1").unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.generate("prompt2").unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.calls_containing("prompt2"), 1);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let provider = MockProvider::default().with_error("bad prompt");

        let result = provider.generate("this is a bad prompt");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[test]
    fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test").unwrap();

        // Both should share the same recorded prompts due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
        assert_eq!(provider2.prompts(), vec!["test".to_string()]);
    }

    #[test]
    fn test_missing_credential_message() {
        let err = LlmError::MissingCredential("GOOGLE_API_KEY".to_string());
        assert_eq!(err.to_string(), "Missing credential: GOOGLE_API_KEY is not set");
    }
}
