//! Bounded context assembly

use selfrag_domain::truncate_chars;

/// Delimiter placed between assembled documents
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Context produced by [`ContextAssembler::assemble`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext {
    /// Joined context text
    pub text: String,

    /// Characters of document content included (separators excluded)
    pub content_chars: usize,

    /// Number of documents that contributed, the last possibly truncated
    pub documents_used: usize,

    /// Whether the last contributing document was cut short
    pub truncated: bool,
}

/// Greedy truncate-and-stop accumulator over ranked documents
///
/// Documents are taken in the given order until the next one would overflow
/// the budget. That document is cut to exactly fill what is left and
/// assembly stops; anything ranked after it is dropped. The budget applies
/// to document content in characters, not to the separators.
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    max_chars: usize,
}

impl ContextAssembler {
    /// Create an assembler with a character budget
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// The character budget
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Assemble context from documents in ranked order
    pub fn assemble<'a, I>(&self, ranked: I) -> AssembledContext
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut parts: Vec<&str> = Vec::new();
        let mut used = 0;
        let mut truncated = false;

        for content in ranked {
            let len = content.chars().count();
            if used + len > self.max_chars {
                let remaining = self.max_chars - used;
                if remaining > 0 {
                    parts.push(truncate_chars(content, remaining));
                    used += remaining;
                }
                truncated = true;
                break;
            }
            parts.push(content);
            used += len;
        }

        AssembledContext {
            text: parts.join(CONTEXT_SEPARATOR),
            content_chars: used,
            documents_used: parts.len(),
            truncated,
        }
    }
}
