//! Document module - the unit of knowledge handed to the store

use std::collections::BTreeMap;
use std::fmt;

/// Default prefix for store-assigned identifiers
pub const DEFAULT_ID_PREFIX: &str = "doc_";

/// Identifier assigned to a document by the knowledge store at ingestion time
///
/// Identifiers have the form `{prefix}{n}` where `n` is the store's running
/// ingestion counter plus the document's offset in the ingested batch.
///
/// # Examples
///
/// ```
/// use selfrag_domain::DocumentId;
///
/// let id = DocumentId::sequential("doc_", 7);
/// assert_eq!(id.as_str(), "doc_7");
/// assert_eq!(id.sequence("doc_"), Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an existing identifier string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the identifier for sequence number `n`
    pub fn sequential(prefix: &str, n: u64) -> Self {
        Self(format!("{}{}", prefix, n))
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the sequence number if this id was built with `prefix`
    pub fn sequence(&self, prefix: &str) -> Option<u64> {
        self.0.strip_prefix(prefix)?.parse().ok()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A scalar metadata value
///
/// Metadata is opaque to the pipeline and passed through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// Text value
    String(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => f.write_str(s),
            MetadataValue::Integer(i) => write!(f, "{}", i),
            MetadataValue::Float(x) => write!(f, "{}", x),
            MetadataValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::String(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::String(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        MetadataValue::Integer(i)
    }
}

impl From<f64> for MetadataValue {
    fn from(x: f64) -> Self {
        MetadataValue::Float(x)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

/// Document metadata (string keys, scalar values)
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A document - content plus opaque metadata
///
/// Documents are created by the caller, ingested once, and immutable
/// thereafter. The `id` is `None` until the document has been ingested;
/// documents returned from a store search always carry their id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identifier (absent before ingestion)
    pub id: Option<DocumentId>,

    /// Document text
    pub content: String,

    /// Opaque scalar metadata
    pub metadata: Metadata,
}

impl Document {
    /// Create a new, not yet ingested document with empty metadata
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Return a copy of this document carrying the given identifier
    pub fn with_id(mut self, id: DocumentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Length of the content in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// The first `max_chars` characters of the content
    pub fn preview(&self, max_chars: usize) -> &str {
        truncate_chars(&self.content, max_chars)
    }
}

/// Truncate `text` to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
