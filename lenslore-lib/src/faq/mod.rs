//! FAQ corpus: question/answer pairs with their question embeddings
//!
//! The source is a UTF-8 JSON array:
//!
//! ```json
//! [
//!   { "question": "What are your hours?", "answer": "9 to 5" },
//!   { "question": "Where are you located?", "answer": "Main St", "embedding": null }
//! ]
//! ```
//!
//! `embedding` stays absent until [`prepare_embeddings`](crate::matcher::prepare_embeddings)
//! runs over the entries.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::embed::Embedding;
use crate::{Error, Result};

/// Default location of the FAQ source
pub const DEFAULT_FAQ_PATH: &str = "faq.json";

/// A stored question/answer pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaqEntry {
    /// The FAQ question
    pub question: String,
    /// The answer to the FAQ question
    pub answer: String,
    /// Embedding of the question, absent before preparation or when the
    /// provider failed for this entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Embedding>,
}

impl FaqEntry {
    /// Create an entry without an embedding.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            embedding: None,
        }
    }

    /// The embedding if it is usable against a query of `dimension` values.
    ///
    /// Absent, empty and differently sized embeddings are not matchable.
    pub fn matchable_embedding(&self, dimension: usize) -> Option<&[f32]> {
        self.embedding
            .as_deref()
            .filter(|e| !e.is_empty() && e.len() == dimension)
    }
}

/// Load FAQ entries from a JSON file.
pub fn load_faq(path: impl AsRef<Path>) -> Result<Vec<FaqEntry>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| Error::Faq(format!("cannot read {}: {e}", path.display())))?;
    let entries = parse_faq(&text)?;
    tracing::debug!(path = %path.display(), entries = entries.len(), "loaded faq");
    Ok(entries)
}

/// Parse FAQ entries from JSON text.
pub fn parse_faq(text: &str) -> Result<Vec<FaqEntry>> {
    serde_json::from_str(text).map_err(|e| Error::Faq(e.to_string()))
}
