use std::collections::HashMap;

use crate::embed::{checked, Embedder, Embedding};
use crate::{Error, Result};

/// Deterministic embedder for tests: a lookup table of vectors.
///
/// Texts missing from the table fail like a provider outage would.
pub(crate) struct StubEmbedder {
    dimension: usize,
    vectors: HashMap<String, Embedding>,
    pub(crate) calls: usize,
}

impl StubEmbedder {
    pub(crate) fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
            calls: 0,
        }
    }

    pub(crate) fn with(mut self, text: &str, vector: Embedding) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

impl Embedder for StubEmbedder {
    fn embed(&mut self, text: &str) -> Result<Embedding> {
        self.calls += 1;
        let vector = self
            .vectors
            .get(text)
            .cloned()
            .ok_or_else(|| Error::Embedding(format!("no vector for {text:?}")))?;
        checked(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}
