use crate::embed::Embedder;
use crate::faq::FaqEntry;
use crate::matcher::{
    find_best_match, has_direction, prepare_embeddings, MatchResult, DEFAULT_THRESHOLD,
};
use crate::{Error, Result};

/// FAQ question answering: an embedder, a prepared corpus and a threshold.
///
/// ```ignore
/// use lenslore_lib::matcher::FaqMatcher;
///
/// let mut matcher = FaqMatcher::new(embedder).with_threshold(0.9)?;
/// matcher.prepare(load_faq("faq.json")?);
/// let result = matcher.ask("What time do you open?")?;
/// ```
pub struct FaqMatcher<E: Embedder> {
    embedder: E,
    entries: Vec<FaqEntry>,
    threshold: f32,
}

impl<E: Embedder> FaqMatcher<E> {
    /// Create a matcher with an empty corpus and the default threshold.
    #[must_use]
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Set the acceptance threshold. NaN is rejected.
    pub fn with_threshold(mut self, threshold: f32) -> Result<Self> {
        if threshold.is_nan() {
            return Err(Error::InvalidInput("threshold is NaN".to_string()));
        }
        self.threshold = threshold;
        Ok(self)
    }

    /// Embed `entries` and replace the corpus with them.
    ///
    /// Returns the number of entries that can be matched.
    pub fn prepare(&mut self, entries: Vec<FaqEntry>) -> usize {
        self.entries = prepare_embeddings(&mut self.embedder, entries);
        self.matchable()
    }

    /// Answer a question using the configured threshold.
    pub fn ask(&mut self, query: &str) -> Result<MatchResult> {
        let threshold = self.threshold;
        self.ask_with_threshold(query, threshold)
    }

    /// Answer a question with a one-off threshold.
    pub fn ask_with_threshold(&mut self, query: &str, threshold: f32) -> Result<MatchResult> {
        find_best_match(&mut self.embedder, query, &self.entries, threshold)
    }

    /// The first `n` questions in corpus order, for offering canned prompts.
    pub fn suggested_questions(&self, n: usize) -> impl Iterator<Item = &str> {
        self.entries.iter().take(n).map(|e| e.question.as_str())
    }

    /// Number of entries with an embedding that can take part in matching.
    #[must_use]
    pub fn matchable(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.embedding.as_deref().is_some_and(has_direction))
            .count()
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    #[must_use]
    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    /// Returns the number of entries in the corpus.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the corpus is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Returns a mutable reference to the embedder.
    pub fn embedder_mut(&mut self) -> &mut E {
        &mut self.embedder
    }
}
