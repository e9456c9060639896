//! FAQ semantic matching
//!
//! Brute-force nearest neighbour over a small in-memory corpus:
//!
//! ```text
//! FaqEntry* -> prepare_embeddings -> FaqEntry* (with embeddings)
//!                                         |
//! query -> Embedder -> find_best_match <--+
//!                            |
//!                       MatchResult
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use lenslore_lib::matcher::{find_best_match, prepare_embeddings, DEFAULT_THRESHOLD};
//!
//! let faq = prepare_embeddings(&mut embedder, load_faq("faq.json")?);
//! let result = find_best_match(&mut embedder, "What time do you open?", &faq, DEFAULT_THRESHOLD)?;
//! if let Some(answer) = result.answer {
//!     println!("{answer}");
//! }
//! ```

use crate::embed::Embedder;
use crate::faq::FaqEntry;
use crate::{Error, Result};

/// Minimum similarity to trust a canned answer over "I don't know"
pub const DEFAULT_THRESHOLD: f32 = 0.85;

/// How a matching call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Best score reached the threshold
    Matched,
    /// A best candidate exists but its score is under the threshold
    BelowThreshold,
    /// No entry had a usable embedding
    NoCandidates,
}

/// Result of matching a query against the FAQ corpus
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Answer of the best entry, only when the threshold was met
    pub answer: Option<String>,
    /// Best similarity found, in [-1, 1]; absent when nothing was scored
    pub score: Option<f32>,
    /// Corpus position of the best scoring entry
    pub index: Option<usize>,
    pub outcome: MatchOutcome,
}

impl MatchResult {
    fn no_candidates() -> Self {
        Self {
            answer: None,
            score: None,
            index: None,
            outcome: MatchOutcome::NoCandidates,
        }
    }

    /// Returns `true` if a confident answer was found.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.outcome == MatchOutcome::Matched
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns `None` when the similarity is undefined: empty vectors, length
/// mismatch, a zero norm on either side, or non-finite components.
/// Otherwise a value in [-1, 1].
///
/// Sums are accumulated in `f64` so that components far from unit
/// magnitude neither overflow nor underflow.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }

    let dot: f64 = a.iter().zip(b).map(|(&x, &y)| f64::from(x) * f64::from(y)).sum();
    let norm_a = norm(a);
    let norm_b = norm(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    let sim = dot / (norm_a * norm_b);
    if !sim.is_finite() {
        return None;
    }
    Some(sim.clamp(-1.0, 1.0) as f32)
}

/// Returns `true` if `embedding` can take part in a cosine comparison.
pub fn has_direction(embedding: &[f32]) -> bool {
    let n = norm(embedding);
    n > 0.0 && n.is_finite()
}

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt()
}

/// Attach a question embedding to every entry, in order.
///
/// One provider call per entry. An entry whose call fails keeps no
/// embedding and is skipped by later matching; the rest of the batch
/// carries on.
pub fn prepare_embeddings<E>(embedder: &mut E, mut entries: Vec<FaqEntry>) -> Vec<FaqEntry>
where
    E: Embedder + ?Sized,
{
    let mut failed = 0;

    for (i, entry) in entries.iter_mut().enumerate() {
        entry.embedding = match embedder.embed(&entry.question) {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                tracing::warn!(index = i, question = %entry.question, error = %e, "faq entry is unembeddable");
                failed += 1;
                None
            }
        };
    }

    tracing::info!(
        entries = entries.len(),
        failed,
        model = embedder.model_name(),
        "prepared faq embeddings"
    );
    entries
}

/// Find the FAQ entry whose question is closest to `query`.
///
/// Fails with [`Error::Embedding`] if the query cannot be embedded, and
/// with [`Error::InvalidInput`] for a NaN threshold. Entries without a
/// usable embedding are never selected. Ties go to the earliest entry.
pub fn find_best_match<E>(
    embedder: &mut E,
    query: &str,
    entries: &[FaqEntry],
    threshold: f32,
) -> Result<MatchResult>
where
    E: Embedder + ?Sized,
{
    if threshold.is_nan() {
        return Err(Error::InvalidInput("threshold is NaN".to_string()));
    }

    let query_embedding = embedder.embed(query)?;
    Ok(best_match(&query_embedding, entries, threshold))
}

/// Score an already embedded query against the corpus.
pub fn best_match(query_embedding: &[f32], entries: &[FaqEntry], threshold: f32) -> MatchResult {
    let mut best: Option<(usize, f32)> = None;

    for (i, entry) in entries.iter().enumerate() {
        let Some(embedding) = entry.matchable_embedding(query_embedding.len()) else {
            tracing::debug!(index = i, "skipping entry without usable embedding");
            continue;
        };
        let Some(score) = cosine_similarity(query_embedding, embedding) else {
            tracing::debug!(index = i, "skipping entry without a direction");
            continue;
        };

        // strict comparison keeps the first entry on ties
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((i, score));
        }
    }

    let Some((index, score)) = best else {
        return MatchResult::no_candidates();
    };

    let (answer, outcome) = if score >= threshold {
        (Some(entries[index].answer.clone()), MatchOutcome::Matched)
    } else {
        (None, MatchOutcome::BelowThreshold)
    };
    tracing::debug!(index, score, threshold, ?outcome, "best faq match");

    MatchResult {
        answer,
        score: Some(score),
        index: Some(index),
        outcome,
    }
}

mod engine;
pub use engine::*;
