//! Text embedding providers
//!
//! The matcher only needs one operation from a provider: turn a piece of
//! text into a dense vector. Failures are explicit `Err` values so the
//! matcher can tell "no embedding available" apart from a real vector.
//!
//! Two providers ship with the crate:
//!
//! - [`OpenAiEmbedder`]: remote `text-embedding-3-small` (1536 dimensions)
//! - `BgeEmbedder` (feature `local`): BAAI/bge-large-en-v1.5 via fastembed (1024 dimensions)
//!
//! # Usage
//!
//! ```ignore
//! use lenslore_lib::embed::{Embedder, OpenAiEmbedder};
//!
//! let mut embedder = OpenAiEmbedder::new(&config.openai)?;
//! let embedding = embedder.embed("What time do you open?")?;
//! ```

use crate::{Error, Result};

/// A vector embedding - fixed size array of floats
pub type Embedding = Vec<f32>;

/// Trait for text embedding providers
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    ///
    /// Implementations return `Err(Error::Embedding)` instead of an empty
    /// or sentinel vector.
    fn embed(&mut self, text: &str) -> Result<Embedding>;

    /// Embed several texts, one result per input.
    ///
    /// A failure for one text does not affect the others.
    fn embed_batch(&mut self, texts: &[&str]) -> Vec<Result<Embedding>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Returns the embedding dimension
    fn dimension(&self) -> usize;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn embed(&mut self, text: &str) -> Result<Embedding> {
        (**self).embed(text)
    }

    fn embed_batch(&mut self, texts: &[&str]) -> Vec<Result<Embedding>> {
        (**self).embed_batch(texts)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Reject vectors a provider should never hand back.
pub(crate) fn checked(embedding: Embedding) -> Result<Embedding> {
    if embedding.is_empty() {
        return Err(Error::Embedding("provider returned an empty vector".to_string()));
    }
    if embedding.iter().any(|x| !x.is_finite()) {
        return Err(Error::Embedding("provider returned non-finite values".to_string()));
    }
    Ok(embedding)
}

mod openai;
pub use openai::*;

#[cfg(feature = "local")]
mod bge;
#[cfg(feature = "local")]
pub use bge::*;

#[cfg(test)]
pub(crate) mod stub;
