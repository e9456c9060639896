use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::embed::{checked, Embedder, Embedding};
use crate::{Error, Result};

/// Offline FAQ embedder running BAAI/bge-large-en-v1.5 through fastembed.
///
/// Vectors have 1024 values, so a corpus prepared with this embedder cannot
/// be matched against queries embedded by the OpenAI provider. FAQ questions
/// and user questions go through the same call, without the BGE retrieval
/// prefix, since both sides of the comparison are questions.
pub struct BgeEmbedder {
    model: TextEmbedding,
}

impl BgeEmbedder {
    /// Load the model, fetching it into the fastembed cache on first run.
    pub fn new() -> Result<Self> {
        let opts = InitOptions::new(EmbeddingModel::BGELargeENV15)
            .with_show_download_progress(true);

        TextEmbedding::try_new(opts)
            .map(|model| Self { model })
            .map_err(|e| Error::Embedding(e.to_string()))
    }
}

impl Embedder for BgeEmbedder {
    fn model_name(&self) -> &str {
        "BAAI/bge-large-en-v1.5"
    }

    fn dimension(&self) -> usize {
        1024
    }

    fn embed(&mut self, text: &str) -> Result<Embedding> {
        let embedding = self
            .model
            .embed(vec![text], None)
            .map_err(|e| Error::Embedding(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("model returned no embeddings".to_string()))?;
        checked(embedding)
    }
}
