use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::OpenAiConfig;
use crate::embed::{checked, Embedder, Embedding};
use crate::{http, Error, Result};

/// Remote embedder backed by the OpenAI embeddings endpoint.
///
/// One blocking request per text, no retries. Works with any server that
/// speaks the same `/embeddings` protocol.
pub struct OpenAiEmbedder {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Embedding,
}

impl OpenAiEmbedder {
    /// Create an embedder from config. Fails if no API key is set.
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let client = http::client(config.timeout())
            .map_err(|e| Error::Config(format!("cannot build http client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.embedding_model.clone(),
            dimension: config.embedding_dimension,
        })
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed(&mut self, text: &str) -> Result<Embedding> {
        let request = self.client.post(&self.url).bearer_auth(&self.api_key);
        let body = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let response: EmbeddingResponse = http::send_json(request, &body).map_err(|e| {
            tracing::warn!(model = %self.model, error = %e, "embedding request failed");
            Error::Embedding(e)
        })?;

        first_embedding(response)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn first_embedding(response: EmbeddingResponse) -> Result<Embedding> {
    let data = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| Error::Embedding("response contained no embeddings".to_string()))?;
    checked(data.embedding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Embedding> {
        first_embedding(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_parse_response() {
        let json = r#"{
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": [0.25, -0.5, 1.0]}],
            "model": "text-embedding-3-small",
            "usage": {"prompt_tokens": 5, "total_tokens": 5}
        }"#;
        assert_eq!(parse(json).unwrap(), vec![0.25, -0.5, 1.0]);
    }

    #[test]
    fn test_parse_no_data() {
        assert!(matches!(parse(r#"{"data": []}"#), Err(Error::Embedding(_))));
    }

    #[test]
    fn test_parse_empty_vector() {
        let json = r#"{"data": [{"embedding": []}]}"#;
        assert!(matches!(parse(json), Err(Error::Embedding(_))));
    }

    #[test]
    fn test_request_body() {
        let body = EmbeddingRequest {
            model: "text-embedding-3-small",
            input: "What are your hours?",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"model": "text-embedding-3-small", "input": "What are your hours?"})
        );
    }

    #[test]
    fn test_new_requires_key() {
        let config = OpenAiConfig::default();
        assert!(matches!(OpenAiEmbedder::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_url_and_metadata() {
        let config = OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://localhost:9/v1/".to_string(),
            ..OpenAiConfig::default()
        };
        let embedder = OpenAiEmbedder::new(&config).unwrap();

        assert_eq!(embedder.url, "http://localhost:9/v1/embeddings");
        assert_eq!(embedder.model_name(), "text-embedding-3-small");
        assert_eq!(embedder.dimension(), 1536);
    }

    #[test]
    fn test_unreachable_server_is_embedding_error() {
        let config = OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..OpenAiConfig::default()
        };
        let mut embedder = OpenAiEmbedder::new(&config).unwrap();
        assert!(matches!(embedder.embed("hello"), Err(Error::Embedding(_))));
    }
}
