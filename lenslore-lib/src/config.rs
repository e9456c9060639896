//! Runtime configuration
//!
//! Values come from serde defaults, then from the environment (a `.env`
//! file is loaded first when present):
//!
//! | Variable | Field |
//! |---|---|
//! | `OPENAI_API_KEY` | `openai.api_key` |
//! | `OPENAI_BASE_URL` | `openai.base_url` |
//! | `GOOGLE_VISION_API_KEY` | `vision.api_key` |
//! | `LENSLORE_THRESHOLD` | `threshold` |
//! | `LENSLORE_FAQ` | `faq_path` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::faq::DEFAULT_FAQ_PATH;
use crate::matcher::DEFAULT_THRESHOLD;
use crate::{Error, Result};

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Minimum similarity to trust a canned FAQ answer
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// FAQ source file
    #[serde(default = "default_faq_path")]
    pub faq_path: PathBuf,

    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub vision: VisionConfig,
}

/// OpenAI-compatible API settings, shared by embeddings and chat
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Vector length produced by `embedding_model`
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Google Cloud Vision settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VisionConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_vision_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            faq_path: default_faq_path(),
            openai: OpenAiConfig::default(),
            vision: VisionConfig::default(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            embedding_model: default_embedding_model(),
            embedding_dimension: default_embedding_dimension(),
            chat_model: default_chat_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_vision_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from the environment, reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.openai.api_key = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty());
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            config.openai.base_url = url;
        }
        config.vision.api_key = lookup("GOOGLE_VISION_API_KEY").filter(|k| !k.is_empty());
        if let Some(path) = lookup("LENSLORE_FAQ") {
            config.faq_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup("LENSLORE_THRESHOLD") {
            config.threshold = raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("LENSLORE_THRESHOLD is not a number: {raw}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the threshold is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(Error::Config(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

impl OpenAiConfig {
    /// The API key, or a config error naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl VisionConfig {
    /// The API key, or a config error naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::Config("GOOGLE_VISION_API_KEY is not set".to_string()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_faq_path() -> PathBuf {
    PathBuf::from(DEFAULT_FAQ_PATH)
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimension() -> usize {
    1536
}

fn default_chat_model() -> String {
    "gpt-4".to_string()
}

fn default_vision_endpoint() -> String {
    "https://vision.googleapis.com/v1/images:annotate".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert!((config.threshold - 0.85).abs() < f32::EPSILON);
        assert_eq!(config.faq_path, PathBuf::from("faq.json"));
        assert_eq!(config.openai.embedding_model, "text-embedding-3-small");
        assert_eq!(config.openai.embedding_dimension, 1536);
        assert_eq!(config.openai.chat_model, "gpt-4");
        assert!(config.openai.api_key.is_none());
        assert!(config.vision.api_key.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("GOOGLE_VISION_API_KEY", "g-test"),
            ("LENSLORE_THRESHOLD", " 0.9 "),
            ("LENSLORE_FAQ", "data/faq.json"),
        ]))
        .unwrap();

        assert_eq!(config.openai.require_api_key().unwrap(), "sk-test");
        assert_eq!(config.openai.base_url, "http://localhost:8080/v1");
        assert_eq!(config.vision.require_api_key().unwrap(), "g-test");
        assert!((config.threshold - 0.9).abs() < f32::EPSILON);
        assert_eq!(config.faq_path, PathBuf::from("data/faq.json"));
    }

    #[test]
    fn test_empty_key_is_missing() {
        let config = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "")])).unwrap();
        assert!(matches!(
            config.openai.require_api_key(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_bad_threshold() {
        let err = Config::from_lookup(lookup_from(&[("LENSLORE_THRESHOLD", "high")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("LENSLORE_THRESHOLD", "NaN")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: Config = serde_json::from_str(r#"{"threshold": 0.7, "openai": {"chat_model": "gpt-4o"}}"#).unwrap();
        assert!((config.threshold - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.openai.chat_model, "gpt-4o");
        assert_eq!(config.openai.embedding_model, "text-embedding-3-small");
    }
}
