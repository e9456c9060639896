//! Error types for LensLore

use thiserror::Error;

/// Result type alias for LensLore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in LensLore operations
#[derive(Error, Debug)]
pub enum Error {
    /// The embedding provider failed to produce a vector
    #[error("embedding error: {0}")]
    Embedding(String),

    /// The vision API failed or returned something unreadable
    #[error("vision error: {0}")]
    Vision(String),

    /// The chat API failed to generate a description
    #[error("generation error: {0}")]
    Generation(String),

    /// Failed to read or parse the FAQ source
    #[error("faq error: {0}")]
    Faq(String),

    /// Missing or invalid configuration
    #[error("config error: {0}")]
    Config(String),

    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
