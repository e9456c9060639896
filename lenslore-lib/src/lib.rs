//! LensLore - image tagging and FAQ answering over external AI services
//!
//! # Architecture
//!
//! ```text
//! Image -> ImageAnalyzer -> labels/objects -> Describer -> description
//!
//! FaqEntry* -> Embedder -> FaqEntry* (embedded)
//!                                |
//! Question -> Embedder -> Matcher <--+
//!                            |
//!                       MatchResult
//! ```
//!
//! # Example
//!
//! ```ignore
//! use lenslore_lib::{config::Config, embed::OpenAiEmbedder, faq::load_faq, matcher::FaqMatcher};
//!
//! let config = Config::from_env()?;
//! let embedder = OpenAiEmbedder::new(&config.openai)?;
//!
//! let mut matcher = FaqMatcher::new(embedder).with_threshold(config.threshold)?;
//! matcher.prepare(load_faq(&config.faq_path)?);
//!
//! let result = matcher.ask("What time do you open?")?;
//! match result.answer {
//!     Some(answer) => println!("{answer}"),
//!     None => println!("I don't know"),
//! }
//! ```

pub mod config;
pub mod describe;
pub mod embed;
pub mod error;
pub mod faq;
mod http;
pub mod matcher;
pub mod vision;

pub use error::{Error, Result};
