//! LensLore CLI - describe images and answer FAQ questions
//!
//! # Commands
//!
//! ```bash
//! # Tag an image and describe it
//! lenslore describe photo.jpg
//!
//! # Answer one question from the FAQ
//! lenslore ask "What time do you open?" --threshold 0.9
//!
//! # Show canned questions
//! lenslore faq -n 3
//!
//! # Question/answer session on stdin
//! lenslore chat
//!
//! # Embed text and show vector stats
//! lenslore embed "What are your hours?"
//! ```
//!
//! Keys come from `OPENAI_API_KEY` and `GOOGLE_VISION_API_KEY` (a `.env`
//! file is read when present).

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lenslore_lib::{
    config::Config,
    describe::{Describer, OpenAiDescriber},
    embed::Embedder,
    faq::load_faq,
    matcher::{FaqMatcher, MatchOutcome, MatchResult},
    vision::{GoogleVision, ImageAnalyzer},
};
use tracing_subscriber::EnvFilter;

const NO_ANSWER: &str = "I don't know the answer to that question.";
const NO_EVALUATION: &str = "Could not evaluate the question right now.";
const NO_DESCRIPTION: &str = "Could not generate a description.";

#[derive(Parser)]
#[command(name = "lenslore")]
#[command(about = "Image description and FAQ assistant")]
#[command(version)]
struct Cli {
    /// FAQ source file (JSON)
    #[arg(long, global = true, env = "LENSLORE_FAQ")]
    faq: Option<PathBuf>,

    /// Minimum similarity to accept a FAQ answer
    #[arg(short, long, global = true, env = "LENSLORE_THRESHOLD")]
    threshold: Option<f32>,

    /// Use the local BGE model instead of the OpenAI embeddings API
    #[cfg(feature = "local")]
    #[arg(long, global = true)]
    local: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect labels and objects in an image and describe it
    Describe {
        /// Image file (jpg, jpeg, png)
        image: PathBuf,
    },

    /// Answer a single question from the FAQ
    Ask {
        /// The question
        question: String,
    },

    /// List the first FAQ questions
    Faq {
        /// Number of questions to show
        #[arg(short, default_value = "3")]
        n: usize,
    },

    /// Answer questions read line by line from stdin
    Chat,

    /// Embed text and show vector info
    Embed {
        /// Text to embed
        text: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(faq) = &cli.faq {
        config.faq_path = faq.clone();
    }
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    config.validate()?;

    match &cli.command {
        Commands::Describe { image } => describe(&config, image),
        Commands::Ask { question } => {
            let mut matcher = prepared_matcher(&cli, &config)?;
            let reply = answer(&mut matcher, question);
            println!("{}", reply.render());
            Ok(())
        }
        Commands::Faq { n } => {
            let entries = load_faq(&config.faq_path)?;
            if entries.is_empty() {
                println!("The FAQ has no questions.");
            }
            for (i, entry) in entries.iter().take(*n).enumerate() {
                println!("{}. {}", i + 1, entry.question);
            }
            Ok(())
        }
        Commands::Chat => {
            let mut matcher = prepared_matcher(&cli, &config)?;
            chat(&mut matcher)
        }
        Commands::Embed { text } => {
            let mut embedder = embedder(&cli, &config)?;
            let embedding = embedder.embed(text)?;

            println!("Model: {}", embedder.model_name());
            println!("\nEmbedding stats:");
            println!("  Dimensions: {}", embedding.len());
            println!("  First 5 values: {:?}", &embedding[..embedding.len().min(5)]);
            println!("  Min: {:.4}", embedding.iter().cloned().fold(f32::INFINITY, f32::min));
            println!("  Max: {:.4}", embedding.iter().cloned().fold(f32::NEG_INFINITY, f32::max));
            Ok(())
        }
    }
}

fn describe(config: &Config, path: &Path) -> Result<()> {
    let image = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;

    let vision = GoogleVision::new(&config.vision)?;
    let detected = match vision.analyze(&image) {
        Ok(detected) => detected,
        Err(e) => {
            tracing::error!(error = %e, "image analysis failed");
            Default::default()
        }
    };

    println!("Labels: {}", detected.labels.join(", "));
    println!("Objects: {}", detected.objects.join(", "));

    let describer = OpenAiDescriber::new(&config.openai)?;
    let description = describer
        .describe(&detected.labels, &detected.objects)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "description failed");
            NO_DESCRIPTION.to_string()
        });

    println!("\nDescription and tags:\n{description}");
    Ok(())
}

fn embedder(cli: &Cli, config: &Config) -> Result<Box<dyn Embedder>> {
    #[cfg(feature = "local")]
    if cli.local {
        eprintln!("Loading BGE model (first run downloads ~1.2GB)...");
        return Ok(Box::new(lenslore_lib::embed::BgeEmbedder::new()?));
    }
    #[cfg(not(feature = "local"))]
    let _ = cli;

    Ok(Box::new(lenslore_lib::embed::OpenAiEmbedder::new(&config.openai)?))
}

fn prepared_matcher(cli: &Cli, config: &Config) -> Result<FaqMatcher<Box<dyn Embedder>>> {
    let entries = load_faq(&config.faq_path)?;
    let mut matcher = FaqMatcher::new(embedder(cli, config)?).with_threshold(config.threshold)?;

    let total = entries.len();
    let matchable = matcher.prepare(entries);
    if matchable < total {
        eprintln!("{} of {total} FAQ questions cannot be matched", total - matchable);
    }
    Ok(matcher)
}

struct Reply {
    text: String,
    score: Option<f32>,
}

impl Reply {
    /// Answer text followed by the best score, whether or not it was accepted.
    fn render(&self) -> String {
        match self.score {
            Some(score) => format!("{}\n(score: {score:.4})", self.text),
            None => self.text.clone(),
        }
    }
}

fn answer<E: Embedder>(matcher: &mut FaqMatcher<E>, question: &str) -> Reply {
    match matcher.ask(question) {
        Ok(MatchResult {
            answer: Some(answer),
            score,
            ..
        }) => Reply { text: answer, score },
        Ok(result) => {
            if result.outcome == MatchOutcome::NoCandidates {
                tracing::warn!("no FAQ entry is available for matching");
            }
            Reply {
                text: NO_ANSWER.to_string(),
                score: result.score,
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "question could not be evaluated");
            Reply {
                text: NO_EVALUATION.to_string(),
                score: None,
            }
        }
    }
}

fn chat<E: Embedder>(matcher: &mut FaqMatcher<E>) -> Result<()> {
    let suggested: Vec<String> = matcher.suggested_questions(3).map(str::to_string).collect();
    if suggested.is_empty() {
        println!("The FAQ has no questions.");
    } else {
        println!("Try asking:");
        for q in &suggested {
            println!("  - {q}");
        }
    }
    println!("Type a question, empty line to quit.\n");

    let mut history: Vec<(String, String)> = Vec::new();
    let mut previous = String::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            break;
        }
        // repeating the last question does not ask again
        if question == previous {
            continue;
        }

        let reply = answer(matcher, question);
        println!("{}\n", reply.text);
        history.push((question.to_string(), reply.text));
        previous = question.to_string();
    }

    if !history.is_empty() {
        println!("\n=== History ===\n");
        for (question, answer) in &history {
            println!("Question: {question}");
            println!("Answer: {answer}\n");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lenslore_lib::faq::FaqEntry;

    /// Maps a fixed set of texts to 2-d vectors, fails on anything else.
    struct TableEmbedder(Vec<(&'static str, Vec<f32>)>);

    impl Embedder for TableEmbedder {
        fn embed(&mut self, text: &str) -> lenslore_lib::Result<Vec<f32>> {
            self.0
                .iter()
                .find(|(t, _)| *t == text)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| lenslore_lib::Error::Embedding(format!("no vector for {text}")))
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "table"
        }
    }

    fn matcher(threshold: f32) -> FaqMatcher<TableEmbedder> {
        let embedder = TableEmbedder(vec![
            ("What are your hours?", vec![0.91, 0.414_608_3]),
            ("What time do you open?", vec![1.0, 0.0]),
        ]);
        let mut matcher = FaqMatcher::new(embedder).with_threshold(threshold).unwrap();
        matcher.prepare(vec![FaqEntry::new("What are your hours?", "9 to 5")]);
        matcher
    }

    #[test]
    fn test_ask_prints_score_with_answer() {
        let reply = answer(&mut matcher(0.85), "What time do you open?");
        assert_eq!(reply.render(), "9 to 5\n(score: 0.9100)");
    }

    #[test]
    fn test_ask_prints_score_without_answer() {
        let reply = answer(&mut matcher(0.95), "What time do you open?");
        assert_eq!(reply.render(), format!("{NO_ANSWER}\n(score: 0.9100)"));
    }

    #[test]
    fn test_ask_without_score_on_provider_failure() {
        let reply = answer(&mut matcher(0.85), "unknown");
        assert_eq!(reply.render(), NO_EVALUATION);
    }
}
