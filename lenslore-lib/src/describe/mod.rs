//! Image descriptions generated by a chat model from detected tags

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::OpenAiConfig;
use crate::{http, Error, Result};

/// Trait for turning detected labels and objects into prose
pub trait Describer {
    /// Produce a short description and a tag list.
    fn describe(&self, labels: &[String], objects: &[String]) -> Result<String>;
}

/// Build the single user message sent to the chat model.
pub fn build_prompt(labels: &[String], objects: &[String]) -> String {
    let tags: Vec<&str> = labels.iter().chain(objects).map(String::as_str).collect();
    format!(
        "Based on the following labels and objects detected in an image:\n{}\n\
         Write a short description (1-2 sentences) and a list of tags (max 5):",
        tags.join(", ")
    )
}

/// OpenAI chat completions client
pub struct OpenAiDescriber {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiDescriber {
    /// Create a client from config. Fails if no API key is set.
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let client = http::client(config.timeout())
            .map_err(|e| Error::Config(format!("cannot build http client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.chat_model.clone(),
        })
    }
}

impl Describer for OpenAiDescriber {
    fn describe(&self, labels: &[String], objects: &[String]) -> Result<String> {
        let prompt = build_prompt(labels, objects);
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };
        let request = self.client.post(&self.url).bearer_auth(&self.api_key);

        let response: ChatResponse = http::send_json(request, &body).map_err(|e| {
            tracing::warn!(model = %self.model, error = %e, "chat request failed");
            Error::Generation(e)
        })?;
        first_content(response)
    }
}

fn first_content(response: ChatResponse) -> Result<String> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| Error::Generation("response contained no message".to_string()))?;
    Ok(content.trim().to_string())
}
