//! OpenAI Chat Completions Client
//!
//! ## API Endpoints
//!
//! | Endpoint | URL | Purpose |
//! |----------|-----|--------|
//! | Base URL | `https://api.openai.com/v1` | All OpenAI APIs |
//! | Completions | `/chat/completions` | Chat completions |
//!
//! ## Authentication
//! - Header: `Authorization: Bearer {OPENAI_API_KEY}`

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::client::{ChatMessage, CompletionClient, CompletionResponse, TokenUsage};

pub mod endpoints {
    pub const BASE_URL: &str = "https://api.openai.com/v1";
    pub const CHAT_COMPLETIONS: &str = "/chat/completions";
}

/// Default model for every completion call.
pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    model: String,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    // Null when the model returns refusals or tool output only.
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        // The completion call is the only slow operation per request; the
        // transport-level timeout caps it at tens of seconds.
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            api_url: endpoints::BASE_URL.to_string(),
        })
    }

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY environment variable not set")?;
        Self::new(api_key)
    }

    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        let mut client = Self::new(api_key)?;
        client.api_url = endpoint.into();
        Ok(client)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, model: &str, messages: Vec<ChatMessage>) -> Result<CompletionResponse> {
        let url = format!("{}{}", self.api_url, endpoints::CHAT_COMPLETIONS);

        let api_request = OpenAiRequest {
            model: model.to_string(),
            messages,
        };

        debug!("OpenAI request to: {} (model {})", url, model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&api_request)
            .send()
            .await
            .context("Failed to send OpenAI request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API error {}: {}", status, body));
        }

        let result: OpenAiResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        // First choice's content; an empty reply is substituted rather than
        // treated as an error.
        let mut choices = result.choices.into_iter();
        let (content, finish_reason) = match choices.next() {
            Some(choice) => (choice.message.content.unwrap_or_default(), choice.finish_reason),
            None => (String::new(), None),
        };

        let usage = result.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(CompletionResponse {
            message: ChatMessage::assistant(content),
            model: result.model,
            finish_reason,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_endpoint_override() {
        let client = OpenAiClient::with_endpoint("test-key", "http://localhost:9999/v1").unwrap();
        assert_eq!(client.api_url(), "http://localhost:9999/v1");

        let default = OpenAiClient::new("test-key").unwrap();
        assert_eq!(default.api_url(), endpoints::BASE_URL);
    }

    #[test]
    fn test_response_parsing_empty_choices() {
        let raw = r#"{"choices": [], "model": "gpt-4o"}"#;
        let parsed: OpenAiResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.choices.is_empty());
        assert_eq!(parsed.model, "gpt-4o");
    }

    #[test]
    fn test_response_parsing_null_content() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "stop"}],
            "model": "gpt-4o",
            "usage": {"prompt_tokens": 10, "completion_tokens": 0, "total_tokens": 10}
        }"#;
        let parsed: OpenAiResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
