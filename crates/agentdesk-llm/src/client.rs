//! Completion Client Trait and Types
//!
//! The common interface the orchestrator talks to. Keeping the trait this
//! narrow is what lets tests swap in a stub for the real API.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One role-tagged message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: ChatMessage,
    pub model: String,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// Boxed client for dynamic dispatch
pub type BoxedClient = std::sync::Arc<dyn CompletionClient>;

/// A chat-completion backend.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Submit an ordered message sequence and return one assistant message.
    async fn complete(&self, model: &str, messages: Vec<ChatMessage>) -> Result<CompletionResponse>;
}
