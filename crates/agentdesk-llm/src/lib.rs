//! LLM completion client for agentdesk.
//!
//! `client` defines the provider-neutral trait and message types; `openai`
//! implements it against the OpenAI chat-completions API.

pub mod client;
pub mod openai;

pub use client::{ChatMessage, CompletionClient, CompletionResponse, TokenUsage};
pub use openai::OpenAiClient;
