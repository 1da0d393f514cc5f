//! LLM integration module.
//!
//! Provides an OpenAI-compatible client used as the external evaluator,
//! the prompts sent to it, and helpers for digging JSON out of replies.

mod client;
mod json;
mod prompts;

pub use client::{LlmClient, LlmResponse, Message, Role, TokenUsage};
pub use json::extract_json;
pub use prompts::Prompts;

use async_trait::async_trait;

use crate::error::Result;

/// Anything that can answer a prompt with text.
///
/// [`LlmClient`] talks to a real endpoint; tests plug in scripted replies.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Send an optional system prompt and a user prompt, returning the reply text.
    async fn complete(&self, system: Option<&str>, user: &str) -> Result<String>;

    /// Whether the evaluator can be called at all.
    fn is_available(&self) -> bool {
        true
    }
}
