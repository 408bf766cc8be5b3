//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for all chat-completion providers, allowing
//! the agent to work with any backend without code changes. The interface
//! is deliberately narrow: one shot in, either free-form/JSON text or a
//! list of tool-call requests out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;
use crate::tool::{ToolCall, ToolSchema};

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "gpt-4o", "claude-3-sonnet")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    2048
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o".into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// How the model may use the offered tools
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Model decides whether to call tools or answer directly
    Auto,
    /// Tools must not be called
    None,
}

/// One chat-completion request
#[derive(Clone, Debug)]
pub struct ChatRequest<'a> {
    /// Conversation so far, oldest first
    pub messages: &'a [Message],

    /// Tool schemas offered to the model this round
    pub tools: &'a [ToolSchema],

    /// Tool-choice policy for this round
    pub tool_choice: ToolChoice,

    /// Force the response to be a single JSON object
    pub json_object: bool,

    /// Generation options
    pub options: &'a GenerationOptions,
}

impl<'a> ChatRequest<'a> {
    /// Plain text request: no tools, no JSON enforcement
    pub fn text(messages: &'a [Message], options: &'a GenerationOptions) -> Self {
        Self {
            messages,
            tools: &[],
            tool_choice: ToolChoice::None,
            json_object: false,
            options,
        }
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text (may be empty on a pure tool-call turn)
    pub content: String,

    /// Tool calls requested by the model, in request order
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// Whether the model asked for tools instead of answering
    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolUse,
    ContentFilter,
    Error,
}

/// Strategy trait for chat-completion providers
///
/// Implement this trait to add support for new LLM backends.
/// The agent works exclusively through this interface. Provider errors
/// (auth, rate limit, network) are fatal to the current cycle only.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Execute one chat completion
    async fn complete(&self, request: ChatRequest<'_>) -> Result<Completion>;

    /// Provider name, for logs
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.temperature, 0.7);
        assert_eq!(opts.max_tokens, 2048);
        assert_eq!(opts.model, "gpt-4o");
    }

    #[test]
    fn test_completion_wants_tools() {
        let completion = Completion {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: Some("call_0".into()),
                name: "get_market_quote".into(),
                arguments: std::collections::HashMap::new(),
            }],
            model: "gpt-4o".into(),
            usage: None,
            finish_reason: Some(FinishReason::ToolUse),
        };
        assert!(completion.wants_tools());
    }
}
