//! Provider-agnostic message types for LLM communication.
//!
//! These types decouple agent logic from any specific LLM SDK, so the
//! router, specialists, and combiner work unchanged across providers.

use serde::{Deserialize, Serialize};

/// Role of a chat message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// User input.
    User,
    /// Assistant response.
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Message content.
    pub content: String,
}

/// A chat completion request (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Ordered conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature (0.0–2.0).
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Request JSON-formatted output.
    pub json_mode: bool,
}

/// Token usage statistics from a completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated in the completion.
    pub completion_tokens: u32,
    /// Total tokens used.
    pub total_tokens: u32,
}

/// A chat completion response (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Generated text content.
    pub content: String,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Finish reason from the model (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// Creates a system message.
#[must_use]
pub fn system_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::System,
        content: content.to_string(),
    }
}

/// Creates a user message.
#[must_use]
pub fn user_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::User,
        content: content.to_string(),
    }
}
