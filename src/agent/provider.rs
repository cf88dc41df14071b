//! Pluggable LLM provider trait.
//!
//! Implementations translate provider-agnostic [`ChatRequest`]/[`ChatResponse`]
//! into provider-specific SDK calls. This keeps all agent logic decoupled
//! from any particular LLM vendor. Providers are stateless and reentrant;
//! the orchestrator shares one instance across concurrent specialists
//! without locking.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse};
use crate::error::AgentError;

/// Trait for LLM provider backends.
///
/// Implementations handle the transport layer (HTTP, SDK calls, retries)
/// for a specific provider while presenting a uniform interface to agents.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"openai"`).
    fn name(&self) -> &'static str;

    /// Executes a chat completion request.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures, timeouts, or parse errors.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;
}
