//! `OpenAI` provider implementation using the `async-openai` crate.
//!
//! Supports any `OpenAI`-compatible API (`OpenAI`, Azure, local proxies)
//! via the base URL override in [`AgentConfig`].

use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
    CreateChatCompletionRequest, ResponseFormat,
};
use async_trait::async_trait;
use tracing::debug;

use crate::agent::config::AgentConfig;
use crate::agent::message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
use crate::agent::provider::LlmProvider;
use crate::error::AgentError;

/// Base delay for retry backoff; doubles per attempt.
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Ceiling for the per-attempt retry delay.
const RETRY_MAX_DELAY_MS: u64 = 30_000;

/// `OpenAI`-compatible LLM provider.
///
/// Wraps the `async-openai` client for chat completions. Compatible
/// with any API that follows the `OpenAI` chat completion spec.
/// Transient request failures are retried with exponential backoff up
/// to the configured attempt limit.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    max_retries: u32,
}

impl OpenAiProvider {
    /// Creates a new provider from agent configuration.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(ref base_url) = config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        Self {
            client: Client::with_config(openai_config),
            max_retries: config.max_retries,
        }
    }

    /// Converts our message type to the `OpenAI` SDK type.
    fn convert_message(msg: &ChatMessage) -> ChatCompletionRequestMessage {
        match msg.role {
            Role::System => {
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: async_openai::types::ChatCompletionRequestSystemMessageContent::Text(
                        msg.content.clone(),
                    ),
                    name: None,
                })
            }
            Role::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: async_openai::types::ChatCompletionRequestUserMessageContent::Text(
                    msg.content.clone(),
                ),
                name: None,
            }),
            Role::Assistant => {
                #[allow(deprecated)]
                ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    content: Some(
                        async_openai::types::ChatCompletionRequestAssistantMessageContent::Text(
                            msg.content.clone(),
                        ),
                    ),
                    name: None,
                    tool_calls: None,
                    refusal: None,
                    audio: None,
                    function_call: None,
                })
            }
        }
    }

    /// Builds an `OpenAI` chat completion request from our generic request.
    fn build_request(request: &ChatRequest) -> CreateChatCompletionRequest {
        let messages: Vec<_> = request.messages.iter().map(Self::convert_message).collect();

        let response_format = if request.json_mode {
            Some(ResponseFormat::JsonObject)
        } else {
            None
        };

        CreateChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature.filter(|&t| t != 0.0),
            max_completion_tokens: request.max_tokens,
            response_format,
            ..Default::default()
        }
    }

    /// Whether a failed request is worth retrying.
    ///
    /// Network and server-side failures may clear on a later attempt;
    /// auth, malformed-request, and deserialization failures never will.
    fn is_transient(error: &async_openai::error::OpenAIError) -> bool {
        use async_openai::error::OpenAIError;

        match error {
            OpenAIError::Reqwest(_) => true,
            OpenAIError::ApiError(api) => {
                api.r#type.as_deref() == Some("server_error")
                    || api.code.as_deref() == Some("rate_limit_exceeded")
            }
            _ => false,
        }
    }

    /// Backoff delay for the given attempt, capped and overflow-safe.
    fn retry_delay_ms(attempt: u32) -> u64 {
        // 500ms << 6 already exceeds the cap; larger shifts would wrap.
        let exp = attempt.min(6);
        (RETRY_BASE_DELAY_MS << exp).min(RETRY_MAX_DELAY_MS)
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("client", &"<async-openai::Client>")
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let openai_request = Self::build_request(request);

        let mut attempt: u32 = 0;
        let response = loop {
            match self.client.chat().create(openai_request.clone()).await {
                Ok(response) => break response,
                Err(e) if attempt < self.max_retries && Self::is_transient(&e) => {
                    let delay_ms = Self::retry_delay_ms(attempt);
                    attempt += 1;
                    debug!(attempt, delay_ms, error = %e, "chat completion failed, retrying");
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => {
                    return Err(AgentError::ApiRequest {
                        message: e.to_string(),
                        status: None,
                    });
                }
            }
        };

        let choice = response.choices.first();

        let content = choice
            .and_then(|c| c.message.content.as_ref())
            .cloned()
            .unwrap_or_default();

        let finish_reason = choice.and_then(|c| {
            c.finish_reason
                .as_ref()
                .map(|fr| format!("{fr:?}").to_lowercase())
        });

        let usage = response
            .usage
            .map_or_else(TokenUsage::default, |u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            });

        Ok(ChatResponse {
            content,
            usage,
            finish_reason,
        })
    }
}
