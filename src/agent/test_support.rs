//! Scripted provider doubles shared by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse, TokenUsage};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// One scripted reply: matched by substring against the request's
/// system prompt plus user message, with an optional artificial delay.
struct KeyedReply {
    key: String,
    response: String,
    delay: Duration,
}

enum Script {
    /// Replies consumed in call order.
    Sequence(Mutex<VecDeque<String>>),
    /// Replies selected by request content.
    Keyed(Vec<KeyedReply>),
    /// Every call fails with this message.
    Fail(String),
}

/// Deterministic [`LlmProvider`] double.
///
/// Records every request so tests can assert which prompts were issued.
pub(crate) struct ScriptedProvider {
    script: Script,
    calls: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    /// Replies are returned in the order the provider is called.
    pub(crate) fn new(responses: Vec<&str>) -> Self {
        Self {
            script: Script::Sequence(Mutex::new(
                responses.into_iter().map(String::from).collect(),
            )),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replies are selected by substring match on the request content,
    /// independent of call order. The first matching entry wins.
    pub(crate) fn keyed(entries: Vec<(&str, &str)>) -> Self {
        Self::keyed_with_delay(
            entries
                .into_iter()
                .map(|(k, r)| (k, r, Duration::ZERO))
                .collect(),
        )
    }

    /// Keyed replies with a per-entry artificial delay, for exercising
    /// out-of-order specialist completion.
    pub(crate) fn keyed_with_delay(entries: Vec<(&str, &str, Duration)>) -> Self {
        Self {
            script: Script::Keyed(
                entries
                    .into_iter()
                    .map(|(key, response, delay)| KeyedReply {
                        key: key.to_string(),
                        response: response.to_string(),
                        delay,
                    })
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with an [`AgentError::ApiRequest`].
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            script: Script::Fail(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of all requests issued so far.
    pub(crate) fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, request: &ChatRequest) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
    }

    fn request_text(request: &ChatRequest) -> String {
        request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        self.record(request);

        let (content, delay) = match &self.script {
            Script::Fail(message) => {
                return Err(AgentError::ApiRequest {
                    message: message.clone(),
                    status: None,
                });
            }
            Script::Sequence(queue) => {
                let next = queue.lock().ok().and_then(|mut q| q.pop_front());
                match next {
                    Some(content) => (content, Duration::ZERO),
                    None => {
                        return Err(AgentError::Orchestration {
                            message: "scripted provider exhausted".to_string(),
                        });
                    }
                }
            }
            Script::Keyed(entries) => {
                let text = Self::request_text(request);
                match entries.iter().find(|e| text.contains(&e.key)) {
                    Some(entry) => (entry.response.clone(), entry.delay),
                    None => {
                        return Err(AgentError::Orchestration {
                            message: format!("no scripted reply matches request: {text:.80}"),
                        });
                    }
                }
            }
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        Ok(ChatResponse {
            content,
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            finish_reason: Some("stop".to_string()),
        })
    }
}
