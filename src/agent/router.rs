//! Router agent for domain classification.
//!
//! Classifies a question into zero or more domains from the registry's
//! closed set. Parse failures fail soft: the router logs a warning and
//! returns an empty route set instead of aborting the run, which lets
//! the downstream path short-circuit to a "no relevant domain" answer.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::config::AgentConfig;
use super::outcome::RouteSet;
use super::prompt::build_router_prompt;
use super::provider::LlmProvider;
use super::traits::{Agent, AgentResponse};
use crate::error::AgentError;
use crate::registry::DomainRegistry;

/// Agent that classifies questions into relevant knowledge domains.
///
/// Returns a structured JSON list of domain identifiers; identifiers
/// outside the registry's closed set are dropped.
pub struct RouterAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl RouterAgent {
    /// Creates a new router agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.router_model.clone(),
            max_tokens: config.router_max_tokens,
            system_prompt,
        }
    }

    /// Classifies the question against the registry's domain set.
    ///
    /// A malformed model response yields an empty [`RouteSet`] (logged,
    /// never raised). Unknown domain identifiers are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] only on provider (transport) failure: a
    /// generation failure is fatal for the run, a parse failure is not.
    pub async fn classify(
        &self,
        provider: &dyn LlmProvider,
        registry: &DomainRegistry,
        question: &str,
    ) -> Result<(RouteSet, AgentResponse), AgentError> {
        let user_msg = build_router_prompt(question, registry);
        let response = self.execute(provider, &user_msg).await?;

        let routes = match Self::parse_routes(&response.content) {
            Ok(candidates) => {
                let (routes, unknown) = RouteSet::from_candidates(candidates, registry);
                if !unknown.is_empty() {
                    debug!(?unknown, "router returned unknown domain identifiers");
                }
                routes
            }
            Err(e) => {
                warn!(error = %e, "router response not parseable, routing to no domain");
                RouteSet::empty()
            }
        };

        Ok((routes, response))
    }

    /// Parses the agent's JSON response into candidate domain identifiers.
    ///
    /// Accepts a `{"domains": [...]}` wrapper, a bare string array, or a
    /// single bare string, with or without markdown code fences.
    fn parse_routes(content: &str) -> Result<Vec<String>, AgentError> {
        let trimmed = content.trim();

        // Handle markdown code blocks
        let json_str = if trimmed.starts_with("```") {
            trimmed
                .trim_start_matches("```json")
                .trim_start_matches("```")
                .trim_end_matches("```")
                .trim()
        } else {
            trimmed
        };

        #[derive(serde::Deserialize)]
        struct Wrapper {
            domains: Vec<String>,
        }

        if let Ok(wrapper) = serde_json::from_str::<Wrapper>(json_str) {
            return Ok(wrapper.domains);
        }

        if let Ok(list) = serde_json::from_str::<Vec<String>>(json_str) {
            return Ok(list);
        }

        if let Ok(single) = serde_json::from_str::<String>(json_str) {
            return Ok(vec![single]);
        }

        // Char-based truncation: a byte slice could split a multi-byte
        // character and panic on non-ASCII replies.
        let preview: String = json_str.chars().take(200).collect();
        Err(AgentError::ResponseParse {
            message: format!(
                "expected {{\"domains\": [...]}} or a string array, got: {preview:?}"
            ),
            content: content.to_string(),
        })
    }
}

#[async_trait]
impl Agent for RouterAgent {
    fn name(&self) -> &'static str {
        "router"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn json_mode(&self) -> bool {
        true
    }

    fn temperature(&self) -> f32 {
        0.0
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
