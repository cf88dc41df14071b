//! Combiner agent: fan-in synthesis.
//!
//! Takes the specialist answers accumulated at the join point and
//! produces one coherent final answer. The combiner is a pass-through
//! template renderer plus a single model call; deduplication and
//! contradiction handling are delegated to the synthesis prompt.

use async_trait::async_trait;

use super::config::AgentConfig;
use super::outcome::DomainAnswer;
use super::prompt::build_combiner_prompt;
use super::provider::LlmProvider;
use super::traits::{Agent, AgentResponse};
use crate::error::AgentError;

/// Agent that merges specialist answers into the final response.
pub struct CombinerAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl CombinerAgent {
    /// Creates a new combiner agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.combiner_model.clone(),
            max_tokens: config.combiner_max_tokens,
            system_prompt,
        }
    }

    /// Synthesizes the specialist answers into one final answer.
    ///
    /// Answers are consumed in accumulation order; the combiner makes no
    /// assumption about correspondence with route order.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on generation failure (fatal for the run).
    pub async fn combine(
        &self,
        provider: &dyn LlmProvider,
        question: &str,
        answers: &[DomainAnswer],
    ) -> Result<(String, AgentResponse), AgentError> {
        let user_msg = build_combiner_prompt(question, answers);
        let response = self.execute(provider, &user_msg).await?;
        let content = response.content.clone();
        Ok((content, response))
    }
}

#[async_trait]
impl Agent for CombinerAgent {
    fn name(&self) -> &'static str {
        "combiner"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn json_mode(&self) -> bool {
        false
    }

    fn temperature(&self) -> f32 {
        0.1
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
