//! Domain specialist agent: retrieval-augmented answering.
//!
//! One specialist is instantiated per routed domain. It retrieves the
//! top-k passages from its domain's retriever, folds them into a single
//! context block, and asks the model under that domain's grounding
//! prompt. Zero retrieved passages still produce a model call with an
//! empty context block; the grounding prompt contract makes the model
//! report "not covered" instead of hallucinating.

use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;

use super::config::AgentConfig;
use super::outcome::DomainAnswer;
use super::prompt::{build_specialist_prompt, join_passages};
use super::provider::LlmProvider;
use super::traits::Agent;
use crate::error::AgentError;
use crate::registry::DomainSpec;
use crate::retrieval::Retriever;

/// Agent that answers a question for one knowledge domain.
///
/// Bound at construction to its domain's grounding prompt; a specialist
/// can never run under another domain's instructions.
pub struct SpecialistAgent {
    domain_id: String,
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl SpecialistAgent {
    /// Creates a specialist bound to the given domain spec.
    #[must_use]
    pub fn from_spec(config: &AgentConfig, spec: &DomainSpec) -> Self {
        Self {
            domain_id: spec.id.clone(),
            model: config.specialist_model.clone(),
            max_tokens: config.specialist_max_tokens,
            system_prompt: spec.grounding_prompt.clone(),
        }
    }

    /// Domain this specialist is bound to.
    #[must_use]
    pub fn domain_id(&self) -> &str {
        &self.domain_id
    }

    /// Retrieves context and generates this domain's answer.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Retrieval`] when the retriever fails and
    /// [`AgentError::ApiRequest`] when generation fails; both are fatal
    /// for this specialist's execution (the run's failure policy decides
    /// what happens next).
    pub async fn answer(
        &self,
        provider: &dyn LlmProvider,
        retriever: &dyn Retriever,
        question: &str,
        top_k: usize,
    ) -> Result<DomainAnswer, AgentError> {
        let start = Instant::now();

        let passages = retriever
            .search(question, top_k)
            .await
            .map_err(|e| match e {
                already @ AgentError::Retrieval { .. } => already,
                other => AgentError::Retrieval {
                    domain: self.domain_id.clone(),
                    message: other.to_string(),
                },
            })?;

        debug!(
            domain = %self.domain_id,
            passages = passages.len(),
            "specialist retrieved context"
        );

        let context = join_passages(&passages);
        let user_msg = build_specialist_prompt(question, &context);
        let response = self.execute(provider, &user_msg).await?;

        Ok(DomainAnswer {
            domain: self.domain_id.clone(),
            answer: response.content,
            passages_used: passages.len(),
            usage: response.usage,
            elapsed: start.elapsed(),
        })
    }
}

#[async_trait]
impl Agent for SpecialistAgent {
    fn name(&self) -> &'static str {
        "specialist"
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
        0.0
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
