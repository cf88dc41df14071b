//! Orchestrator for the routed fan-out/fan-in query pipeline.
//!
//! Coordinates the full run: router classification → conditional
//! fan-out of domain specialists → join → combiner synthesis. The graph
//! is expressed as explicit spawned tasks with a wait-for-all barrier
//! rather than a graph-execution framework: one task per routed domain,
//! collected before the combiner runs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::debug;

use super::combiner::CombinerAgent;
use super::config::{AgentConfig, FailurePolicy};
use super::outcome::{DomainAnswer, QueryOutcome, RouteSet};
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use super::router::RouterAgent;
use super::specialist::SpecialistAgent;
use crate::error::AgentError;
use crate::registry::DomainRegistry;
use crate::retrieval::RetrieverSet;

/// Final answer used when no domain matched the question.
///
/// Produced without a combiner call: with an empty answer block there is
/// nothing to synthesize, and a fixed response keeps the empty-route
/// path deterministic.
pub const NO_ANSWER_RESPONSE: &str =
    "No relevant information was found for this question in the available knowledge domains.";

/// Maximum accepted question length in bytes.
const MAX_QUESTION_LEN: usize = 10_000;

/// Orchestrates one query run through router, specialists, and combiner.
///
/// Holds only immutable, shareable services: the provider and the
/// retrievers are stateless and reentrant, the registry and config are
/// read-only after construction. Every run gets its own state; nothing
/// is shared between concurrent runs.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<DomainRegistry>,
    retrievers: RetrieverSet,
    config: AgentConfig,
    prompts: PromptSet,
}

impl Orchestrator {
    /// Creates a new orchestrator and validates the wiring.
    ///
    /// Loads router/combiner prompt overrides from
    /// [`AgentConfig::prompt_dir`], falling back to compiled-in
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::MissingRetriever`] when a registry domain
    /// has no registered retriever.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: Arc<DomainRegistry>,
        retrievers: RetrieverSet,
        config: AgentConfig,
    ) -> Result<Self, AgentError> {
        retrievers.ensure_coverage(&registry)?;
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Ok(Self {
            provider,
            registry,
            retrievers,
            config,
            prompts,
        })
    }

    /// Executes the full query pipeline.
    ///
    /// # Steps
    ///
    /// 1. Classify the question into routed domains ([`RouterAgent`])
    /// 2. Snapshot the route set; empty routes short-circuit to a
    ///    "not found" answer with no specialist executed
    /// 3. Fan out one specialist task per routed domain
    /// 4. Join: await all (and only) the scheduled specialists
    /// 5. Synthesize the final answer ([`CombinerAgent`])
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidInput`] for an empty or oversized
    /// question, and [`AgentError`] on router or combiner generation
    /// failure and on specialist failure according to the configured
    /// [`FailurePolicy`].
    pub async fn run(&self, question: &str) -> Result<QueryOutcome, AgentError> {
        if question.trim().is_empty() {
            return Err(AgentError::InvalidInput {
                message: "question cannot be empty".to_string(),
            });
        }

        if question.len() > MAX_QUESTION_LEN {
            return Err(AgentError::InvalidInput {
                message: format!(
                    "question exceeds maximum length ({} bytes, max {MAX_QUESTION_LEN})",
                    question.len()
                ),
            });
        }

        let start = Instant::now();
        let mut total_tokens: u32 = 0;

        // Step 1: classify. The route set snapshot taken here determines
        // which specialists are scheduled and awaited; later decisions
        // cannot change it.
        let router = RouterAgent::new(&self.config, self.prompts.router.clone());
        let (routes, router_response) = Self::with_timeout(
            "router",
            self.config.timeout,
            router.classify(&*self.provider, &self.registry, question),
        )
        .await?;
        total_tokens = total_tokens.saturating_add(router_response.usage.total_tokens);

        debug!(routes = ?routes.iter().collect::<Vec<_>>(), "router classified question");

        // Step 2: empty routes short-circuit. No specialist runs, not
        // even with empty input.
        if routes.is_empty() {
            return Ok(QueryOutcome {
                question: question.to_string(),
                routes,
                answers: Vec::new(),
                final_answer: NO_ANSWER_RESPONSE.to_string(),
                specialists_failed: 0,
                specialist_errors: Vec::new(),
                total_tokens,
                elapsed: start.elapsed(),
            });
        }

        // Steps 3–4: conditional fan-out and join.
        let (answers, specialist_errors) = self.fan_out(question, &routes).await?;
        for answer in &answers {
            total_tokens = total_tokens.saturating_add(answer.usage.total_tokens);
        }

        debug!(
            answers = answers.len(),
            failed = specialist_errors.len(),
            "join complete"
        );

        // Step 5: synthesize.
        let combiner = CombinerAgent::new(&self.config, self.prompts.combiner.clone());
        let (final_answer, combine_response) = Self::with_timeout(
            "combiner",
            self.config.timeout,
            combiner.combine(&*self.provider, question, &answers),
        )
        .await?;
        total_tokens = total_tokens.saturating_add(combine_response.usage.total_tokens);

        Ok(QueryOutcome {
            question: question.to_string(),
            routes,
            answers,
            final_answer,
            specialists_failed: specialist_errors.len(),
            specialist_errors,
            total_tokens,
            elapsed: start.elapsed(),
        })
    }

    /// Fans out one specialist task per routed domain and joins them.
    ///
    /// Returns the accumulated answers plus error descriptions from
    /// failed specialists (best-effort policy). Under fail-fast, the
    /// first failure aborts the remaining in-flight tasks and the error
    /// propagates.
    async fn fan_out(
        &self,
        question: &str,
        routes: &RouteSet,
    ) -> Result<(Vec<DomainAnswer>, Vec<String>), AgentError> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut handles = Vec::with_capacity(routes.len());

        for domain_id in routes.iter() {
            let Some(spec) = self.registry.get(domain_id).cloned() else {
                return Err(AgentError::Orchestration {
                    message: format!("routed domain '{domain_id}' missing from registry"),
                });
            };
            let Some(retriever) = self.retrievers.get(domain_id) else {
                return Err(AgentError::MissingRetriever {
                    domain: domain_id.to_string(),
                });
            };

            let sem = Arc::clone(&semaphore);
            let provider = Arc::clone(&self.provider);
            let config = self.config.clone();
            let question = question.to_string();
            let timeout = self.config.timeout;
            let request_delay = self.config.request_delay;

            let handle = tokio::spawn(async move {
                let _permit = sem.acquire().await.map_err(|e| AgentError::Orchestration {
                    message: format!("semaphore acquire failed: {e}"),
                })?;

                if !request_delay.is_zero() {
                    tokio::time::sleep(request_delay).await;
                }

                let specialist = SpecialistAgent::from_spec(&config, &spec);
                let operation = format!("specialist '{}'", specialist.domain_id());
                Self::with_timeout(
                    &operation,
                    timeout,
                    specialist.answer(&*provider, &*retriever, &question, config.retrieve_top_k),
                )
                .await
            });

            handles.push(handle);
        }

        // Join barrier: every scheduled specialist is awaited, and only
        // scheduled ones exist.
        let fail_fast = self.config.failure_policy == FailurePolicy::FailFast;
        let mut answers = Vec::with_capacity(handles.len());
        let mut errors = Vec::new();
        let mut pending = handles.into_iter();

        while let Some(handle) = pending.next() {
            let result = handle.await.unwrap_or_else(|e| {
                Err(AgentError::Orchestration {
                    message: format!("specialist task join failed: {e}"),
                })
            });

            match result {
                Ok(answer) => answers.push(answer),
                Err(e) if fail_fast => {
                    // Run-level cancellation: stop the in-flight siblings.
                    for remaining in pending {
                        remaining.abort();
                    }
                    return Err(e);
                }
                Err(e) => errors.push(e.to_string()),
            }
        }

        if answers.is_empty() {
            return Err(AgentError::Orchestration {
                message: format!("all specialists failed: {}", errors.join("; ")),
            });
        }

        Ok((answers, errors))
    }

    /// Wraps an external call in the configured per-call timeout.
    async fn with_timeout<T>(
        operation: &str,
        timeout: Duration,
        fut: impl Future<Output = Result<T, AgentError>>,
    ) -> Result<T, AgentError> {
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::Timeout {
                operation: operation.to_string(),
                secs: timeout.as_secs(),
            }),
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("registry", &self.registry.ids())
            .field("retrievers", &self.retrievers)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
