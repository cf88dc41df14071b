//! Retriever seam: per-domain passage search.
//!
//! Retrieval is an external capability to this crate: "given a query
//! and a domain, return the top-k relevant passages." Implementations
//! wrap whatever index the deployment uses (vector store, BM25, a SaaS
//! search API). They are treated as stateless, safely-shared services:
//! the pipeline holds them behind `Arc` and never locks around them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::registry::DomainRegistry;

/// A retrieved text passage with optional provenance metadata.
#[derive(Debug, Clone)]
pub struct Passage {
    /// Passage text.
    pub text: String,
    /// Source identifier (document name, URL), when the provider has one.
    pub source: Option<String>,
    /// Similarity score by the provider's own metric, when available.
    pub score: Option<f32>,
}

impl Passage {
    /// Creates a passage with no metadata.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
            score: None,
        }
    }
}

/// Trait for domain knowledge retrievers.
///
/// `search` returns passages ordered most-relevant-first by the
/// provider's own similarity metric. An empty result is not an error:
/// the specialist still runs with an empty context block.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retriever name for logging.
    fn name(&self) -> &str;

    /// Searches for the top-`k` passages relevant to `query`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Retrieval`] on provider failure.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, AgentError>;
}

/// Maps domain identifiers to their retriever instances (1:1 per the
/// registry).
#[derive(Default, Clone)]
pub struct RetrieverSet {
    retrievers: HashMap<String, Arc<dyn Retriever>>,
}

impl RetrieverSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a retriever for a domain, replacing any existing one.
    #[must_use]
    pub fn with(mut self, domain_id: impl Into<String>, retriever: Arc<dyn Retriever>) -> Self {
        self.retrievers.insert(domain_id.into(), retriever);
        self
    }

    /// Looks up the retriever for a domain.
    #[must_use]
    pub fn get(&self, domain_id: &str) -> Option<Arc<dyn Retriever>> {
        self.retrievers.get(domain_id).cloned()
    }

    /// Verifies every registry domain has a registered retriever.
    ///
    /// Called at orchestrator construction so wiring gaps surface at
    /// startup instead of mid-run.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::MissingRetriever`] naming the first
    /// uncovered domain.
    pub fn ensure_coverage(&self, registry: &DomainRegistry) -> Result<(), AgentError> {
        for spec in registry.iter() {
            if !self.retrievers.contains_key(&spec.id) {
                return Err(AgentError::MissingRetriever {
                    domain: spec.id.clone(),
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for RetrieverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut domains: Vec<&str> = self.retrievers.keys().map(String::as_str).collect();
        domains.sort_unstable();
        f.debug_struct("RetrieverSet")
            .field("domains", &domains)
            .finish()
    }
}

/// In-memory retriever over a fixed passage list, ranked by naive term
/// overlap with the query.
///
/// Useful for tests and small embedding-free deployments. Production
/// deployments implement [`Retriever`] over a real index instead.
#[derive(Debug, Clone, Default)]
pub struct StaticRetriever {
    name: String,
    passages: Vec<Passage>,
}

impl StaticRetriever {
    /// Creates a static retriever over the given passages.
    #[must_use]
    pub fn new(name: impl Into<String>, passages: Vec<Passage>) -> Self {
        Self {
            name: name.into(),
            passages,
        }
    }

    /// Number of query terms (lowercased, whitespace-split) found in the text.
    fn overlap(query: &str, text: &str) -> usize {
        let haystack = text.to_lowercase();
        query
            .to_lowercase()
            .split_whitespace()
            .filter(|term| haystack.contains(term))
            .count()
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, AgentError> {
        let mut scored: Vec<(usize, &Passage)> = self
            .passages
            .iter()
            .map(|p| (Self::overlap(query, &p.text), p))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(score, p)| {
                let mut passage = p.clone();
                #[allow(clippy::cast_precision_loss)]
                {
                    passage.score = Some(score as f32);
                }
                passage
            })
            .collect())
    }
}
