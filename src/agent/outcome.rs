//! Data types for route decisions and query results.
//!
//! The pipeline threads these values functionally between stages: the
//! router produces a [`RouteSet`] snapshot, each specialist returns its
//! own [`DomainAnswer`], and the join assembles them into a
//! [`QueryOutcome`]. No stage mutates another stage's data.

use std::time::Duration;

use serde::Serialize;

use super::message::TokenUsage;
use crate::registry::DomainRegistry;

/// The router's decision: an insertion-ordered, deduplicated subset of
/// the closed domain set.
///
/// Snapshotted before fan-out; the orchestrator schedules exactly one
/// specialist per member and awaits no one else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteSet {
    domains: Vec<String>,
}

impl RouteSet {
    /// Creates an empty route set.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            domains: Vec::new(),
        }
    }

    /// Builds a route set from candidate identifiers, keeping only
    /// members of the registry's closed set and dropping duplicates.
    ///
    /// Returns the route set and the identifiers that were dropped as
    /// unknown, so the caller can log them.
    #[must_use]
    pub fn from_candidates(
        candidates: Vec<String>,
        registry: &DomainRegistry,
    ) -> (Self, Vec<String>) {
        let mut domains: Vec<String> = Vec::new();
        let mut unknown: Vec<String> = Vec::new();

        for candidate in candidates {
            if !registry.contains(&candidate) {
                unknown.push(candidate);
            } else if !domains.contains(&candidate) {
                domains.push(candidate);
            }
        }

        (Self { domains }, unknown)
    }

    /// Returns `true` if the domain is routed.
    #[must_use]
    pub fn contains(&self, domain_id: &str) -> bool {
        self.domains.iter().any(|d| d == domain_id)
    }

    /// Iterates routed domain ids in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }

    /// Number of routed domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Returns `true` when no domain matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// One specialist's answer for its domain.
#[derive(Debug, Clone, Serialize)]
pub struct DomainAnswer {
    /// Domain the specialist was bound to.
    pub domain: String,
    /// Raw model answer text.
    pub answer: String,
    /// Number of retrieved passages in the context block.
    pub passages_used: usize,
    /// Token usage for the specialist's model call.
    pub usage: TokenUsage,
    /// Elapsed time for retrieval plus generation.
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
}

/// Final result of one query run.
///
/// Created per question and discarded after use; nothing is shared
/// between runs.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    /// The question that started the run.
    pub question: String,
    /// Route decision snapshot taken before fan-out.
    pub routes: RouteSet,
    /// Specialist answers in accumulation order. This order carries no
    /// guaranteed correspondence to the route order.
    pub answers: Vec<DomainAnswer>,
    /// Synthesized final answer.
    pub final_answer: String,
    /// Specialists that failed (best-effort policy only; fail-fast runs
    /// never produce an outcome with failures).
    pub specialists_failed: usize,
    /// Error descriptions from failed specialists.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub specialist_errors: Vec<String>,
    /// Total tokens consumed across router, specialists, and combiner.
    pub total_tokens: u32,
    /// Total elapsed time for the run.
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_duration<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_f64(d.as_secs_f64())
}
