//! HTTP front-end for the query pipeline (feature `serve`).
//!
//! Exposes a single `POST /query` endpoint over an [`Orchestrator`].
//! Input validation failures map to `400`, upstream provider and
//! pipeline failures map to `502`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::agent::Orchestrator;
use crate::error::AgentError;

/// Request body for `POST /query`.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// The question to route and answer.
    pub question: String,
}

/// One specialist's contribution in the response body.
#[derive(Debug, Serialize)]
pub struct DomainAnswerBody {
    /// Domain that produced the answer.
    pub domain: String,
    /// The specialist's grounded answer.
    pub answer: String,
    /// Passages retrieved for the answer.
    pub passages_used: usize,
}

/// Response body for `POST /query`.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    /// Synthesized final answer.
    pub answer: String,
    /// Domains the question was routed to.
    pub routes: Vec<String>,
    /// Per-domain specialist answers.
    pub per_domain_answers: Vec<DomainAnswerBody>,
    /// Specialists that failed under the best-effort policy.
    pub specialists_failed: usize,
    /// Total tokens consumed by the run.
    pub total_tokens: u32,
}

/// Error body returned on failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Failure description.
    pub error: String,
}

/// Builds the HTTP router over the given orchestrator.
#[must_use]
pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/query", post(handle_query))
        .with_state(orchestrator)
}

/// Binds the listener and serves the query API until shutdown.
///
/// # Errors
///
/// Returns [`AgentError::Orchestration`] when binding or serving fails.
pub async fn serve(addr: &str, orchestrator: Arc<Orchestrator>) -> Result<(), AgentError> {
    let listener =
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AgentError::Orchestration {
                message: format!("failed to bind {addr}: {e}"),
            })?;

    info!(%addr, "query API listening");

    axum::serve(listener, router(orchestrator))
        .await
        .map_err(|e| AgentError::Orchestration {
            message: format!("server error: {e}"),
        })
}

/// Maps a pipeline error to the HTTP status it should surface as.
///
/// Only rejected input is the client's fault; everything else is an
/// upstream failure.
fn status_for(error: &AgentError) -> StatusCode {
    match error {
        AgentError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    }
}

async fn handle_query(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorBody>)> {
    let outcome = orchestrator.run(&request.question).await.map_err(|e| {
        error!(error = %e, "query failed");
        (
            status_for(&e),
            Json(ErrorBody {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(QueryResponse {
        answer: outcome.final_answer,
        routes: outcome.routes.iter().map(String::from).collect(),
        per_domain_answers: outcome
            .answers
            .into_iter()
            .map(|a| DomainAnswerBody {
                domain: a.domain,
                answer: a.answer,
                passages_used: a.passages_used,
            })
            .collect(),
        specialists_failed: outcome.specialists_failed,
        total_tokens: outcome.total_tokens,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_deserializes() {
        let parsed: Result<QueryRequest, _> =
            serde_json::from_str(r#"{"question": "What is the vacation policy?"}"#);
        assert!(parsed.is_ok_and(|r| r.question == "What is the vacation policy?"));
    }

    #[test]
    fn test_status_mapping() {
        let invalid = AgentError::InvalidInput {
            message: "question cannot be empty".to_string(),
        };
        assert_eq!(status_for(&invalid), StatusCode::BAD_REQUEST);

        let upstream = AgentError::ApiRequest {
            message: "rate limited".to_string(),
            status: Some(429),
        };
        assert_eq!(status_for(&upstream), StatusCode::BAD_GATEWAY);

        // A coordination failure mentioning the word "question" is still
        // an upstream failure, not a client error.
        let join = AgentError::Orchestration {
            message: "specialist task for question join failed".to_string(),
        };
        assert_eq!(status_for(&join), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_query_response_serializes() {
        let response = QueryResponse {
            answer: "25 days".to_string(),
            routes: vec!["hr".to_string()],
            per_domain_answers: vec![DomainAnswerBody {
                domain: "hr".to_string(),
                answer: "25 days".to_string(),
                passages_used: 2,
            }],
            specialists_failed: 0,
            total_tokens: 42,
        };
        let json = serde_json::to_string(&response).unwrap_or_default();
        assert!(json.contains("\"routes\":[\"hr\"]"));
        assert!(json.contains("\"passages_used\":2"));
    }
}
