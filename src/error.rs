//! Error types for the query pipeline.
//!
//! One taxonomy covers configuration, routing, retrieval, generation,
//! and orchestration failures. Classification parse failures are a
//! special case: the router recovers them locally (empty route set)
//! rather than letting them escape the run.

use thiserror::Error;

/// Errors raised by the agent pipeline.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was provided via builder or environment.
    #[error("API key missing: set OPENAI_API_KEY or QROUTE_API_KEY")]
    ApiKeyMissing,

    /// The configured provider name has no implementation.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Provider name that failed to resolve.
        name: String,
    },

    /// An LLM API request failed (network, auth, rate limit).
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Provider error description.
        message: String,
        /// HTTP status code, when the transport surfaced one.
        status: Option<u16>,
    },

    /// A model response was not in the expected structured form.
    #[error("response parse failed: {message}")]
    ResponseParse {
        /// What failed to parse and why.
        message: String,
        /// Raw response content, kept for diagnostics.
        content: String,
    },

    /// A domain retriever call failed.
    #[error("retrieval failed for domain '{domain}': {message}")]
    Retrieval {
        /// Domain whose retriever failed.
        domain: String,
        /// Retriever error description.
        message: String,
    },

    /// A registry domain has no registered retriever.
    #[error("no retriever registered for domain '{domain}'")]
    MissingRetriever {
        /// Domain identifier lacking a retriever.
        domain: String,
    },

    /// An external call exceeded the configured timeout.
    #[error("{operation} timed out after {secs}s")]
    Timeout {
        /// Operation that timed out (e.g. `"specialist 'hr'"`).
        operation: String,
        /// Configured timeout in seconds.
        secs: u64,
    },

    /// Domain registry construction or loading failed.
    #[error("registry error: {message}")]
    Registry {
        /// Validation or I/O description.
        message: String,
    },

    /// The caller's question was rejected before any upstream call.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Validation failure description.
        message: String,
    },

    /// Pipeline coordination failure (spawn or join).
    #[error("orchestration error: {message}")]
    Orchestration {
        /// Failure description.
        message: String,
    },
}
