//! Domain-routed query pipeline.
//!
//! Provides an LLM-powered workflow that classifies a question into
//! knowledge domains, fans out retrieval-augmented specialists, and
//! synthesizes one final answer. Uses a pluggable provider abstraction
//! backed by OpenAI-compatible APIs.
//!
//! # Architecture
//!
//! ```text
//! User question → Orchestrator
//!   ├── RouterAgent (classifies into domains from the registry)
//!   ├── Fan-out → one concurrent SpecialistAgent per routed domain
//!   │   └── Each retrieves top-k passages → grounded DomainAnswer
//!   ├── Join (wait for all routed specialists)
//!   └── CombinerAgent → final answer
//! ```

pub mod client;
pub mod combiner;
pub mod config;
pub mod message;
pub mod orchestrator;
pub mod outcome;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod router;
pub mod specialist;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types
pub use client::create_provider;
pub use combiner::CombinerAgent;
pub use config::{AgentConfig, FailurePolicy};
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::{NO_ANSWER_RESPONSE, Orchestrator};
pub use outcome::{DomainAnswer, QueryOutcome, RouteSet};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use router::RouterAgent;
pub use specialist::SpecialistAgent;
pub use traits::{Agent, AgentResponse};
