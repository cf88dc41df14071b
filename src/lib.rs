//! qroute-rs: domain-routed retrieval-augmented question answering.
//!
//! A question is classified by a router agent into a closed set of
//! knowledge domains, each routed domain runs a retrieval-augmented
//! specialist concurrently, and a combiner agent synthesizes the
//! specialist answers into one final response.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use qroute_rs::agent::{AgentConfig, Orchestrator, create_provider};
//! use qroute_rs::registry::DomainRegistry;
//! use qroute_rs::retrieval::{Passage, Retriever, RetrieverSet, StaticRetriever};
//!
//! # async fn run() -> Result<(), qroute_rs::error::AgentError> {
//! let config = AgentConfig::from_env()?;
//! let provider = create_provider(&config)?;
//! let registry = Arc::new(DomainRegistry::reference());
//!
//! let retrievers = RetrieverSet::new()
//!     .with(
//!         "products",
//!         Arc::new(StaticRetriever::new(
//!             "products-index",
//!             vec![Passage::new("The Pro plan costs 40 per seat per month.")],
//!         )) as Arc<dyn Retriever>,
//!     )
//!     .with(
//!         "processes",
//!         Arc::new(StaticRetriever::new("processes-index", Vec::new())) as Arc<dyn Retriever>,
//!     )
//!     .with(
//!         "hr",
//!         Arc::new(StaticRetriever::new("hr-index", Vec::new())) as Arc<dyn Retriever>,
//!     );
//!
//! let orchestrator = Orchestrator::new(provider, registry, retrievers, config)?;
//! let outcome = orchestrator.run("What does the Pro plan cost?").await?;
//! println!("{}", outcome.final_answer);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod error;
pub mod registry;
pub mod retrieval;

#[cfg(feature = "serve")]
pub mod serve;

pub use agent::{AgentConfig, Orchestrator, QueryOutcome, create_provider};
pub use error::AgentError;
pub use registry::{DomainRegistry, DomainSpec};
pub use retrieval::{Passage, Retriever, RetrieverSet, StaticRetriever};
