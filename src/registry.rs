//! Domain registry: the closed set of knowledge domains.
//!
//! Each domain pairs an identifier with a one-line description (used by
//! the router's classification prompt) and a grounding prompt template
//! (used as its specialist's system prompt). The registry is built once
//! at startup and immutable thereafter; every route decision is
//! validated against it.

use std::path::Path;

use serde::Deserialize;

use crate::error::AgentError;

/// Configuration for a single knowledge domain.
///
/// Each domain binds to its own grounding prompt. Specialists are
/// constructed from the spec they serve, so a specialist answering for
/// one domain can never be fed another domain's instructions.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainSpec {
    /// Stable identifier, referenced by router output and retriever wiring.
    pub id: String,
    /// One-line description shown to the router's classification prompt.
    pub description: String,
    /// System prompt that grounds this domain's specialist in retrieved context.
    pub grounding_prompt: String,
}

/// TOML file shape: a list of `[[domain]]` tables.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    domain: Vec<DomainSpec>,
}

/// Closed, ordered, immutable set of domains known to the pipeline.
#[derive(Debug, Clone)]
pub struct DomainRegistry {
    domains: Vec<DomainSpec>,
}

impl DomainRegistry {
    /// Creates a registry from domain specs, validating the set.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Registry`] when the set is empty, an id is
    /// duplicated, or any field is blank.
    pub fn new(domains: Vec<DomainSpec>) -> Result<Self, AgentError> {
        if domains.is_empty() {
            return Err(AgentError::Registry {
                message: "registry requires at least one domain".to_string(),
            });
        }

        for spec in &domains {
            if spec.id.trim().is_empty() {
                return Err(AgentError::Registry {
                    message: "domain id cannot be blank".to_string(),
                });
            }
            if spec.description.trim().is_empty() {
                return Err(AgentError::Registry {
                    message: format!("domain '{}' has a blank description", spec.id),
                });
            }
            if spec.grounding_prompt.trim().is_empty() {
                return Err(AgentError::Registry {
                    message: format!("domain '{}' has a blank grounding prompt", spec.id),
                });
            }
        }

        for (i, spec) in domains.iter().enumerate() {
            if domains[..i].iter().any(|d| d.id == spec.id) {
                return Err(AgentError::Registry {
                    message: format!("duplicate domain id '{}'", spec.id),
                });
            }
        }

        Ok(Self { domains })
    }

    /// The compiled-in reference deployment: three domains with
    /// distinct grounding prompts.
    #[must_use]
    pub fn reference() -> Self {
        use crate::agent::prompt::{
            HR_GROUNDING_PROMPT, PROCESSES_GROUNDING_PROMPT, PRODUCTS_GROUNDING_PROMPT,
        };

        Self {
            domains: vec![
                DomainSpec {
                    id: "products".to_string(),
                    description: "Product catalog: offerings, features, pricing, and availability"
                        .to_string(),
                    grounding_prompt: PRODUCTS_GROUNDING_PROMPT.to_string(),
                },
                DomainSpec {
                    id: "processes".to_string(),
                    description:
                        "Internal processes: workflows, approvals, and operating procedures"
                            .to_string(),
                    grounding_prompt: PROCESSES_GROUNDING_PROMPT.to_string(),
                },
                DomainSpec {
                    id: "hr".to_string(),
                    description:
                        "Human resources: policies, benefits, leave, and employment terms"
                            .to_string(),
                    grounding_prompt: HR_GROUNDING_PROMPT.to_string(),
                },
            ],
        }
    }

    /// Parses a registry from TOML text (`[[domain]]` tables).
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Registry`] on parse or validation failure.
    pub fn from_toml_str(text: &str) -> Result<Self, AgentError> {
        let file: RegistryFile = toml::from_str(text).map_err(|e| AgentError::Registry {
            message: format!("failed to parse registry TOML: {e}"),
        })?;
        Self::new(file.domain)
    }

    /// Loads a registry from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Registry`] on read, parse, or validation failure.
    pub fn from_toml_path(path: &Path) -> Result<Self, AgentError> {
        let text = std::fs::read_to_string(path).map_err(|e| AgentError::Registry {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&text)
    }

    /// Looks up a domain spec by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DomainSpec> {
        self.domains.iter().find(|d| d.id == id)
    }

    /// Returns `true` if the id belongs to the closed set.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterates domains in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &DomainSpec> {
        self.domains.iter()
    }

    /// Domain identifiers in registry order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.domains.iter().map(|d| d.id.as_str()).collect()
    }

    /// Number of domains in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Returns `true` for an empty set (never constructible via [`Self::new`]).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
