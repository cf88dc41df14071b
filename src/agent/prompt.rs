//! System prompts and template builders for agents.
//!
//! Prompts are the core instructions that define each agent's behavior.
//! The router and combiner prompts are shared across deployments and can
//! be overridden from a prompt directory; grounding prompts are bound
//! per domain through the [`DomainRegistry`](crate::registry::DomainRegistry).

use std::fmt::Write;
use std::path::Path;

use super::outcome::DomainAnswer;
use crate::registry::DomainRegistry;

/// Separator between retrieved passages in a specialist's context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Separator between specialist answers in the combiner's input block.
pub const ANSWER_SEPARATOR: &str = "\n\n=====\n\n";

/// System prompt for the router (classification) agent.
pub const ROUTER_SYSTEM_PROMPT: &str = r#"You are a routing classifier for a knowledge assistant. Given a user question and a list of knowledge domains, decide which domains are relevant to answering the question.

## Instructions

1. Read the question and every domain description.
2. Select every domain whose knowledge base could contribute to the answer. A question may span multiple domains, one domain, or none.
3. Do not guess: if no domain plausibly covers the question, return an empty list.

## Output Format (JSON)

Return a JSON object with a single key:
```json
{"domains": ["<domain-id>", "<domain-id>"]}
```

## Rules

- Use only domain identifiers from the provided list, exactly as written.
- Return an empty list (`{"domains": []}`) when nothing matches.
- Return ONLY the JSON object, no surrounding text."#;

/// System prompt for the combiner (synthesis) agent.
pub const COMBINER_SYSTEM_PROMPT: &str = r"You are a synthesis assistant. You merge answers produced by domain specialists into one final response for the user.

## Instructions

1. Read the user's question and every specialist answer.
2. Write a single coherent answer that addresses the question directly.
3. When specialist answers overlap, state the shared fact once instead of restating it per domain.
4. When specialist answers contradict each other, present both positions and attribute each to its domain.
5. When a specialist reports that its knowledge base does not cover the question, omit that non-answer unless every specialist reports the same, in which case say that no relevant information was found.
6. If the answers block is empty, reply exactly that no relevant information was found for the question.

## Rules

- Use only information present in the specialist answers. Do not add outside knowledge.
- Keep the answer focused; do not describe the pipeline or mention specialists unless attributing a contradiction.
- Answer in the language of the question.";

/// Grounding prompt for the reference `products` domain.
pub const PRODUCTS_GROUNDING_PROMPT: &str = r"You are a product knowledge specialist. Answer the user's question using ONLY the product documentation supplied in the context block: offerings, features, pricing, and availability.

## Rules

- Ground every statement in the supplied context; quote product names, figures, and terms as written.
- If the context does not contain the information needed, reply that the product documentation provided does not cover the question. Do not answer from general knowledge.
- Do not speculate about unreleased products or unstated prices.";

/// Grounding prompt for the reference `processes` domain.
pub const PROCESSES_GROUNDING_PROMPT: &str = r"You are an internal process specialist. Answer the user's question using ONLY the process documentation supplied in the context block: workflows, approval chains, and operating procedures.

## Rules

- Ground every statement in the supplied context; preserve step ordering, role names, and approval thresholds exactly as documented.
- If the context does not contain the information needed, reply that the process documentation provided does not cover the question. Do not answer from general knowledge.
- Do not invent steps, owners, or exceptions that the documentation does not state.";

/// Grounding prompt for the reference `hr` domain.
pub const HR_GROUNDING_PROMPT: &str = r"You are a human resources specialist. Answer the user's question using ONLY the HR documentation supplied in the context block: policies, benefits, leave, and employment terms.

## Rules

- Ground every statement in the supplied context; quote entitlements, day counts, and eligibility conditions as written.
- If the context does not contain the information needed, reply that the HR documentation provided does not cover the question. Do not answer from general knowledge.
- Do not generalize a policy beyond the conditions the documentation states.";

/// Default prompt directory under user config.
const DEFAULT_PROMPT_DIR: &str = ".config/qroute-rs/prompts";

/// Filename for the router prompt template.
const ROUTER_FILENAME: &str = "router.md";
/// Filename for the combiner prompt template.
const COMBINER_FILENAME: &str = "combiner.md";

/// Shared system prompts for the router and combiner agents.
///
/// Loaded from external template files when available, falling back to
/// compiled-in defaults. Domain grounding prompts are not part of this
/// set; they live in the registry, one per domain.
#[derive(Debug, Clone)]
pub struct PromptSet {
    /// System prompt for the router agent.
    pub router: String,
    /// System prompt for the combiner agent.
    pub combiner: String,
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Resolution order for the directory:
    /// 1. Explicit `prompt_dir` argument (from [`AgentConfig::prompt_dir`](super::config::AgentConfig::prompt_dir))
    /// 2. `QROUTE_PROMPT_DIR` environment variable
    /// 3. `~/.config/qroute-rs/prompts/`
    ///
    /// Each file is loaded independently; a missing file uses its default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(std::path::PathBuf::from)
            .or_else(|| {
                std::env::var("QROUTE_PROMPT_DIR")
                    .ok()
                    .map(std::path::PathBuf::from)
            })
            .or_else(|| dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR)));

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(&path).ok())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            router: load_file(ROUTER_FILENAME, ROUTER_SYSTEM_PROMPT),
            combiner: load_file(COMBINER_FILENAME, COMBINER_SYSTEM_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            router: ROUTER_SYSTEM_PROMPT.to_string(),
            combiner: COMBINER_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten; use this for initial scaffolding only.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<std::path::PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (ROUTER_FILENAME, ROUTER_SYSTEM_PROMPT),
            (COMBINER_FILENAME, COMBINER_SYSTEM_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }
}

/// Builds the user message for the router agent.
///
/// Enumerates every registry domain with its one-line description so the
/// model can classify against the closed set.
#[must_use]
pub fn build_router_prompt(question: &str, registry: &DomainRegistry) -> String {
    let mut prompt = String::from("<domains>\n");
    for spec in registry.iter() {
        let _ = writeln!(prompt, "- {}: {}", spec.id, spec.description);
    }
    prompt.push_str("</domains>\n\n");
    let _ = write!(prompt, "<question>{question}</question>");
    prompt
}

/// Builds the user message for a specialist agent from the question and
/// its retrieved context block.
///
/// The context block may be empty; the grounding prompt contract makes
/// the model report "not covered" instead of answering from general
/// knowledge.
#[must_use]
pub fn build_specialist_prompt(question: &str, context: &str) -> String {
    format!("<context>\n{context}\n</context>\n\n<question>{question}</question>")
}

/// Joins retrieved passages into one context block.
#[must_use]
pub fn join_passages(passages: &[crate::retrieval::Passage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Builds the user message for the combiner agent.
///
/// Answers are rendered in accumulation order, each labeled with its
/// domain. The combiner must not assume any correspondence between this
/// order and the router's route order.
#[must_use]
pub fn build_combiner_prompt(question: &str, answers: &[DomainAnswer]) -> String {
    let mut block = String::new();
    for answer in answers {
        if !block.is_empty() {
            block.push_str(ANSWER_SEPARATOR);
        }
        let _ = write!(
            block,
            "<answer domain=\"{}\">\n{}\n</answer>",
            answer.domain, answer.answer
        );
    }

    format!(
        "<question>{question}</question>\n\n\
         <answers>\n{block}\n</answers>\n\n\
         Merge the specialist answers into one final response."
    )
}
