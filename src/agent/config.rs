//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AgentError;

/// Default passages retrieved per specialist.
const DEFAULT_RETRIEVE_TOP_K: usize = 3;
/// Default maximum concurrent specialist tasks.
const DEFAULT_MAX_CONCURRENCY: usize = 8;
/// Default router max tokens. Classification output is a short JSON list.
const DEFAULT_ROUTER_MAX_TOKENS: u32 = 256;
/// Default specialist max tokens.
const DEFAULT_SPECIALIST_MAX_TOKENS: u32 = 1024;
/// Default combiner max tokens.
const DEFAULT_COMBINER_MAX_TOKENS: u32 = 2048;
/// Default per-call timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Default max retries per API request.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Policy for specialist failures during fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// First specialist failure aborts the run; in-flight siblings are
    /// cancelled and the caller receives the error instead of a partial
    /// answer.
    #[default]
    FailFast,
    /// Failed specialists are recorded and the run proceeds with the
    /// answers that succeeded. The run still fails when no specialist
    /// produced an answer.
    BestEffort,
}

impl FailurePolicy {
    /// Parses a policy name (case-insensitive). Unknown names map to
    /// the default.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "best-effort" | "best_effort" => Self::BestEffort,
            _ => Self::FailFast,
        }
    }
}

/// Configuration for the agent pipeline.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model for the router (classification) agent.
    pub router_model: String,
    /// Model for domain specialist agents.
    pub specialist_model: String,
    /// Model for the combiner (synthesis) agent.
    pub combiner_model: String,
    /// Passages retrieved per specialist (`k` in the retriever call).
    pub retrieve_top_k: usize,
    /// Maximum concurrent specialist tasks.
    pub max_concurrency: usize,
    /// Maximum tokens for router responses.
    pub router_max_tokens: u32,
    /// Maximum tokens for specialist responses.
    pub specialist_max_tokens: u32,
    /// Maximum tokens for combiner responses.
    pub combiner_max_tokens: u32,
    /// Per-call timeout applied to each model and retriever invocation.
    pub timeout: Duration,
    /// Maximum retry attempts per API request.
    pub max_retries: u32,
    /// Minimum delay between API requests per specialist task.
    ///
    /// Applied after acquiring the concurrency semaphore permit.
    /// `Duration::ZERO` (default) disables rate limiting beyond what
    /// the semaphore provides.
    pub request_delay: Duration,
    /// Directory containing prompt template overrides.
    ///
    /// When set, the router and combiner system prompts are loaded from
    /// markdown files in this directory, falling back to compiled-in
    /// defaults for any missing files.
    pub prompt_dir: Option<PathBuf>,
    /// Specialist failure policy for the fan-out stage.
    pub failure_policy: FailurePolicy,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    router_model: Option<String>,
    specialist_model: Option<String>,
    combiner_model: Option<String>,
    retrieve_top_k: Option<usize>,
    max_concurrency: Option<usize>,
    router_max_tokens: Option<u32>,
    specialist_max_tokens: Option<u32>,
    combiner_max_tokens: Option<u32>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    request_delay: Option<Duration>,
    prompt_dir: Option<PathBuf>,
    failure_policy: Option<FailurePolicy>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("QROUTE_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("QROUTE_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("QROUTE_BASE_URL"))
                .ok();
        }
        if self.router_model.is_none() {
            self.router_model = std::env::var("QROUTE_ROUTER_MODEL").ok();
        }
        if self.specialist_model.is_none() {
            self.specialist_model = std::env::var("QROUTE_SPECIALIST_MODEL").ok();
        }
        if self.combiner_model.is_none() {
            self.combiner_model = std::env::var("QROUTE_COMBINER_MODEL").ok();
        }
        if self.retrieve_top_k.is_none() {
            self.retrieve_top_k = std::env::var("QROUTE_RETRIEVE_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.max_concurrency.is_none() {
            self.max_concurrency = std::env::var("QROUTE_MAX_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("QROUTE_PROMPT_DIR").ok().map(PathBuf::from);
        }
        if self.failure_policy.is_none() {
            self.failure_policy = std::env::var("QROUTE_FAILURE_POLICY")
                .ok()
                .map(|v| FailurePolicy::parse(&v));
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the router model.
    #[must_use]
    pub fn router_model(mut self, model: impl Into<String>) -> Self {
        self.router_model = Some(model.into());
        self
    }

    /// Sets the specialist model.
    #[must_use]
    pub fn specialist_model(mut self, model: impl Into<String>) -> Self {
        self.specialist_model = Some(model.into());
        self
    }

    /// Sets the combiner model.
    #[must_use]
    pub fn combiner_model(mut self, model: impl Into<String>) -> Self {
        self.combiner_model = Some(model.into());
        self
    }

    /// Sets passages retrieved per specialist.
    #[must_use]
    pub const fn retrieve_top_k(mut self, k: usize) -> Self {
        self.retrieve_top_k = Some(k);
        self
    }

    /// Sets the maximum concurrency.
    #[must_use]
    pub const fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = Some(n);
        self
    }

    /// Sets the router max tokens.
    #[must_use]
    pub const fn router_max_tokens(mut self, n: u32) -> Self {
        self.router_max_tokens = Some(n);
        self
    }

    /// Sets the specialist max tokens.
    #[must_use]
    pub const fn specialist_max_tokens(mut self, n: u32) -> Self {
        self.specialist_max_tokens = Some(n);
        self
    }

    /// Sets the combiner max tokens.
    #[must_use]
    pub const fn combiner_max_tokens(mut self, n: u32) -> Self {
        self.combiner_max_tokens = Some(n);
        self
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the max retries.
    #[must_use]
    pub const fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Sets the minimum delay between API requests per specialist task.
    #[must_use]
    pub const fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = Some(delay);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Sets the specialist failure policy.
    #[must_use]
    pub const fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self.api_key.ok_or(AgentError::ApiKeyMissing)?;

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            router_model: self
                .router_model
                .unwrap_or_else(|| "gpt-5-mini-2025-08-07".to_string()),
            specialist_model: self
                .specialist_model
                .unwrap_or_else(|| "gpt-5-mini-2025-08-07".to_string()),
            combiner_model: self
                .combiner_model
                .unwrap_or_else(|| "gpt-5.2-2025-12-11".to_string()),
            retrieve_top_k: self.retrieve_top_k.unwrap_or(DEFAULT_RETRIEVE_TOP_K),
            max_concurrency: self.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY),
            router_max_tokens: self.router_max_tokens.unwrap_or(DEFAULT_ROUTER_MAX_TOKENS),
            specialist_max_tokens: self
                .specialist_max_tokens
                .unwrap_or(DEFAULT_SPECIALIST_MAX_TOKENS),
            combiner_max_tokens: self
                .combiner_max_tokens
                .unwrap_or(DEFAULT_COMBINER_MAX_TOKENS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            request_delay: self.request_delay.unwrap_or(Duration::ZERO),
            prompt_dir: self.prompt_dir,
            failure_policy: self.failure_policy.unwrap_or_default(),
        })
    }
}
