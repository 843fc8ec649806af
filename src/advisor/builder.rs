//! Builder for configuring advisor instances

use std::sync::Arc;

use super::Advisor;
use crate::cache::{CacheConfig, ResponseCache};
use crate::diagnostics::{DiagnosticsLog, DEFAULT_LOG_CAPACITY};
use crate::orchestrator::{Orchestrator, RetryPolicy};
use crate::provider::{CompletionProvider, HttpCompletionProvider};
use crate::types::ModelParams;
use crate::{Result, WayfinderError};

/// Builder for configuring [`Advisor`] instances.
///
/// Each built advisor owns its own diagnostics log and (optional) response
/// cache — there is no process-wide shared state, so tests can construct
/// isolated instances freely.
pub struct AdvisorBuilder {
    provider: Option<Arc<dyn CompletionProvider>>,
    params: Option<ModelParams>,
    cache_config: Option<CacheConfig>,
    policy: RetryPolicy,
    log_capacity: usize,
}

impl AdvisorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            params: None,
            cache_config: None,
            policy: RetryPolicy::default(),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }

    /// Use a custom completion provider.
    pub fn provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use the bundled OpenAI-compatible HTTP provider.
    pub fn openai(self, api_key: impl Into<String>) -> Self {
        self.provider(Arc::new(HttpCompletionProvider::new(api_key)))
    }

    /// Use the bundled HTTP provider against a custom base URL
    /// (self-hosted gateway, or wiremock in tests).
    pub fn openai_compatible(
        self,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        self.provider(Arc::new(HttpCompletionProvider::with_base_url(
            api_key, base_url,
        )))
    }

    /// Set the model parameters used for every request.
    pub fn params(mut self, params: ModelParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Enable the response cache.
    ///
    /// Without this, no cache is allocated and every call goes upstream.
    pub fn response_cache(mut self, config: CacheConfig) -> Self {
        self.cache_config = Some(config);
        self
    }

    /// Set the default retry policy (overridable per call via
    /// [`RequestOptions`](crate::RequestOptions)).
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the diagnostics log capacity (default: 100 records).
    pub fn log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// Build the advisor.
    pub fn build(self) -> Result<Advisor> {
        let provider = self.provider.ok_or(WayfinderError::NoProvider)?;
        let params = self.params.ok_or_else(|| {
            WayfinderError::Configuration("model parameters not set (use .params())".into())
        })?;
        if params.model.is_empty() {
            return Err(WayfinderError::Configuration("model name is empty".into()));
        }

        let log = Arc::new(DiagnosticsLog::with_capacity(self.log_capacity));
        let cache = self.cache_config.as_ref().map(ResponseCache::new);

        Ok(Advisor {
            provider,
            orchestrator: Orchestrator::new(log),
            cache,
            params,
            policy: self.policy,
        })
    }
}

impl Default for AdvisorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
