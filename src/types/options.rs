//! Per-request options and model parameters

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::orchestrator::Hooks;

/// Model parameters sent with every completion request.
///
/// These participate in the cache fingerprint: two requests with different
/// parameters are different requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParams {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl ModelParams {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: None,
            top_p: None,
        }
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.top_p = Some(p);
        self
    }
}

/// Per-call overrides for a single advisory operation.
///
/// Any field left unset falls back to the advisor's defaults. Lifecycle
/// hooks fire synchronously in the calling task — see
/// [`Hooks`](crate::orchestrator::Hooks).
///
/// ```rust
/// # use wayfinder::RequestOptions;
/// # use std::time::Duration;
/// let opts: RequestOptions<String> = RequestOptions::new()
///     .timeout(Duration::from_secs(10))
///     .max_retries(4)
///     .on_retry(|attempt, err| eprintln!("attempt {attempt} failed: {err}"));
/// ```
pub struct RequestOptions<T> {
    /// Per-attempt deadline override.
    pub timeout: Option<Duration>,
    /// Retry budget override (0 = single attempt).
    pub max_retries: Option<u32>,
    /// Base backoff delay override.
    pub retry_delay: Option<Duration>,
    /// Lifecycle callbacks for this call.
    pub hooks: Hooks<T>,
}

impl<T> Default for RequestOptions<T> {
    fn default() -> Self {
        Self {
            timeout: None,
            max_retries: None,
            retry_delay: None,
            hooks: Hooks::default(),
        }
    }
}

impl<T> RequestOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the retry budget (0 = single attempt).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Override the base backoff delay.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Invoked before each backoff sleep with the failed attempt number
    /// and the error that caused it.
    pub fn on_retry(
        mut self,
        f: impl Fn(u32, &crate::WayfinderError) + Send + Sync + 'static,
    ) -> Self {
        self.hooks = self.hooks.on_retry(f);
        self
    }

    /// Invoked exactly once when an attempt succeeds, with the result and
    /// the attempt's wall-clock duration in milliseconds.
    pub fn on_success(mut self, f: impl Fn(&T, u64) + Send + Sync + 'static) -> Self {
        self.hooks = self.hooks.on_success(f);
        self
    }

    /// Invoked exactly once when every attempt has failed, with the final
    /// error and the total number of attempts made.
    pub fn on_error(
        mut self,
        f: impl Fn(&crate::WayfinderError, u32) + Send + Sync + 'static,
    ) -> Self {
        self.hooks = self.hooks.on_error(f);
        self
    }
}
