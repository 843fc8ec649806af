//! Request orchestration: deadlines, bounded retries, exponential backoff.
//!
//! [`Orchestrator::run`] executes an asynchronous unit of work ("thunk")
//! under a per-attempt deadline, retrying failures with exponential backoff
//! up to a bounded number of attempts, recording one
//! [`AttemptRecord`](crate::diagnostics::AttemptRecord) per attempt and
//! firing lifecycle [`Hooks`] along the way.
//!
//! Attempts are strictly sequential — the race is between an attempt and
//! its own timer, never between attempts. When the timer wins,
//! `tokio::time::timeout` drops the losing future, which cancels the
//! underlying work (an in-flight HTTP request is aborted, not leaked).
//!
//! Every failure is retried identically: the orchestrator does not
//! distinguish a timeout from a connection reset from an empty response.
//! Callers that need to classify the final error can inspect the
//! `ExhaustedRetries` source and
//! [`WayfinderError::is_transient`](crate::WayfinderError::is_transient).
//!
//! Backoff is pure `base_delay * multiplier^(attempt-1)` with no jitter;
//! under heavy concurrent load this can synchronise retries against a
//! struggling provider. A `retry_after` hint from a rate-limited provider
//! takes precedence over the computed delay.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use tracing::warn;

use crate::diagnostics::{AttemptRecord, DiagnosticsLog};
use crate::telemetry;
use crate::{Result, WayfinderError};

/// Configuration for retry behaviour.
///
/// Immutable value, supplied per call or defaulted advisor-wide:
///
/// ```rust
/// # use wayfinder::RetryPolicy;
/// # use std::time::Duration;
/// let policy = RetryPolicy::new()
///     .timeout(Duration::from_secs(10))
///     .max_retries(4)
///     .base_delay(Duration::from_millis(250));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Deadline for each individual attempt. Default: 30s.
    pub timeout: Duration,
    /// Retries after the initial attempt; 0 = single attempt. Default: 2.
    pub max_retries: u32,
    /// Delay before the first retry. Default: 500ms.
    pub base_delay: Duration,
    /// Geometric growth factor for successive delays. Default: 2.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Create a new policy with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Set the per-attempt deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of retries after the initial attempt.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the delay before the first retry.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the geometric growth factor for successive delays.
    pub fn multiplier(mut self, m: u32) -> Self {
        self.multiplier = m;
        self
    }

    /// Total attempts this policy allows (`max_retries + 1`).
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay after failed attempt `attempt` (1-based).
    ///
    /// Pure exponential backoff: `base_delay * multiplier^(attempt-1)`,
    /// saturating. No jitter.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1);
        self.base_delay
            .saturating_mul(self.multiplier.saturating_pow(exp))
    }

    /// Effective delay, respecting provider `retry_after` hints.
    ///
    /// A `retry_after` duration (from a `RateLimited` error) takes
    /// precedence over the computed backoff.
    pub fn effective_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or_else(|| self.delay_for_attempt(attempt))
    }
}

// ============================================================================
// Lifecycle hooks
// ============================================================================

type RetryFn = Box<dyn Fn(u32, &WayfinderError) + Send + Sync>;
type SuccessFn<T> = Box<dyn Fn(&T, u64) + Send + Sync>;
type ErrorFn = Box<dyn Fn(&WayfinderError, u32) + Send + Sync>;

/// Optional lifecycle callbacks for one orchestrator run.
///
/// All hooks fire synchronously in the calling task:
///
/// - `on_retry(attempt, error)` — before each backoff sleep, with the
///   failed attempt number (1-based) and its error.
/// - `on_success(result, duration_ms)` — exactly once, when an attempt
///   succeeds.
/// - `on_error(final_error, total_attempts)` — exactly once, when every
///   attempt has failed; receives the `ExhaustedRetries` wrapper.
pub struct Hooks<T> {
    on_retry: Option<RetryFn>,
    on_success: Option<SuccessFn<T>>,
    on_error: Option<ErrorFn>,
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            on_retry: None,
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> Hooks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_retry(mut self, f: impl Fn(u32, &WayfinderError) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(Box::new(f));
        self
    }

    pub fn on_success(mut self, f: impl Fn(&T, u64) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&WayfinderError, u32) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    fn fire_retry(&self, attempt: u32, err: &WayfinderError) {
        if let Some(f) = &self.on_retry {
            f(attempt, err);
        }
    }

    fn fire_success(&self, value: &T, duration_ms: u64) {
        if let Some(f) = &self.on_success {
            f(value, duration_ms);
        }
    }

    fn fire_error(&self, err: &WayfinderError, total_attempts: u32) {
        if let Some(f) = &self.on_error {
            f(err, total_attempts);
        }
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Executes thunks under a deadline with bounded retries.
///
/// Owns nothing but a handle to the shared [`DiagnosticsLog`]; construct
/// one per [`Advisor`](crate::Advisor) (or per test) rather than sharing
/// process-wide state.
pub struct Orchestrator {
    log: Arc<DiagnosticsLog>,
}

impl Orchestrator {
    pub fn new(log: Arc<DiagnosticsLog>) -> Self {
        Self { log }
    }

    /// The diagnostics log this orchestrator appends to.
    pub fn log(&self) -> &Arc<DiagnosticsLog> {
        &self.log
    }

    /// Run `thunk` under `policy`, retrying failures with backoff.
    ///
    /// Makes at most `policy.max_retries + 1` attempts. Each attempt races
    /// the thunk against a `policy.timeout` timer; a fired timer yields
    /// [`WayfinderError::Timeout`] and cancels the attempt's work. One
    /// [`AttemptRecord`] is appended per attempt. After exhaustion the last
    /// error is returned wrapped in [`WayfinderError::ExhaustedRetries`].
    pub async fn run<F, Fut, T>(
        &self,
        operation: &str,
        thunk: F,
        policy: &RetryPolicy,
        hooks: &Hooks<T>,
    ) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let request_id = uuid::Uuid::new_v4().to_string();
        let total_attempts = policy.total_attempts();
        let mut last_err = None;

        for attempt in 1..=total_attempts {
            let started = Instant::now();
            let outcome = match tokio::time::timeout(policy.timeout, thunk()).await {
                Ok(result) => result,
                Err(_) => Err(WayfinderError::Timeout {
                    limit: policy.timeout,
                }),
            };
            let duration = started.elapsed();

            match outcome {
                Ok(value) => {
                    self.log.append(AttemptRecord {
                        timestamp: SystemTime::now(),
                        operation: operation.to_string(),
                        duration,
                        success: true,
                        error: None,
                        attempt: (attempt > 1).then_some(attempt),
                        request_id,
                    });
                    hooks.fire_success(&value, duration.as_millis() as u64);
                    return Ok(value);
                }
                Err(err) => {
                    self.log.append(AttemptRecord {
                        timestamp: SystemTime::now(),
                        operation: operation.to_string(),
                        duration,
                        success: false,
                        error: Some(err.to_string()),
                        attempt: Some(attempt),
                        request_id: request_id.clone(),
                    });

                    if attempt == total_attempts {
                        last_err = Some(err);
                        break;
                    }

                    metrics::counter!(telemetry::RETRIES_TOTAL,
                        "operation" => operation.to_owned(),
                    )
                    .increment(1);
                    hooks.fire_retry(attempt, &err);

                    let delay = policy.effective_delay(attempt, err.retry_after());
                    warn!(
                        operation,
                        attempt,
                        max_attempts = total_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying after failed attempt"
                    );
                    tokio::time::sleep(delay).await;
                    last_err = Some(err);
                }
            }
        }

        metrics::counter!(telemetry::EXHAUSTED_TOTAL,
            "operation" => operation.to_owned(),
        )
        .increment(1);

        let final_err = WayfinderError::ExhaustedRetries {
            attempts: total_attempts,
            // The loop always records an error before breaking.
            source: Box::new(last_err.unwrap_or(WayfinderError::NoProvider)),
        };
        hooks.fire_error(&final_err, total_attempts);
        Err(final_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_schedule_doubles() {
        let policy = RetryPolicy::new().base_delay(Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(800));
    }

    #[test]
    fn backoff_schedule_non_decreasing() {
        let policy = RetryPolicy::default();
        let mut prev = Duration::ZERO;
        for attempt in 1..=10 {
            let delay = policy.delay_for_attempt(attempt);
            assert!(delay >= prev, "delay shrank at attempt {attempt}");
            prev = delay;
        }
    }

    #[test]
    fn retry_after_overrides_backoff() {
        let policy = RetryPolicy::new().base_delay(Duration::from_millis(100));
        assert_eq!(
            policy.effective_delay(3, Some(Duration::from_secs(9))),
            Duration::from_secs(9)
        );
        assert_eq!(
            policy.effective_delay(3, None),
            Duration::from_millis(400)
        );
    }

    #[test]
    fn disabled_policy_is_single_attempt() {
        assert_eq!(RetryPolicy::disabled().total_attempts(), 1);
    }

    #[test]
    fn zero_base_delay_stays_zero() {
        let policy = RetryPolicy::new().base_delay(Duration::ZERO);
        assert_eq!(policy.delay_for_attempt(5), Duration::ZERO);
    }
}
