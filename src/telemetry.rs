//! Telemetry metric name constants.
//!
//! Centralised metric names for wayfinder operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `wayfinder_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `operation` — domain operation invoked (e.g. "chat_reply",
//!   "recommendations", "narrative")
//! - `status` — attempt outcome: "ok" or "error"

/// Total attempts dispatched through the orchestrator.
///
/// One increment per attempt, including retries.
/// Labels: `operation`, `status` ("ok" | "error").
pub const ATTEMPTS_TOTAL: &str = "wayfinder_attempts_total";

/// Attempt duration in seconds.
///
/// Labels: `operation`.
pub const ATTEMPT_DURATION_SECONDS: &str = "wayfinder_attempt_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `operation`.
pub const RETRIES_TOTAL: &str = "wayfinder_retries_total";

/// Total runs that gave up after exhausting every attempt.
///
/// Labels: `operation`.
pub const EXHAUSTED_TOTAL: &str = "wayfinder_exhausted_total";

/// Total response cache hits.
///
/// Labels: `operation`.
pub const CACHE_HITS_TOTAL: &str = "wayfinder_cache_hits_total";

/// Total response cache misses.
///
/// Labels: `operation`.
pub const CACHE_MISSES_TOTAL: &str = "wayfinder_cache_misses_total";
