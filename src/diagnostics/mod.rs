//! Attempt diagnostics: bounded history and on-demand aggregates.
//!
//! Every orchestrator attempt — success or failure, retry or first try —
//! appends one [`AttemptRecord`] to a shared [`DiagnosticsLog`]. The log is
//! a fixed-capacity ring buffer: oldest records are evicted first, so memory
//! stays bounded in long-running processes regardless of traffic.
//!
//! [`Stats`] are derived on demand from the current buffer contents and are
//! never stored; two consecutive `stats()` calls may differ if attempts
//! landed in between.
//!
//! Concurrency: the buffer is guarded by a `std::sync::Mutex`. Appends and
//! reads are short, non-blocking, in-memory operations; no await point ever
//! holds the lock. Records from concurrent runs interleave in fire order —
//! per-run append order is preserved, total order across runs is not
//! guaranteed.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::telemetry;

/// Default maximum number of records kept in the log.
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Number of trailing records included in [`Stats::recent`].
const STATS_RECENT: usize = 10;

/// Outcome of a single orchestrator attempt.
///
/// Immutable once created; only ever evicted, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub timestamp: SystemTime,
    /// Operation label the orchestrator was given (e.g. "recommendations").
    pub operation: String,
    pub duration: Duration,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Attempt number within the run. `None` for a first-try success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
    /// Shared across all attempts of one orchestrator run.
    pub request_id: String,
}

/// Aggregate view over the current log contents.
///
/// Computed on demand by [`DiagnosticsLog::stats`]; not stored.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    /// `successes / total * 100`; 0 when the log is empty.
    pub success_rate_pct: f64,
    /// Mean attempt duration in milliseconds; 0 when the log is empty.
    pub average_duration_ms: f64,
    /// Last few records in insertion order.
    pub recent: Vec<AttemptRecord>,
}

/// Bounded, append-only history of attempt outcomes.
///
/// FIFO ring buffer: appending past capacity drops the oldest record.
/// Safe for concurrent use from multiple advisory operations.
pub struct DiagnosticsLog {
    capacity: usize,
    entries: Mutex<VecDeque<AttemptRecord>>,
}

impl DiagnosticsLog {
    /// Create a log with the default capacity (100).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    /// Create a log with a custom capacity.
    ///
    /// A capacity of 0 is clamped to 1 so `append` always retains the
    /// newest record.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append a record, evicting the oldest if the buffer is full.
    ///
    /// Also emits attempt counters and a duration histogram via `metrics`.
    pub fn append(&self, record: AttemptRecord) {
        let status = if record.success { "ok" } else { "error" };
        metrics::counter!(telemetry::ATTEMPTS_TOTAL,
            "operation" => record.operation.clone(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::ATTEMPT_DURATION_SECONDS,
            "operation" => record.operation.clone(),
        )
        .record(record.duration.as_secs_f64());

        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(record);
    }

    /// Compute aggregates over the current buffer contents.
    pub fn stats(&self) -> Stats {
        let entries = self.lock();
        let total = entries.len();
        let successes = entries.iter().filter(|r| r.success).count();
        let failures = total - successes;
        let success_rate_pct = if total == 0 {
            0.0
        } else {
            successes as f64 / total as f64 * 100.0
        };
        let average_duration_ms = if total == 0 {
            0.0
        } else {
            entries
                .iter()
                .map(|r| r.duration.as_secs_f64() * 1000.0)
                .sum::<f64>()
                / total as f64
        };
        let recent = entries
            .iter()
            .skip(total.saturating_sub(STATS_RECENT))
            .cloned()
            .collect();

        Stats {
            total,
            successes,
            failures,
            success_rate_pct,
            average_duration_ms,
            recent,
        }
    }

    /// Last `k` records in insertion order.
    pub fn recent(&self, k: usize) -> Vec<AttemptRecord> {
        let entries = self.lock();
        entries
            .iter()
            .skip(entries.len().saturating_sub(k))
            .cloned()
            .collect()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empty the buffer. Does not touch the response cache.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<AttemptRecord>> {
        // A poisoned lock only means another thread panicked mid-append;
        // the buffer itself is still structurally sound.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DiagnosticsLog {
    fn default() -> Self {
        Self::new()
    }
}
