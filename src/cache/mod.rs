//! Response cache keyed by canonical request fingerprints.
//!
//! Cache-aside store for advisory operations: a domain operation checks the
//! cache before invoking the orchestrator and populates it only after a
//! fully validated success. Identical requests — identical operation, payload,
//! and model parameters — therefore hit the upstream provider at most once
//! per TTL window.
//!
//! # Fingerprints
//!
//! Keys are SHA-256 hashes over a canonical JSON rendering of the request's
//! semantic inputs. Canonicalization recursively sorts object keys, so
//! structurally equal payloads produce identical fingerprints regardless of
//! field insertion order. The hash is stable across processes (unlike
//! `DefaultHasher`, which is seed-randomized per process), so keys remain
//! valid if a shared backend is ever swapped in.
//!
//! # Policy
//!
//! Backed by moka's in-memory future cache: capacity-bounded with LRU-style
//! eviction plus a per-entry TTL, refreshed on insert (last write wins).
//! The cache layer itself cannot fail a caller — a lookup either returns a
//! value or signals a miss.

use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::telemetry;
use crate::types::Recommendation;

/// Configuration for the response cache.
///
/// Pass to [`AdvisorBuilder::response_cache()`](crate::AdvisorBuilder::response_cache)
/// to activate. Without this, no cache is allocated (zero overhead).
///
/// ```rust
/// # use wayfinder::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(50_000)
///     .ttl(Duration::from_secs(24 * 3600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
    /// Time-to-live for cached entries. Default: 1 hour.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Cached response value — free text or parsed recommendations.
#[derive(Clone, Debug)]
enum CachedResponse {
    Text(String),
    Recommendations(Vec<Recommendation>),
}

/// In-memory response cache for advisory operations.
///
/// Typed get/insert pairs per value shape; a type mismatch under the same
/// key (which would take a fingerprint collision) degrades to a miss.
pub struct ResponseCache {
    cache: Cache<String, CachedResponse>,
}

impl ResponseCache {
    /// Create a new response cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();
        Self { cache }
    }

    /// Look up a cached text response.
    ///
    /// Returns `None` on cache miss. Emits cache hit/miss metrics.
    pub async fn get_text(&self, operation: &str, key_data: &Value) -> Option<String> {
        let key = fingerprint(operation, key_data);
        match self.cache.get(&key).await {
            Some(CachedResponse::Text(text)) => {
                self.record_hit(operation, &key);
                Some(text)
            }
            _ => {
                self.record_miss(operation, &key);
                None
            }
        }
    }

    /// Insert a text response, refreshing its TTL.
    pub async fn insert_text(&self, operation: &str, key_data: &Value, value: String) {
        let key = fingerprint(operation, key_data);
        self.cache.insert(key, CachedResponse::Text(value)).await;
    }

    /// Look up a cached recommendation set.
    ///
    /// Returns `None` on cache miss. Emits cache hit/miss metrics.
    pub async fn get_recommendations(
        &self,
        operation: &str,
        key_data: &Value,
    ) -> Option<Vec<Recommendation>> {
        let key = fingerprint(operation, key_data);
        match self.cache.get(&key).await {
            Some(CachedResponse::Recommendations(recs)) => {
                self.record_hit(operation, &key);
                Some(recs)
            }
            _ => {
                self.record_miss(operation, &key);
                None
            }
        }
    }

    /// Insert a recommendation set, refreshing its TTL.
    pub async fn insert_recommendations(
        &self,
        operation: &str,
        key_data: &Value,
        recs: Vec<Recommendation>,
    ) {
        let key = fingerprint(operation, key_data);
        self.cache
            .insert(key, CachedResponse::Recommendations(recs))
            .await;
    }

    /// Number of entries currently in the cache.
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict all entries.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    fn record_hit(&self, operation: &str, key: &str) {
        debug!(operation, key = &key[..12], "cache hit");
        metrics::counter!(telemetry::CACHE_HITS_TOTAL, "operation" => operation.to_owned())
            .increment(1);
    }

    fn record_miss(&self, operation: &str, key: &str) {
        debug!(operation, key = &key[..12], "cache miss");
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "operation" => operation.to_owned())
            .increment(1);
    }
}

/// Compute the canonical fingerprint for `(operation, key_data)`.
///
/// SHA-256 over the operation name and the key-sorted canonical JSON
/// rendering of `key_data`, hex-encoded. Structurally equal payloads with
/// different field insertion order produce identical fingerprints.
pub fn fingerprint(operation: &str, key_data: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    hasher.update(b"\n");
    hasher.update(canonical_json(key_data).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Render a JSON value with all object keys recursively sorted.
///
/// Done explicitly rather than trusting serde_json's map ordering, which
/// flips to insertion order if any dependency enables `preserve_order`.
fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{}:{}", Value::String(k.clone()), canonical_json(&map[k])))
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        Value::Array(items) => {
            let elems: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", elems.join(","))
        }
        // Scalars already have a single compact rendering.
        other => other.to_string(),
    }
}
