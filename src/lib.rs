//! Wayfinder — resilient AI-request orchestration for advisory services
//!
//! This crate is the AI core of an immigration-advisory application: it
//! wraps an unreliable, latency-variable completion provider with
//! per-attempt deadlines, bounded exponential-backoff retries, a
//! fingerprint-keyed response cache, and an in-process diagnostics surface.
//!
//! # Example
//!
//! ```rust,no_run
//! use wayfinder::{Advisor, ApplicantProfile, CacheConfig, ModelParams, RequestOptions};
//!
//! #[tokio::main]
//! async fn main() -> wayfinder::Result<()> {
//!     let advisor = Advisor::builder()
//!         .openai("sk-your-key")
//!         .params(ModelParams::new("gpt-4o-mini").temperature(0.2))
//!         .response_cache(CacheConfig::new())
//!         .build()?;
//!
//!     let profile = ApplicantProfile::new("Brazil")
//!         .occupation("software engineer")
//!         .years_experience(6)
//!         .target_country("Canada");
//!
//!     let recommendations = advisor
//!         .recommendations(&profile, RequestOptions::new())
//!         .await?;
//!
//!     for rec in recommendations {
//!         println!("{} ({}%) — {}", rec.name, rec.match_score, rec.timeline);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error handling
//!
//! Transient failures (timeouts, network errors, rate limits, empty
//! responses) are retried internally and only surface as
//! [`WayfinderError::ExhaustedRetries`] once the retry budget is spent —
//! present these to users as "temporarily unavailable, please retry". A
//! [`WayfinderError::MalformedResponse`] surfaces immediately without
//! retry; it indicates a prompt/provider mismatch, not an outage.

pub mod advisor;
pub mod cache;
pub mod diagnostics;
pub mod error;
pub mod orchestrator;
pub mod provider;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use advisor::{Advisor, AdvisorBuilder};
pub use cache::{fingerprint, CacheConfig, ResponseCache};
pub use diagnostics::{AttemptRecord, DiagnosticsLog, Stats};
pub use error::{Result, WayfinderError};
pub use orchestrator::{Hooks, Orchestrator, RetryPolicy};
pub use provider::{CompletionProvider, HttpCompletionProvider};
pub use types::{
    ApplicantProfile, Message, ModelParams, Recommendation, RequestOptions, Role,
};
