//! Advisor facade — the advisory operations the application calls.
//!
//! [`Advisor`] composes the provider seam, the response cache, and the
//! orchestrator into three operations: conversational replies, structured
//! pathway recommendations, and narrative generation. Each follows the same
//! cache-aside flow:
//!
//! 1. Build the request fingerprint from operation + payload + model params.
//! 2. Consult the cache; a hit returns immediately (no provider call, no
//!    attempt records).
//! 3. On a miss, run the provider call through the orchestrator under the
//!    effective retry policy.
//! 4. Validate the response shape where the operation requires structure.
//! 5. Populate the cache only on full success (network + validation).
//!
//! Concurrent calls with the same fingerprint are not deduplicated — two
//! simultaneous misses may both go upstream, and the last write wins.

mod builder;
mod prompts;

pub use builder::AdvisorBuilder;

use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::diagnostics::{AttemptRecord, DiagnosticsLog, Stats};
use crate::orchestrator::{Hooks, Orchestrator, RetryPolicy};
use crate::provider::CompletionProvider;
use crate::types::{ApplicantProfile, Message, ModelParams, Recommendation, RequestOptions};
use crate::{Result, WayfinderError};

const OP_CHAT_REPLY: &str = "chat_reply";
const OP_RECOMMENDATIONS: &str = "recommendations";
const OP_NARRATIVE: &str = "narrative";

/// Resilient front door to the completion provider.
///
/// Construct via [`Advisor::builder`]. Each instance owns its own
/// diagnostics log and optional response cache; nothing is process-global.
pub struct Advisor {
    provider: Arc<dyn CompletionProvider>,
    orchestrator: Orchestrator,
    cache: Option<ResponseCache>,
    params: ModelParams,
    policy: RetryPolicy,
}

impl std::fmt::Debug for Advisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Advisor")
            .field("params", &self.params)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Advisor {
    /// Create a new builder for configuring an advisor.
    pub fn builder() -> AdvisorBuilder {
        AdvisorBuilder::new()
    }

    /// Generate a conversational reply to a user message.
    ///
    /// `history` is the prior conversation in order; the new `message` is
    /// appended as the final user turn. The `on_success` hook observes the
    /// raw completion text.
    pub async fn chat_reply(
        &self,
        message: &str,
        history: &[Message],
        options: RequestOptions<String>,
    ) -> Result<String> {
        if message.trim().is_empty() {
            return Err(WayfinderError::InvalidInput("message is empty".into()));
        }

        let key_data = serde_json::json!({
            "message": message,
            "history": history,
            "params": self.params,
        });
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get_text(OP_CHAT_REPLY, &key_data).await {
                return Ok(hit);
            }
        }

        let policy = self.policy_for(&options);
        let (system, messages) = prompts::chat_reply(message, history);
        let text = self
            .run_text(OP_CHAT_REPLY, &system, &messages, &policy, &options.hooks)
            .await?;

        if let Some(cache) = &self.cache {
            cache
                .insert_text(OP_CHAT_REPLY, &key_data, text.clone())
                .await;
        }
        Ok(text)
    }

    /// Generate structured pathway recommendations for an applicant.
    ///
    /// The provider's response must be a JSON array of fully-populated
    /// [`Recommendation`] objects (markdown fences are tolerated and
    /// stripped). Structural validation happens after the orchestrator has
    /// returned, so a malformed response surfaces as
    /// [`WayfinderError::MalformedResponse`] immediately — it is never
    /// retried, and the cache is not populated.
    pub async fn recommendations(
        &self,
        profile: &ApplicantProfile,
        options: RequestOptions<String>,
    ) -> Result<Vec<Recommendation>> {
        if profile.nationality.trim().is_empty() {
            return Err(WayfinderError::InvalidInput("nationality is empty".into()));
        }

        let key_data = serde_json::json!({
            "profile": profile,
            "params": self.params,
        });
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get_recommendations(OP_RECOMMENDATIONS, &key_data).await {
                return Ok(hit);
            }
        }

        let policy = self.policy_for(&options);
        let (system, messages) = prompts::recommendations(profile);
        let text = self
            .run_text(
                OP_RECOMMENDATIONS,
                &system,
                &messages,
                &policy,
                &options.hooks,
            )
            .await?;

        let recs = parse_recommendations(&text)?;

        if let Some(cache) = &self.cache {
            cache
                .insert_recommendations(OP_RECOMMENDATIONS, &key_data, recs.clone())
                .await;
        }
        Ok(recs)
    }

    /// Generate a personal-statement narrative supporting the stated goal.
    pub async fn narrative(
        &self,
        goal: &str,
        options: RequestOptions<String>,
    ) -> Result<String> {
        if goal.trim().is_empty() {
            return Err(WayfinderError::InvalidInput("goal is empty".into()));
        }

        let key_data = serde_json::json!({
            "goal": goal,
            "params": self.params,
        });
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get_text(OP_NARRATIVE, &key_data).await {
                return Ok(hit);
            }
        }

        let policy = self.policy_for(&options);
        let (system, messages) = prompts::narrative(goal);
        let text = self
            .run_text(OP_NARRATIVE, &system, &messages, &policy, &options.hooks)
            .await?;

        if let Some(cache) = &self.cache {
            cache
                .insert_text(OP_NARRATIVE, &key_data, text.clone())
                .await;
        }
        Ok(text)
    }

    /// Aggregate attempt statistics for operational inspection.
    pub fn stats(&self) -> Stats {
        self.orchestrator.log().stats()
    }

    /// Last `k` attempt records in insertion order.
    pub fn recent_attempts(&self, k: usize) -> Vec<AttemptRecord> {
        self.orchestrator.log().recent(k)
    }

    /// Empty the diagnostics log. Cached responses are unaffected.
    pub fn clear_logs(&self) {
        self.orchestrator.log().clear();
    }

    /// The diagnostics log shared by this advisor's orchestrator.
    pub fn diagnostics(&self) -> &Arc<DiagnosticsLog> {
        self.orchestrator.log()
    }

    /// Run one provider call through the orchestrator, treating blank
    /// output as an attempt failure (retried like any other).
    async fn run_text(
        &self,
        operation: &str,
        system: &str,
        messages: &[Message],
        policy: &RetryPolicy,
        hooks: &Hooks<String>,
    ) -> Result<String> {
        self.orchestrator
            .run(
                operation,
                || async move {
                    let text = self
                        .provider
                        .invoke(system, messages, &self.params)
                        .await?;
                    if text.trim().is_empty() {
                        return Err(WayfinderError::EmptyResponse);
                    }
                    Ok(text)
                },
                policy,
                hooks,
            )
            .await
    }

    /// Effective retry policy for one call: advisor defaults with any
    /// per-call overrides applied.
    fn policy_for(&self, options: &RequestOptions<String>) -> RetryPolicy {
        let mut policy = self.policy.clone();
        if let Some(timeout) = options.timeout {
            policy.timeout = timeout;
        }
        if let Some(retries) = options.max_retries {
            policy.max_retries = retries;
        }
        if let Some(delay) = options.retry_delay {
            policy.base_delay = delay;
        }
        policy
    }
}

/// Parse and validate the recommendations response.
///
/// The result must deserialize to a JSON array whose every element carries
/// the full [`Recommendation`] shape with correct primitive types.
fn parse_recommendations(text: &str) -> Result<Vec<Recommendation>> {
    let body = strip_code_fences(text);
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        WayfinderError::MalformedResponse(format!("response is not valid JSON: {e}"))
    })?;
    if !value.is_array() {
        return Err(WayfinderError::MalformedResponse(
            "expected a JSON array of recommendations".into(),
        ));
    }
    serde_json::from_value(value).map_err(|e| {
        WayfinderError::MalformedResponse(format!("invalid recommendation shape: {e}"))
    })
}

/// Strip a surrounding markdown code fence, if present.
///
/// Models regularly wrap JSON in ` ```json ... ``` ` despite instructions
/// not to; tolerate it rather than failing the whole response.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    inner.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_ARRAY: &str = r#"[{
        "type": "work-visa",
        "name": "Skilled Worker Route",
        "match": 82.0,
        "description": "Points-based route.",
        "requirements": ["job offer"],
        "timeline": "3-8 weeks",
        "cost": "£1,500",
        "pros": ["fast"],
        "cons": ["needs sponsor"]
    }]"#;

    #[test]
    fn parses_valid_array() {
        let recs = parse_recommendations(VALID_ARRAY).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, "work-visa");
    }

    #[test]
    fn parses_fenced_array() {
        let fenced = format!("```json\n{VALID_ARRAY}\n```");
        let recs = parse_recommendations(&fenced).unwrap();
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn rejects_non_array() {
        let err = parse_recommendations(r#"{"type": "work-visa"}"#).unwrap_err();
        assert!(matches!(err, WayfinderError::MalformedResponse(_)));
    }

    #[test]
    fn rejects_element_missing_match() {
        let missing = r#"[{
            "type": "work-visa",
            "name": "Skilled Worker Route",
            "description": "Points-based route.",
            "requirements": [],
            "timeline": "3-8 weeks",
            "cost": "£1,500",
            "pros": [],
            "cons": []
        }]"#;
        let err = parse_recommendations(missing).unwrap_err();
        assert!(matches!(err, WayfinderError::MalformedResponse(_)));
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_recommendations("I recommend a work visa!").unwrap_err();
        assert!(matches!(err, WayfinderError::MalformedResponse(_)));
    }

    #[test]
    fn fence_stripping_tolerates_plain_text() {
        assert_eq!(strip_code_fences("  [1, 2] "), "[1, 2]");
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        // Unterminated fence falls back to the trimmed original.
        assert_eq!(strip_code_fences("```json\n[1]"), "```json\n[1]");
    }
}
