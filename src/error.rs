//! Wayfinder error types

use std::time::Duration;

/// Wayfinder error types
#[derive(Debug, thiserror::Error)]
pub enum WayfinderError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    /// Underlying completion call failed for a transient reason
    /// (connection reset, DNS, 5xx-equivalent).
    #[error("provider call failed: {0}")]
    Provider(String),

    // Attempt-level errors
    #[error("attempt timed out after {limit:?}")]
    Timeout { limit: Duration },

    /// All attempts failed; wraps the last underlying error.
    ///
    /// `attempts` is the total number of attempts made (`max_retries + 1`).
    #[error("exhausted {attempts} attempts: {source}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        source: Box<WayfinderError>,
    },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Provider returned a successful envelope with no usable content.
    #[error("empty response from model")]
    EmptyResponse,

    /// Successful response failed structural validation.
    ///
    /// Raised after the orchestrator has already returned — never retried.
    /// Indicates a prompt/provider mismatch rather than a transient outage.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    // Configuration errors
    #[error("no provider configured")]
    NoProvider,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl WayfinderError {
    /// Whether this error is worth retrying.
    ///
    /// Timeouts, transient provider failures, rate limits, and empty
    /// responses are retryable. Malformed responses, auth failures, and
    /// configuration errors are not — repeating the call cannot fix them.
    pub fn is_transient(&self) -> bool {
        match self {
            WayfinderError::Timeout { .. }
            | WayfinderError::Provider(_)
            | WayfinderError::RateLimited { .. }
            | WayfinderError::EmptyResponse
            | WayfinderError::Http(_) => true,
            WayfinderError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Provider-supplied retry hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            WayfinderError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Whether this attempt failed by exceeding its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, WayfinderError::Timeout { .. })
    }
}

/// Result type alias for Wayfinder operations
pub type Result<T> = std::result::Result<T, WayfinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(WayfinderError::Timeout {
            limit: Duration::from_secs(1)
        }
        .is_transient());
        assert!(WayfinderError::Provider("connection reset".into()).is_transient());
        assert!(WayfinderError::EmptyResponse.is_transient());
        assert!(WayfinderError::RateLimited { retry_after: None }.is_transient());
        assert!(WayfinderError::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_transient());

        assert!(!WayfinderError::MalformedResponse("missing field".into()).is_transient());
        assert!(!WayfinderError::AuthenticationFailed.is_transient());
        assert!(!WayfinderError::Api {
            status: 400,
            message: "bad request".into()
        }
        .is_transient());
    }

    #[test]
    fn retry_after_hint() {
        let err = WayfinderError::RateLimited {
            retry_after: Some(Duration::from_secs(7)),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert_eq!(WayfinderError::EmptyResponse.retry_after(), None);
    }
}
