//! Completion provider seam.
//!
//! The upstream AI service is reached through a single call-shaped
//! dependency: [`CompletionProvider::invoke`]. Everything above it — retry,
//! timeout, caching, diagnostics — is provider-agnostic, and tests swap in
//! scripted implementations.
//!
//! The bundled [`HttpCompletionProvider`] speaks the OpenAI-compatible
//! chat-completions wire format, which most hosted gateways accept.

pub mod http;

use async_trait::async_trait;

use crate::types::{Message, ModelParams};
use crate::Result;

/// A single request/response completion call.
///
/// Implementations may fail with network errors and may hang indefinitely —
/// the [`Orchestrator`](crate::orchestrator::Orchestrator) owns all
/// deadlines, so providers should not impose their own shorter timeouts.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Send one completion request and return the generated text.
    ///
    /// A successful envelope with no usable content must be reported as
    /// [`EmptyResponse`](crate::WayfinderError::EmptyResponse) so the
    /// orchestrator treats it as an attempt failure.
    async fn invoke(
        &self,
        system_prompt: &str,
        messages: &[Message],
        params: &ModelParams,
    ) -> Result<String>;
}

pub use http::HttpCompletionProvider;
