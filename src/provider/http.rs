//! OpenAI-compatible HTTP completion provider.
//!
//! Speaks the `/v1/chat/completions` request/response shape over reqwest.
//! The client is built without a request timeout on purpose: the
//! orchestrator races every attempt against its own deadline, and a second,
//! shorter timeout here would fire behind its back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::CompletionProvider;
use crate::types::{Message, ModelParams, Role};
use crate::{Result, WayfinderError};

/// Default base URL (OpenAI's hosted API).
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Completion provider backed by an OpenAI-compatible HTTP endpoint.
#[derive(Clone)]
pub struct HttpCompletionProvider {
    api_key: String,
    http: Client,
    base_url: String,
}

impl HttpCompletionProvider {
    /// Create a provider against the default base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a provider with a custom base URL (for self-hosted gateways
    /// or testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CompletionProvider for HttpCompletionProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn invoke(
        &self,
        system_prompt: &str,
        messages: &[Message],
        params: &ModelParams,
    ) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut wire_messages = Vec::with_capacity(messages.len() + 1);
        if !system_prompt.is_empty() {
            wire_messages.push(WireMessage {
                role: Role::System,
                content: system_prompt,
            });
        }
        wire_messages.extend(messages.iter().map(|m| WireMessage {
            role: m.role,
            content: &m.content,
        }));

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&CompletionRequest {
                model: &params.model,
                messages: wire_messages,
                temperature: params.temperature,
                max_tokens: params.max_tokens,
                top_p: params.top_p,
            })
            .send()
            .await
            .map_err(|e| WayfinderError::Http(e.to_string()))?;

        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(WayfinderError::RateLimited {
                    retry_after: parse_retry_after(&response),
                });
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(WayfinderError::AuthenticationFailed);
            }
            s if !s.is_success() => {
                let message = response.text().await.unwrap_or_default();
                return Err(WayfinderError::Api {
                    status: s.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| WayfinderError::Http(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(WayfinderError::EmptyResponse);
        }
        Ok(content)
    }
}

/// Parse a `Retry-After` header given in whole seconds, if present.
fn parse_retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
