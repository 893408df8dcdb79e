//! Model provider boundary and call execution with logging
//!
//! The pipeline treats the generative model as an opaque function
//! `(prompt, parameters) -> raw text`. [`ModelProvider`] is that seam;
//! [`OpenAiProvider`] is the default implementation over an
//! OpenAI-compatible Chat Completions endpoint.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use project_planner_sdk::{log_model_call_complete, log_model_call_failed, log_model_call_start};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Why a provider call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Connection, DNS, TLS or body read failure
    Transport,
    Timeout,
    /// 401/403, or no credential configured
    Auth,
    /// 429
    RateLimited,
    /// 5xx
    Server,
    /// Any other non-success status
    BadRequest,
    /// Success status but no message content in the envelope
    EmptyResponse,
}

impl ProviderErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ProviderErrorKind::Auth,
            408 => ProviderErrorKind::Timeout,
            429 => ProviderErrorKind::RateLimited,
            500..=599 => ProviderErrorKind::Server,
            _ => ProviderErrorKind::BadRequest,
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderErrorKind::Transport => "transport failure",
            ProviderErrorKind::Timeout => "request timed out",
            ProviderErrorKind::Auth => "authentication failed",
            ProviderErrorKind::RateLimited => "rate limited",
            ProviderErrorKind::Server => "server error",
            ProviderErrorKind::BadRequest => "request rejected",
            ProviderErrorKind::EmptyResponse => "empty response",
        };
        f.write_str(s)
    }
}

/// Failure talking to the model provider
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        Self {
            kind: ProviderErrorKind::from_status(status),
            message: format!("HTTP {}: {}", status, super::json::preview(body, 200)),
            status: Some(status),
        }
    }

    /// Transport, timeout, rate-limit and server failures are transient
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ProviderErrorKind::Transport
                | ProviderErrorKind::Timeout
                | ProviderErrorKind::RateLimited
                | ProviderErrorKind::Server
        )
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::new(ProviderErrorKind::Timeout, e.to_string())
        } else if let Some(status) = e.status() {
            ProviderError {
                kind: ProviderErrorKind::from_status(status.as_u16()),
                message: e.to_string(),
                status: Some(status.as_u16()),
            }
        } else {
            ProviderError::new(ProviderErrorKind::Transport, e.to_string())
        }
    }
}

/// One prompt sent to the model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub system: String,
    pub user: String,
    /// Ask the provider to constrain output to a JSON object
    pub json_mode: bool,
}

/// Token usage counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Raw model reply
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// Statistics for one model call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallStats {
    pub model: String,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Anything that can turn a prompt into text
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError>;
}

/// Execute one model call with event logging
///
/// Emits model-call start/complete/failed events tagged with `stage` and
/// returns the reply text with call statistics.
pub async fn execute_model_call(
    stage: usize,
    provider: &dyn ModelProvider,
    request: &CompletionRequest,
) -> Result<(String, CallStats), ProviderError> {
    log_model_call_start!(stage, &request.model);
    debug!(
        stage,
        model = %request.model,
        system_len = request.system.len(),
        user_len = request.user.len(),
        "calling model provider"
    );

    let started = Instant::now();
    match provider.complete(request).await {
        Ok(completion) => {
            let duration_ms = started.elapsed().as_millis() as u64;
            log_model_call_complete!(
                stage,
                &request.model,
                duration_ms,
                completion.usage.map(|u| u.input_tokens),
                completion.usage.map(|u| u.output_tokens)
            );
            let stats = CallStats {
                model: request.model.clone(),
                duration_ms,
                usage: completion.usage,
            };
            Ok((completion.text, stats))
        }
        Err(e) => {
            warn!(stage, model = %request.model, error = %e, "model call failed");
            log_model_call_failed!(stage, &request.model, &e, e.is_retryable());
            Err(e)
        }
    }
}

// ============================================================================
// OpenAI-compatible provider
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Chat Completions client for OpenAI and compatible endpoints
#[derive(Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiProvider {
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::new(
                ProviderErrorKind::Auth,
                "no API key configured",
            ));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        let body = ChatRequest {
            model: &request.model,
            temperature: request.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), &text));
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| {
            ProviderError::new(
                ProviderErrorKind::EmptyResponse,
                format!("unreadable response envelope: {}", e),
            )
        })?;

        let usage = parsed.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::new(ProviderErrorKind::EmptyResponse, "no message content in reply")
            })?;

        Ok(Completion { text, usage })
    }
}
