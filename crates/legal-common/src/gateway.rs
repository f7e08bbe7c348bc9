/// Model gateway: a single capability over interchangeable text-generation backends.
///
/// Callers build a `ModelRequest`, pick a backend once at startup via `connect`, and from
/// then on only see `dyn ModelGateway`. Every backend applies a bounded timeout and never
/// retries on its own; see `retry::Retrying` for the opt-in decorator.
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::StatusCode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CommonError;
use crate::local::{LocalLlmClient, LocalLlmConfig};
use crate::openai::{OpenAiClient, OpenAiClientConfig};

/// A fully built prompt plus generation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("upstream returned error: status={status} message={message}")]
    Upstream { status: StatusCode, message: String },

    #[error("upstream returned non-JSON error: status={status} body={body}")]
    UpstreamBody { status: StatusCode, body: String },

    #[error("upstream response contained no completion text")]
    EmptyCompletion,

    #[error("no LLM backend configured: {0}")]
    Unconfigured(String),
}

impl GatewayError {
    /// Wraps a transport error, surfacing timeouts as their own variant.
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Request(err)
        }
    }
}

pub trait ModelGateway: Send + Sync {
    /// Label recorded on generated artifacts (e.g. the remote model id or "local_llm").
    fn model_label(&self) -> &str;

    fn invoke<'a>(&'a self, request: &'a ModelRequest) -> BoxFuture<'a, Result<String, GatewayError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Remote,
    Local,
}

impl FromStr for BackendKind {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" | "openai" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            other => Err(CommonError::Config(format!(
                "unknown LLM backend '{other}', expected 'remote' or 'local'"
            ))),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => f.write_str("remote"),
            Self::Local => f.write_str("local"),
        }
    }
}

/// Construct the configured backend. This is the only place that branches on `BackendKind`.
pub fn connect(kind: BackendKind) -> Result<Arc<dyn ModelGateway>, CommonError> {
    match kind {
        BackendKind::Remote => {
            let config = OpenAiClientConfig::from_env();
            if config.api_key.is_none() {
                return Err(CommonError::Config(
                    "OPENAI_API_KEY is required for the remote backend".to_string(),
                ));
            }
            Ok(Arc::new(OpenAiClient::new(config)?))
        }
        BackendKind::Local => {
            let config = LocalLlmConfig::from_env().ok_or_else(|| {
                CommonError::Config("LOCAL_LLM_URL is required for the local backend".to_string())
            })?;
            Ok(Arc::new(LocalLlmClient::new(config)?))
        }
    }
}

/// Stand-in used when `connect` fails at startup. Every call fails with the startup
/// reason, so classification and advice fall back instead of the server refusing to start.
pub struct Unconfigured {
    reason: String,
}

impl Unconfigured {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl ModelGateway for Unconfigured {
    fn model_label(&self) -> &str {
        "unconfigured"
    }

    fn invoke<'a>(&'a self, _request: &'a ModelRequest) -> BoxFuture<'a, Result<String, GatewayError>> {
        Box::pin(async move { Err(GatewayError::Unconfigured(self.reason.clone())) })
    }
}

/// Timeout shared by both backends, `LLM_TIMEOUT_SECS` (default 30s).
pub(crate) fn timeout_from_env() -> Duration {
    std::env::var("LLM_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|&n| n > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(30))
}

pub(crate) fn max_error_body_bytes_from_env() -> usize {
    std::env::var("LLM_MAX_ERROR_BODY_BYTES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(8 * 1024)
}

pub(crate) async fn to_upstream_error(resp: reqwest::Response, max_error_body_bytes: usize) -> GatewayError {
    let status = resp.status();
    let body = read_limited_text(resp, max_error_body_bytes).await;
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(&body) {
        let message = parsed
            .error
            .message
            .unwrap_or_else(|| "unknown upstream error".to_string());
        return GatewayError::Upstream { status, message };
    }
    GatewayError::UpstreamBody { status, body }
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read upstream error body");
            "<failed to read error body>".to_string()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorObject,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    message: Option<String>,
}
