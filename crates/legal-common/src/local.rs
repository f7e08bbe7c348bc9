use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::CommonError;
use crate::gateway::{self, GatewayError, ModelGateway, ModelRequest};

pub const LOCAL_MODEL_LABEL: &str = "local_llm";

#[derive(Clone, Debug)]
pub struct LocalLlmConfig {
    /// Full URL of the generation endpoint, e.g. `http://127.0.0.1:8080/generate`.
    pub endpoint: String,
    pub default_timeout: Duration,
    pub max_error_body_bytes: usize,
}

impl LocalLlmConfig {
    /// Returns `None` when `LOCAL_LLM_URL` is unset or blank.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("LOCAL_LLM_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())?;

        Some(Self {
            endpoint,
            default_timeout: gateway::timeout_from_env(),
            max_error_body_bytes: gateway::max_error_body_bytes_from_env(),
        })
    }
}

/// Locally reachable HTTP endpoint speaking `{prompt, max_tokens, temperature} -> {response}`.
#[derive(Clone)]
pub struct LocalLlmClient {
    config: LocalLlmConfig,
    http: reqwest::Client,
}

impl LocalLlmClient {
    pub fn new(config: LocalLlmConfig) -> Result<Self, CommonError> {
        let http = reqwest::Client::builder()
            .user_agent("legal-aid/gateway")
            .timeout(config.default_timeout)
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &LocalLlmConfig {
        &self.config
    }
}

impl ModelGateway for LocalLlmClient {
    fn model_label(&self) -> &str {
        LOCAL_MODEL_LABEL
    }

    fn invoke<'a>(&'a self, request: &'a ModelRequest) -> BoxFuture<'a, Result<String, GatewayError>> {
        Box::pin(async move {
            let timeout = self.config.default_timeout;
            let body = GenerateRequest {
                prompt: &request.prompt,
                max_tokens: request.max_tokens,
                temperature: request.temperature,
            };

            let resp = self
                .http
                .post(&self.config.endpoint)
                .timeout(timeout)
                .json(&body)
                .send()
                .await
                .map_err(|e| GatewayError::from_transport(e, timeout))?;

            if !resp.status().is_success() {
                return Err(gateway::to_upstream_error(resp, self.config.max_error_body_bytes).await);
            }

            let bytes = resp
                .bytes()
                .await
                .map_err(|e| GatewayError::from_transport(e, timeout))?;
            let parsed: GenerateResponse = serde_json::from_slice(&bytes)?;
            parsed.response.ok_or(GatewayError::EmptyCompletion)
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}
