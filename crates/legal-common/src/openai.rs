use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CommonError;
use crate::gateway::{self, GatewayError, ModelGateway, ModelRequest};

/// System instruction sent with every remote request.
pub const JSON_ONLY_SYSTEM_PROMPT: &str = "You are a legal aid assistant. You must respond with \
valid JSON only. Do not include any text outside the JSON response.";

#[derive(Clone, Debug)]
pub struct OpenAiClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub default_timeout: Duration,
    pub max_error_body_bytes: usize,
}

impl OpenAiClientConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let model =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            default_timeout: gateway::timeout_from_env(),
            max_error_body_bytes: gateway::max_error_body_bytes_from_env(),
        }
    }
}

/// Hosted, OpenAI-compatible chat completion backend.
#[derive(Clone)]
pub struct OpenAiClient {
    config: OpenAiClientConfig,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiClientConfig) -> Result<Self, CommonError> {
        let http = reqwest::Client::builder()
            .user_agent("legal-aid/gateway")
            .timeout(config.default_timeout)
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &OpenAiClientConfig {
        &self.config
    }

    pub async fn chat_completions(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, GatewayError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let timeout = self.config.default_timeout;

        let mut builder = self.http.post(&url).timeout(timeout).json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(e, timeout))?;

        if !resp.status().is_success() {
            return Err(gateway::to_upstream_error(resp, self.config.max_error_body_bytes).await);
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| GatewayError::from_transport(e, timeout))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl ModelGateway for OpenAiClient {
    fn model_label(&self) -> &str {
        &self.config.model
    }

    fn invoke<'a>(&'a self, request: &'a ModelRequest) -> BoxFuture<'a, Result<String, GatewayError>> {
        Box::pin(async move {
            let chat = ChatCompletionRequest {
                model: self.config.model.clone(),
                messages: vec![
                    Message {
                        role: "system".to_string(),
                        content: JSON_ONLY_SYSTEM_PROMPT.to_string(),
                    },
                    Message {
                        role: "user".to_string(),
                        content: request.prompt.clone(),
                    },
                ],
                temperature: Some(request.temperature),
                max_tokens: Some(request.max_tokens),
            };

            let response = self.chat_completions(&chat).await?;
            if let Some(usage) = &response.usage {
                debug!(
                    model = %self.config.model,
                    total_tokens = usage.total_tokens,
                    "chat completion usage"
                );
            }

            first_completion_text(response)
        })
    }
}

fn first_completion_text(response: ChatCompletionResponse) -> Result<String, GatewayError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(GatewayError::EmptyCompletion)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatCompletionChoice>,
    pub usage: Option<ChatCompletionUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChoice {
    pub message: ChatCompletionMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionMessage {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionUsage {
    pub total_tokens: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{serve_once, StubReply};

    fn client_for(base_url: String, timeout: Duration) -> OpenAiClient {
        OpenAiClient::new(OpenAiClientConfig {
            base_url,
            api_key: Some("sk-test".to_string()),
            model: "gpt-test".to_string(),
            default_timeout: timeout,
            max_error_body_bytes: 1024,
        })
        .unwrap()
    }

    fn request() -> ModelRequest {
        ModelRequest {
            prompt: "classify this".to_string(),
            max_tokens: 100,
            temperature: 0.1,
        }
    }

    #[test]
    fn request_omits_unset_parameters() {
        let req = ChatCompletionRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![],
            temperature: None,
            max_tokens: Some(1000),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["max_tokens"], 1000);
    }

    #[test]
    fn first_choice_content_is_returned() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"id":"x","choices":[
                {"index":0,"message":{"role":"assistant","content":"{\"category\":\"other\"}"},"finish_reason":"stop"},
                {"index":1,"message":{"role":"assistant","content":"second"},"finish_reason":"stop"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            first_completion_text(response).unwrap(),
            r#"{"category":"other"}"#
        );
    }

    #[test]
    fn missing_content_is_an_empty_completion() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            first_completion_text(response),
            Err(GatewayError::EmptyCompletion)
        ));
    }

    #[tokio::test]
    async fn first_choice_is_returned_over_http() {
        let body = r#"{"choices":[{"message":{"content":"x"}},{"message":{"content":"y"}}],"usage":{"total_tokens":12}}"#;
        let (url, seen) = serve_once(StubReply::new(200, body)).await;
        let client = client_for(format!("{url}/v1/"), Duration::from_secs(5));

        assert_eq!(client.invoke(&request()).await.unwrap(), "x");

        let raw = seen.await.unwrap();
        assert!(raw.starts_with("POST /v1/chat/completions HTTP/1.1"), "request: {raw}");
        assert!(raw.to_ascii_lowercase().contains("authorization: bearer sk-test"));
        assert!(raw.contains(r#""model":"gpt-test""#));
        assert!(raw.contains(r#""role":"system""#));
    }

    #[tokio::test]
    async fn error_envelope_is_surfaced() {
        let (url, _seen) =
            serve_once(StubReply::new(503, r#"{"error":{"message":"overloaded"}}"#)).await;
        let client = client_for(url, Duration::from_secs(5));

        match client.invoke(&request()).await {
            Err(GatewayError::Upstream { status, message }) => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_completion_times_out() {
        let reply = StubReply::new(200, r#"{"choices":[]}"#).delayed(Duration::from_secs(3));
        let (url, _seen) = serve_once(reply).await;
        let client = client_for(url, Duration::from_secs(1));

        assert!(matches!(
            client.invoke(&request()).await,
            Err(GatewayError::Timeout(_))
        ));
    }
}
