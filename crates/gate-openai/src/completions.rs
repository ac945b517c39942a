//! # vLLM Completions
//!
//! Legacy `POST /v1/completions` as served by vLLM and other
//! OpenAI-compatible servers. The reply text is `choices[0].text`.

use crate::config::VllmConfig;
use crate::http::{build_client, send_json};
use async_trait::async_trait;
use gate_core::{CompletionProvider, GateError, GateResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

const PROVIDER: &str = "vllm";

/// Completion provider for a self-hosted vLLM server
pub struct VllmCompletionsProvider {
    config: VllmConfig,
    client: Client,
}

impl VllmCompletionsProvider {
    pub fn new(config: VllmConfig) -> GateResult<Self> {
        Ok(Self {
            config,
            client: build_client()?,
        })
    }

    pub fn from_env() -> GateResult<Self> {
        Self::new(VllmConfig::from_env()?)
    }
}

#[async_trait]
impl CompletionProvider for VllmCompletionsProvider {
    #[instrument(skip(self, prompt), fields(model = %self.config.model))]
    async fn complete(&self, prompt: &str) -> GateResult<String> {
        let url = format!("{}/v1/completions", self.config.base_url);
        let body = CompletionsRequest {
            model: &self.config.model,
            prompt,
            max_tokens: self.config.max_tokens,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(auth) = self.config.auth_header() {
            request = request.header("Authorization", auth);
        }

        let response: CompletionsResponse = send_json(request, PROVIDER).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| GateError::EmptyCompletion {
                provider: PROVIDER.to_string(),
            })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[derive(Debug, Serialize)]
struct CompletionsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .and(body_partial_json(json!({"prompt": "hello", "max_tokens": 256})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cmpl-1",
                "object": "text_completion",
                "choices": [{ "index": 0, "text": " world", "finish_reason": "length" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = VllmCompletionsProvider::new(VllmConfig::new(server.uri())).unwrap();
        assert_eq!(provider.complete("hello").await.unwrap(), " world");
    }

    #[tokio::test]
    async fn test_sends_bearer_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .and(header("Authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "text": "ok" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            VllmCompletionsProvider::new(VllmConfig::new(server.uri()).with_api_key("token")).unwrap();
        assert_eq!(provider.complete("hi").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_no_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let provider = VllmCompletionsProvider::new(VllmConfig::new(server.uri())).unwrap();
        let err = provider.complete("hello").await.unwrap_err();
        assert!(matches!(err, GateError::EmptyCompletion { .. }));
    }

    #[tokio::test]
    async fn test_empty_text_is_no_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "index": 0, "text": "", "finish_reason": "stop" }]
            })))
            .mount(&server)
            .await;

        let provider = VllmCompletionsProvider::new(VllmConfig::new(server.uri())).unwrap();
        let err = provider.complete("hello").await.unwrap_err();
        assert!(matches!(err, GateError::EmptyCompletion { .. }));
    }
}
