//! # OpenAI Responses
//!
//! `POST /v1/responses` with a single string input. The reply text is the
//! first content item of the first output item that has content.

use crate::config::OpenAiConfig;
use crate::http::{build_client, send_json};
use async_trait::async_trait;
use gate_core::{CompletionProvider, GateError, GateResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const PROVIDER: &str = "openai";

/// Completion provider backed by the OpenAI Responses API
pub struct OpenAiResponsesProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiResponsesProvider {
    pub fn new(config: OpenAiConfig) -> GateResult<Self> {
        Ok(Self {
            config,
            client: build_client()?,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> GateResult<Self> {
        Self::new(OpenAiConfig::from_env()?)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiResponsesProvider {
    #[instrument(skip(self, prompt), fields(model = %self.config.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> GateResult<String> {
        let url = format!("{}/v1/responses", self.config.api_base_url);
        let body = ResponsesRequest {
            model: &self.config.model,
            input: prompt,
        };

        let request = self
            .client
            .post(&url)
            .header("accept", "application/json")
            .header("Authorization", self.config.auth_header())
            .json(&body);

        let response: ResponsesResponse = send_json(request, PROVIDER).await?;
        debug!("OpenAI response: id={:?}, outputs={}", response.id, response.output.len());

        response.first_text().ok_or_else(|| GateError::EmptyCompletion {
            provider: PROVIDER.to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Responses API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesResponse {
    fn first_text(self) -> Option<String> {
        self.output
            .into_iter()
            .find(|item| !item.content.is_empty())
            .and_then(|item| item.content.into_iter().next())
            .and_then(|content| content.text)
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAiResponsesProvider {
        OpenAiResponsesProvider::new(OpenAiConfig::new("sk-test").with_api_base_url(server.uri()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_complete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_json(json!({"model": "gpt-4o-mini", "input": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "resp_1",
                "object": "response",
                "status": "completed",
                "output": [{
                    "type": "message",
                    "role": "assistant",
                    "content": [{ "type": "output_text", "text": "Hi there!", "annotations": [] }]
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider_for(&server).complete("hello").await.unwrap();
        assert_eq!(text, "Hi there!");
    }

    #[tokio::test]
    async fn test_prompt_is_escaped() {
        let server = MockServer::start().await;
        let prompt = r#"say "hi", then {"inject": true}"#;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .and(body_json(json!({"model": "gpt-4o-mini", "input": prompt})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output": [{ "content": [{ "text": "ok" }] }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(provider_for(&server).complete(prompt).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_skips_output_without_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output": [
                    { "type": "reasoning", "summary": [] },
                    { "type": "message", "content": [{ "text": "answer" }] }
                ]
            })))
            .mount(&server)
            .await;

        assert_eq!(provider_for(&server).complete("q").await.unwrap(), "answer");
    }

    #[tokio::test]
    async fn test_empty_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": [] })))
            .mount(&server)
            .await;

        let err = provider_for(&server).complete("hello").await.unwrap_err();
        assert!(matches!(err, GateError::EmptyCompletion { .. }));
    }

    #[tokio::test]
    async fn test_empty_text_is_no_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output": [{ "content": [{ "type": "output_text", "text": "" }] }]
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server).complete("hello").await.unwrap_err();
        assert!(matches!(err, GateError::EmptyCompletion { .. }));
    }

    #[tokio::test]
    async fn test_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "Rate limit reached", "type": "requests" }
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server).complete("hello").await.unwrap_err();
        match err {
            GateError::ProviderError { message, .. } => {
                assert!(message.contains("Rate limit reached"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
