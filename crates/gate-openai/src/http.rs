//! Shared request plumbing for OpenAI-style APIs.

use gate_core::{GateError, GateResult};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::error;

pub(crate) fn build_client() -> GateResult<Client> {
    Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| GateError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Send the request and decode a 2xx JSON body into `T`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    provider: &str,
) -> GateResult<T> {
    let response = request
        .send()
        .await
        .map_err(|e| GateError::unavailable(provider, e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GateError::unavailable(provider, e.to_string()))?;

    if !status.is_success() {
        error!("{} API error: status={}, body={}", provider, status, body);

        if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&body) {
            return Err(GateError::provider(
                provider,
                format!("HTTP {}: {}", status, error_response.error.message),
            ));
        }

        return Err(GateError::provider(provider, format!("HTTP {}: {}", status, body)));
    }

    serde_json::from_str(&body)
        .map_err(|e| GateError::provider(provider, format!("Failed to parse response: {}", e)))
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
