//! # Request Handlers
//!
//! Axum request handlers for the gate API.
//! Response field names (`ID`, `IsPaid`) match what the browser client reads.

use crate::state::{AppState, PRIMARY_PROVIDER, SECONDARY_PROVIDER};
use axum::{
    body::Bytes,
    extract::{rejection::FormRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use gate_core::{ForwardOutcome, GateError};
use gate_opennode::ChargeCallback;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// `?id=` query for the status endpoints
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    #[serde(default)]
    pub id: String,
}

/// Prompt body for the call-llm endpoints
#[derive(Debug, Deserialize)]
pub struct LlmRequest {
    pub message: String,
}

/// Create payment response
#[derive(Debug, Serialize)]
pub struct CreatePaymentResponse {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "CheckoutURL", skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
    #[serde(rename = "PaymentRequest", skip_serializing_if = "Option::is_none")]
    pub payment_request: Option<String>,
}

/// Settlement status response
#[derive(Debug, Serialize)]
pub struct IsPaidResponse {
    #[serde(rename = "IsPaid")]
    pub is_paid: bool,
}

/// Identifier validity response.
///
/// `IsPaid` mirrors `IsValid` for clients written against the older shape.
#[derive(Debug, Serialize)]
pub struct IsValidResponse {
    #[serde(rename = "IsValid")]
    pub is_valid: bool,
    #[serde(rename = "IsPaid")]
    pub legacy_is_paid: bool,
}

impl IsValidResponse {
    pub fn new(is_valid: bool) -> Self {
        Self {
            is_valid,
            legacy_is_paid: is_valid,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn gate_error_to_response(err: GateError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

fn bad_request(message: &str) -> ApiError {
    gate_error_to_response(GateError::InvalidRequest(message.to_string()))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "ln-llm-gate",
        "version": env!("CARGO_PKG_VERSION"),
        "processor": state.gate.processor_name(),
        "price": state.gate.price().display(),
        "providers": state.forwarder.providers().providers(),
        "gate": state.gate.stats(),
    }))
}

/// Issue a new payment identifier
#[instrument(skip_all)]
pub async fn create_payment(
    State(state): State<AppState>,
) -> Result<Json<CreatePaymentResponse>, ApiError> {
    let ticket = state.gate.issue_payment().await.map_err(|e| {
        error!("Failed to create payment: {}", e);
        gate_error_to_response(e)
    })?;

    info!("Created payment: {}", ticket.id);

    Ok(Json(CreatePaymentResponse {
        id: ticket.id,
        checkout_url: ticket.checkout_url,
        payment_request: ticket.payment_request,
    }))
}

/// Settlement status; unknown identifiers are unpaid
#[instrument(skip_all, fields(id = %query.id))]
pub async fn is_paid(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<IsPaidResponse>, ApiError> {
    let is_paid = state.gate.is_settled(&query.id).await.map_err(|e| {
        error!("Settlement check failed: {}", e);
        gate_error_to_response(e)
    })?;

    Ok(Json(IsPaidResponse { is_paid }))
}

/// Whether the identifier was issued by this gate
#[instrument(skip_all, fields(id = %query.id))]
pub async fn is_valid(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Json<IsValidResponse> {
    Json(IsValidResponse::new(state.gate.is_known(&query.id)))
}

/// Forward a prompt to the primary provider
pub async fn call_llm1(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<String>, ApiError> {
    call_llm_internal(&state, PRIMARY_PROVIDER, &headers, &body).await
}

/// Forward a prompt to the secondary provider
pub async fn call_llm2(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<String>, ApiError> {
    call_llm_internal(&state, SECONDARY_PROVIDER, &headers, &body).await
}

/// Shared call-llm logic: `id` header, JSON body, gate-checked forward
#[instrument(skip(state, headers, body))]
async fn call_llm_internal(
    state: &AppState,
    provider: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Json<String>, ApiError> {
    let id = headers
        .get("id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| bad_request("ID header is required"))?;

    let request: LlmRequest = serde_json::from_slice(body).map_err(|e| {
        let (status, Json(response)) = bad_request("Invalid request payload");
        (status, Json(response.with_details(e.to_string())))
    })?;

    let outcome = state
        .forwarder
        .forward_via(provider, id, &request.message)
        .await
        .map_err(|e| {
            error!("Forward to {} failed: {}", provider, e);
            gate_error_to_response(e)
        })?;

    if let ForwardOutcome::Completed { provider, text } = &outcome {
        info!("Completion from {}: {} chars", provider, text.len());
    }

    Ok(Json(outcome.into_text()))
}

/// Handle an OpenNode charge status callback
#[instrument(skip_all)]
pub async fn opennode_webhook(
    State(state): State<AppState>,
    form: Result<Form<ChargeCallback>, FormRejection>,
) -> Result<StatusCode, ApiError> {
    let verifier = state.callbacks.as_ref().ok_or_else(|| {
        gate_error_to_response(GateError::Configuration(
            "OpenNode callbacks not configured".to_string(),
        ))
    })?;

    let Form(callback) = form.map_err(|e| {
        gate_error_to_response(GateError::WebhookParseError(e.body_text()))
    })?;

    let status = verifier.verify(&callback).map_err(|e| {
        error!("Callback verification failed: {}", e);
        gate_error_to_response(e)
    })?;

    info!("Received callback: id={}, status={:?}", callback.id, status);

    if status.is_settled() && !state.gate.mark_settled(&callback.id) {
        // Acknowledge anyway so OpenNode stops retrying
        warn!("Callback for identifier this gate never issued: {}", callback.id);
    }

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400).with_details("line 1");
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
        assert_eq!(err.details.as_deref(), Some("line 1"));
    }

    #[test]
    fn test_gate_error_conversion() {
        let (status, _json) = gate_error_to_response(GateError::InvalidRequest("x".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _json) = gate_error_to_response(GateError::unavailable("opennode", "down"));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_response_field_names() {
        let paid = serde_json::to_value(IsPaidResponse { is_paid: true }).unwrap();
        assert_eq!(paid, serde_json::json!({"IsPaid": true}));

        let valid = serde_json::to_value(IsValidResponse::new(false)).unwrap();
        assert_eq!(valid, serde_json::json!({"IsValid": false, "IsPaid": false}));

        let created = serde_json::to_value(CreatePaymentResponse {
            id: "abc123".into(),
            checkout_url: None,
            payment_request: Some("lnbc10n1abc123".into()),
        })
        .unwrap();
        assert_eq!(
            created,
            serde_json::json!({"ID": "abc123", "PaymentRequest": "lnbc10n1abc123"})
        );
    }
}
