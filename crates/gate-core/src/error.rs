//! # Gate Error Types
//!
//! Typed error handling for the lightning-llm-gate.
//! All gate, processor and provider operations return `Result<T, GateError>`.
//!
//! "Not yet paid" is not an error. It is reported as `false` by the gate
//! and as a rejection message by the forwarder.

use thiserror::Error;

/// Core error type for all gate operations
#[derive(Debug, Error)]
pub enum GateError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream answered, but with an error status or an undecodable body
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Upstream could not be reached (connect failure, timeout)
    #[error("Upstream unavailable [{service}]: {message}")]
    UpstreamUnavailable { service: String, message: String },

    /// Completion provider returned no output text
    #[error("No content returned by {provider}")]
    EmptyCompletion { provider: String },

    /// No completion provider registered under this name
    #[error("Unknown completion provider: {name}")]
    UnknownProvider { name: String },

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GateError {
    /// Shorthand for a provider-side failure
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        GateError::ProviderError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a transport-level failure
    pub fn unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        GateError::UpstreamUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Returns true if the failure originated upstream of the gateway
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            GateError::ProviderError { .. }
                | GateError::UpstreamUnavailable { .. }
                | GateError::EmptyCompletion { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            GateError::Configuration(_) => 500,
            GateError::InvalidRequest(_) => 400,
            GateError::ProviderError { .. } => 502,
            GateError::UpstreamUnavailable { .. } => 503,
            GateError::EmptyCompletion { .. } => 502,
            GateError::UnknownProvider { .. } => 500,
            GateError::WebhookVerificationFailed(_) => 401,
            GateError::WebhookParseError(_) => 400,
            GateError::Internal(_) => 500,
        }
    }
}

/// Result type alias for gate operations
pub type GateResult<T> = Result<T, GateError>;
