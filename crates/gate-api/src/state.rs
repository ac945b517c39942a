//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the payment gate, the forwarder and the callback verifier.

use gate_core::{Forwarder, PaymentGate, ProviderSelector};
use gate_openai::{OpenAiResponsesProvider, VllmCompletionsProvider};
use gate_opennode::{CallbackVerifier, OpenNodeConfig, OpenNodeProcessor};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Provider behind `/api/call-llm1`
pub const PRIMARY_PROVIDER: &str = "openai";
/// Provider behind `/api/call-llm2`
pub const SECONDARY_PROVIDER: &str = "vllm";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL (used for the processor callback)
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Directory holding index.html, script.js, llm.html and ads/
    pub static_dir: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Callback URL handed to the processor when none is configured explicitly
    pub fn default_callback_url(&self) -> String {
        format!("{}/webhook/opennode", self.base_url.trim_end_matches('/'))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Issued identifiers and settlement cache
    pub gate: Arc<PaymentGate>,
    /// Settlement-checked prompt forwarding
    pub forwarder: Forwarder,
    /// Processor callback verification (absent when callbacks are off)
    pub callbacks: Option<CallbackVerifier>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState backed by OpenNode, OpenAI and vLLM
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let mut opennode = OpenNodeConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to configure OpenNode: {}", e))?;

        // Localhost cannot receive callbacks, so only production opts in by default
        if opennode.callback_url.is_none() && config.is_production() {
            opennode = opennode.with_callback_url(config.default_callback_url());
        }

        if opennode.is_dev_mode() {
            info!("OpenNode dev API: {}", opennode.api_base_url);
        } else if !config.is_production() {
            warn!("Live OpenNode API outside production: {}", opennode.api_base_url);
        }

        let callbacks = CallbackVerifier::new(opennode.api_key.clone());
        let price = opennode.price.clone();
        let processor = OpenNodeProcessor::new(opennode)
            .map_err(|e| anyhow::anyhow!("Failed to initialize OpenNode: {}", e))?;

        let openai = OpenAiResponsesProvider::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize OpenAI: {}", e))?;
        let vllm = VllmCompletionsProvider::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize vLLM: {}", e))?;

        let providers = ProviderSelector::new(PRIMARY_PROVIDER)
            .with_provider(Arc::new(openai))
            .with_provider(Arc::new(vllm));

        let gate = Arc::new(PaymentGate::new(Arc::new(processor), price));

        Ok(Self::from_parts(config, gate, providers, Some(callbacks)))
    }

    /// Assemble state from already-built parts
    pub fn from_parts(
        config: AppConfig,
        gate: Arc<PaymentGate>,
        providers: ProviderSelector,
        callbacks: Option<CallbackVerifier>,
    ) -> Self {
        let forwarder = Forwarder::new(gate.clone(), providers);
        Self {
            gate,
            forwarder,
            callbacks,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            base_url: "https://gate.example.com/".to_string(),
            environment: "test".to_string(),
            static_dir: "static".to_string(),
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_bad_socket_addr() {
        let mut config = config();
        config.host = "not a host".to_string();
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_default_callback_url() {
        assert_eq!(
            config().default_callback_url(),
            "https://gate.example.com/webhook/opennode"
        );
        assert!(!config().is_production());
    }
}
