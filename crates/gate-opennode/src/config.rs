//! # OpenNode Configuration
//!
//! Configuration management for the OpenNode integration.
//! The API key is loaded from the environment, never from source.

use gate_core::{Currency, GateError, Price};
use std::env;

/// Development API (testnet); production is `https://api.opennode.com`
pub const DEFAULT_API_BASE_URL: &str = "https://dev-api.opennode.com";

/// Hosted checkout host matching the development API
pub const DEFAULT_CHECKOUT_BASE_URL: &str = "https://checkout.dev.opennode.com";

/// OpenNode API configuration
#[derive(Debug, Clone)]
pub struct OpenNodeConfig {
    /// Invoice-permission API key
    pub api_key: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// Hosted checkout base URL
    pub checkout_base_url: String,

    /// Price of every charge
    pub price: Price,

    /// Where OpenNode should POST settlement callbacks
    pub callback_url: Option<String>,
}

impl OpenNodeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `OPENNODE_API_KEY`
    ///
    /// Optional:
    /// - `OPENNODE_API_BASE_URL`, `OPENNODE_CHECKOUT_BASE_URL`
    /// - `INVOICE_AMOUNT` (default `0.01`), `INVOICE_CURRENCY` (default `USD`)
    /// - `OPENNODE_CALLBACK_URL`
    pub fn from_env() -> Result<Self, GateError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_key = env::var("OPENNODE_API_KEY").map_err(|_| {
            GateError::Configuration("OPENNODE_API_KEY not set".to_string())
        })?;

        if api_key.trim().is_empty() {
            return Err(GateError::Configuration(
                "OPENNODE_API_KEY must not be empty".to_string(),
            ));
        }

        let currency = match env::var("INVOICE_CURRENCY") {
            Ok(code) => code.parse::<Currency>()?,
            Err(_) => Currency::USD,
        };

        let price = match env::var("INVOICE_AMOUNT") {
            Ok(amount) => Price::parse(&amount, currency)?,
            Err(_) => Price::parse("0.01", currency)?,
        };

        Ok(Self {
            api_key,
            api_base_url: env::var("OPENNODE_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            checkout_base_url: env::var("OPENNODE_CHECKOUT_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_CHECKOUT_BASE_URL.to_string()),
            price,
            callback_url: env::var("OPENNODE_CALLBACK_URL").ok().filter(|u| !u.is_empty()),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            checkout_base_url: DEFAULT_CHECKOUT_BASE_URL.to_string(),
            price: Price::default(),
            callback_url: None,
        }
    }

    /// Check if pointed at the development (testnet) API
    pub fn is_dev_mode(&self) -> bool {
        self.api_base_url.contains("dev-api")
    }

    /// Get authorization header value (OpenNode takes the bare key)
    pub fn auth_header(&self) -> &str {
        &self.api_key
    }

    /// Hosted checkout page for a charge
    pub fn checkout_url(&self, charge_id: &str) -> String {
        format!("{}/{}", self.checkout_base_url.trim_end_matches('/'), charge_id)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set the settlement callback URL
    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }
}
