//! # Provider Configuration
//!
//! Settings for the hosted OpenAI backend and the self-hosted vLLM backend.

use gate_core::GateError;
use std::env;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_VLLM_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_VLLM_MODEL: &str = "meta-llama/Llama-3.1-8B-Instruct";
pub const DEFAULT_VLLM_MAX_TOKENS: u32 = 256;

/// OpenAI Responses API configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Secret API key (sk-...)
    pub api_key: String,
    /// API base URL (for testing/mocking)
    pub api_base_url: String,
    /// Model name
    pub model: String,
}

impl OpenAiConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `OPENAI_API_KEY`
    pub fn from_env() -> Result<Self, GateError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| GateError::Configuration("OPENAI_API_KEY not set".to_string()))?;

        if api_key.trim().is_empty() {
            return Err(GateError::Configuration(
                "OPENAI_API_KEY must not be empty".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            api_base_url: env::var("OPENAI_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Self-hosted vLLM (OpenAI-compatible completions) configuration
#[derive(Debug, Clone)]
pub struct VllmConfig {
    pub base_url: String,
    pub model: String,
    /// Only sent when the server was started with `--api-key`
    pub api_key: Option<String>,
    pub max_tokens: u32,
}

impl VllmConfig {
    /// Load from `VLLM_BASE_URL`, `VLLM_MODEL`, `VLLM_API_KEY`, `VLLM_MAX_TOKENS`.
    /// Every variable is optional.
    pub fn from_env() -> Result<Self, GateError> {
        dotenvy::dotenv().ok();

        let max_tokens = match env::var("VLLM_MAX_TOKENS") {
            Ok(raw) => raw.parse().map_err(|_| {
                GateError::Configuration(format!("VLLM_MAX_TOKENS is not a number: {}", raw))
            })?,
            Err(_) => DEFAULT_VLLM_MAX_TOKENS,
        };

        Ok(Self {
            base_url: env::var("VLLM_BASE_URL").unwrap_or_else(|_| DEFAULT_VLLM_BASE_URL.to_string()),
            model: env::var("VLLM_MODEL").unwrap_or_else(|_| DEFAULT_VLLM_MODEL.to_string()),
            api_key: env::var("VLLM_API_KEY").ok().filter(|k| !k.is_empty()),
            max_tokens,
        })
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: DEFAULT_VLLM_MODEL.to_string(),
            api_key: None,
            max_tokens: DEFAULT_VLLM_MAX_TOKENS,
        }
    }

    pub fn auth_header(&self) -> Option<String> {
        self.api_key.as_ref().map(|k| format!("Bearer {}", k))
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

impl Default for VllmConfig {
    fn default() -> Self {
        Self::new(DEFAULT_VLLM_BASE_URL)
    }
}
