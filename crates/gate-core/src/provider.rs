//! # Completion Provider Trait
//!
//! Strategy trait for LLM completion backends, plus a selector that maps
//! provider names to implementations. Each forwarding route is bound to a
//! provider name.

use crate::error::GateResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// An LLM backend that turns a prompt into output text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send a single prompt and return the first output text.
    ///
    /// Implementations return `GateError::EmptyCompletion` when the
    /// response carries no text.
    async fn complete(&self, prompt: &str) -> GateResult<String>;

    /// Get the provider name (for logging and routing).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a boxed completion provider (dynamic dispatch)
pub type BoxedCompletionProvider = Arc<dyn CompletionProvider>;

/// Provider selector for multiple backends
#[derive(Clone)]
pub struct ProviderSelector {
    providers: HashMap<String, BoxedCompletionProvider>,
    default_provider: String,
}

impl ProviderSelector {
    /// Create a new selector with a default provider
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a completion provider
    pub fn register(&mut self, provider: BoxedCompletionProvider) {
        let name = provider.provider_name().to_string();
        self.providers.insert(name, provider);
    }

    /// Register with builder pattern
    pub fn with_provider(mut self, provider: BoxedCompletionProvider) -> Self {
        self.register(provider);
        self
    }

    /// Get the default provider
    pub fn default_provider(&self) -> Option<&BoxedCompletionProvider> {
        self.providers.get(&self.default_provider)
    }

    /// Get a provider by name
    pub fn get(&self, name: &str) -> Option<&BoxedCompletionProvider> {
        self.providers.get(name)
    }

    /// List all registered providers
    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ProviderSelector {
    fn default() -> Self {
        Self::new("openai")
    }
}
