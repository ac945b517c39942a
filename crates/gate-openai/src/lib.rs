//! # gate-openai
//!
//! OpenAI-compatible completion providers for lightning-llm-gate.
//!
//! 1. **OpenAiResponsesProvider** - hosted OpenAI, Responses API
//! 2. **VllmCompletionsProvider** - self-hosted vLLM, completions API
//!
//! Both implement `gate_core::CompletionProvider` and are registered in a
//! `ProviderSelector` under `"openai"` and `"vllm"`.

pub mod completions;
pub mod config;
mod http;
pub mod responses;

// Re-exports
pub use completions::VllmCompletionsProvider;
pub use config::{OpenAiConfig, VllmConfig};
pub use responses::OpenAiResponsesProvider;
