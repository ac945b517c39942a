//! # gate-core
//!
//! Core types and traits for the lightning-llm-gate.
//!
//! This crate provides:
//! - `PaymentGate` for issuing payment identifiers and tracking settlement
//! - `Forwarder` for relaying prompts only for settled payments
//! - `PaymentProcessor` and `CompletionProvider` traits for the two upstreams
//! - `Price` and `Currency` for the invoice tier
//! - `GateError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use gate_core::{Forwarder, PaymentGate, Price, ProviderSelector};
//!
//! let gate = Arc::new(PaymentGate::new(processor, Price::default()));
//! let forwarder = Forwarder::new(gate.clone(), ProviderSelector::new("openai").with_provider(openai));
//!
//! let ticket = gate.issue_payment().await?;
//! // ... client pays the invoice ...
//! let reply = forwarder.forward(&ticket.id, "hello").await?.into_text();
//! ```

pub mod error;
pub mod forwarder;
pub mod gate;
pub mod pricing;
pub mod processor;
pub mod provider;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-exports for convenience
pub use error::{GateError, GateResult};
pub use forwarder::{ForwardOutcome, Forwarder, REJECTION_MESSAGE};
pub use gate::{GateStats, PaymentGate, PaymentRecord, PaymentTicket};
pub use pricing::{Currency, Price};
pub use processor::{BoxedPaymentProcessor, Charge, ChargeRequest, ChargeStatus, PaymentProcessor};
pub use provider::{BoxedCompletionProvider, CompletionProvider, ProviderSelector};
