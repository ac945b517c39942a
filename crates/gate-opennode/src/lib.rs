//! # gate-opennode
//!
//! OpenNode Lightning payment processor for lightning-llm-gate.
//!
//! - **OpenNodeProcessor** creates charges (`POST /v1/charges`) and reads
//!   their settlement status (`GET /v2/charge/{id}`).
//! - **CallbackVerifier** authenticates the charge status callbacks
//!   OpenNode posts to `callback_url`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gate_opennode::OpenNodeProcessor;
//! use gate_core::{PaymentGate, PaymentProcessor};
//!
//! let processor = Arc::new(OpenNodeProcessor::from_env()?);
//! let price = processor.config().price.clone();
//! let gate = PaymentGate::new(processor, price);
//!
//! let ticket = gate.issue_payment().await?;
//! // Send the user to ticket.checkout_url
//! ```

pub mod charges;
pub mod config;
pub mod webhook;

// Re-exports
pub use charges::OpenNodeProcessor;
pub use config::OpenNodeConfig;
pub use webhook::{compute_hmac_sha256, CallbackVerifier, ChargeCallback};
