//! # gate-api
//!
//! HTTP API layer for lightning-llm-gate.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Payment issue/status endpoints and settlement-gated LLM forwarding
//! - OpenNode callback handling
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/create-payment` | Issue a payment identifier |
//! | GET | `/api/is-paid?id=` | Settlement status |
//! | GET | `/api/is-valid?id=` | Identifier was issued here |
//! | POST | `/api/call-llm1` | Forward prompt via OpenAI |
//! | POST | `/api/call-llm2` | Forward prompt via vLLM |
//! | POST | `/webhook/opennode` | OpenNode callback |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
