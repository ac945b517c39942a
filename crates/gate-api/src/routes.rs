//! # Routes
//!
//! Axum router configuration for the gate API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Gate API:
///   - POST /api/create-payment - Issue a payment identifier (GET also accepted)
///   - GET  /api/is-paid?id=    - Settlement status
///   - GET  /api/is-valid?id=   - Identifier was issued here
///   - POST /api/call-llm1      - Forward to the primary provider
///   - POST /api/call-llm2      - Forward to the secondary provider
///
/// - Webhooks:
///   - POST /webhook/opennode - OpenNode charge callback
///
/// - Static pages (from `STATIC_DIR`):
///   - GET /, /js, /llm-demo, /ads/*
pub fn create_router(state: AppState) -> Router {
    // The demo pages are served from the same origin, but the API is also
    // called from third-party pages
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/create-payment",
            post(handlers::create_payment).get(handlers::create_payment),
        )
        .route("/is-paid", get(handlers::is_paid))
        .route("/is-valid", get(handlers::is_valid))
        .route("/call-llm1", post(handlers::call_llm1))
        .route("/call-llm2", post(handlers::call_llm2));

    let webhook_routes = Router::new().route("/opennode", post(handlers::opennode_webhook));

    let static_dir = Path::new(&state.config.static_dir).to_path_buf();

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .nest("/webhook", webhook_routes)
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service("/js", ServeFile::new(static_dir.join("script.js")))
        .route_service("/llm-demo", ServeFile::new(static_dir.join("llm.html")))
        .nest_service("/ads", ServeDir::new(static_dir.join("ads")))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
