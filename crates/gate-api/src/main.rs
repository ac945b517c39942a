//! # ln-llm-gate
//!
//! Lightning-paid access to LLM completions.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export OPENNODE_API_KEY=...
//! export OPENAI_API_KEY=sk-...
//! export VLLM_BASE_URL=http://localhost:8000
//!
//! # Run the server
//! ln-llm-gate
//! ```

use gate_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!(
        "Invoice price: {} via {}",
        state.gate.price().display(),
        state.gate.processor_name()
    );
    info!("Providers: {:?}", state.forwarder.providers().providers());

    let app = routes::create_router(state);

    info!("ln-llm-gate listening on http://{}", addr);

    if !is_prod {
        info!("Demo: http://{}/llm-demo", addr);
        info!("Invoice: POST http://{}/api/create-payment", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  ⚡ ln-llm-gate ⚡
  ━━━━━━━━━━━━━━━━━━━━━━━
  Pay-per-prompt over Lightning
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
