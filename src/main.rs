//! # Signal Bridge — Confidence Scoring & MT5 Execution Backend
//!
//! ```text
//!  ┌─────────────┐  POST /api/confidence       ┌──────────────────────────────┐
//!  │  Signal     │ ──────────────────────────▶ │ AppState                     │
//!  │  Service    │                             │ ├─ confidence  (8 factors)   │
//!  └─────────────┘                             │ ├─ executor ──┬─▶ MT5 bridge │
//!                                              │ │             └─▶ simulator  │
//!  ┌─────────────┐  POST /api/mt5/execute      │ ├─ gateway ─────▶ MT5 bridge │
//!  │  Bot /      │ ──────────────────────────▶ │ └─ http_client (pooled)      │
//!  │  Dashboard  │  GET  /api/mt5/account      └──────────────────────────────┘
//!  └─────────────┘  GET  /api/mt5/positions
//!                   POST /api/mt5/close-position
//!                   POST /api/mt5/symbol
//! ```
//!
//! ## Environment Variables
//!
//! | Variable    | Default              | Description                     |
//! |-------------|----------------------|---------------------------------|
//! | `BIND_ADDR` | `0.0.0.0:3000`       | Address Axum listens on         |
//! | `API_KEY`   | *(unset)*            | Require `X-API-Key` when set    |
//! | `RUST_LOG`  | `signal_bridge=debug`| Tracing filter                  |
//!
//! Bridge and simulation variables are listed in [`config`].

use std::net::SocketAddr;

use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod auth;
mod config;
mod engine;
mod error;
mod models;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use routes::build_router;
use state::build_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("signal_bridge=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════════════╗
  ║             SIGNAL BRIDGE — Trading Core              ║
  ║     Confidence · Execution · Symbols · Account        ║
  ╚═══════════════════════════════════════════════════════╝"#);

    // ── 3. Shared state ───────────────────────────────────────────────────────
    let state = build_state();
    if state.api_key.is_none() {
        info!("API_KEY not set — running in open dev mode");
    }

    // ── 4. CORS ───────────────────────────────────────────────────────────────
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 5. Router ─────────────────────────────────────────────────────────────
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // ── 6. Bind & Serve ───────────────────────────────────────────────────────
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    info!(?addr, "🚀 Signal Bridge server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
