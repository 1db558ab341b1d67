//! # state
//!
//! Shared application state: the engine components and the single pooled
//! HTTP client every bridge call goes through.  Everything here is either
//! immutable after startup or internally synchronised, so the state is
//! cloned freely into each Axum handler.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use tracing::info;

use crate::config::{BridgeConfig, SimulationConfig};
use crate::engine::{
    bridge::Mt5Client,
    confidence::ConfidenceEngine,
    entropy::{Clock, RandomSource, SeededRandom, SystemClock, SystemRandom},
    executor::Mt5Executor,
    gateway::AccountGateway,
    profiles::SymbolProfiles,
    simulator::Simulator,
};

// ─── AppState ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    // ── HTTP Client ───────────────────────────────────────────────────────────
    /// Shared connection pool, built once.
    pub http_client: reqwest::Client,

    // ── Engine ────────────────────────────────────────────────────────────────
    pub confidence: ConfidenceEngine,
    pub executor:   Mt5Executor,
    pub gateway:    AccountGateway,
    pub bridge:     BridgeConfig,

    // ── Auth ──────────────────────────────────────────────────────────────────
    /// `None` = dev mode, every request passes.
    pub api_key: Option<String>,

    // ── Metrics ───────────────────────────────────────────────────────────────
    pub execution_count: Arc<AtomicU64>,
}

/// Nondeterminism and configuration the state is assembled from.
pub struct StateParts {
    pub bridge:     BridgeConfig,
    pub simulation: SimulationConfig,
    pub clock:      Arc<dyn Clock>,
    pub random:     Arc<dyn RandomSource>,
    pub api_key:    Option<String>,
}

impl AppState {
    pub fn new(parts: StateParts) -> Self {
        let http_client = reqwest::Client::new();
        let client = Mt5Client::new(http_client.clone(), &parts.bridge);

        let confidence = ConfidenceEngine::new(
            Arc::new(SymbolProfiles::default()),
            parts.clock,
            parts.random.clone(),
        );
        let simulator = Simulator::new(parts.simulation, parts.random);

        Self {
            http_client,
            confidence,
            executor: Mt5Executor::new(client.clone(), simulator, parts.bridge.mode),
            gateway: AccountGateway::new(client),
            bridge: parts.bridge,
            api_key: parts.api_key,
            execution_count: Arc::new(AtomicU64::new(0)),
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Build the production state from the environment.
pub fn build_state() -> SharedState {
    let bridge = BridgeConfig::from_env();
    let simulation = SimulationConfig::from_env();

    let random: Arc<dyn RandomSource> = match simulation.seed {
        Some(seed) => {
            info!(seed, "🎲 Using seeded randomness");
            Arc::new(SeededRandom::new(seed))
        }
        None => Arc::new(SystemRandom),
    };

    info!(
        mt5_url = bridge.base_url().as_deref().unwrap_or("(not configured)"),
        mode    = ?bridge.mode,
        "MT5 bridge configured"
    );

    Arc::new(AppState::new(StateParts {
        bridge,
        simulation,
        clock: Arc::new(SystemClock),
        random,
        api_key: std::env::var("API_KEY").ok().filter(|k| !k.trim().is_empty()),
    }))
}
