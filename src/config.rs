//! # config — Environment-sourced configuration
//!
//! | Variable            | Default      | Description                                 |
//! |---------------------|--------------|---------------------------------------------|
//! | `MT5_SERVER_HOST`   | `127.0.0.1`  | MT5 bridge host (may include `:port`)       |
//! | `MT5_SERVER_PORT`   | `8080`       | MT5 bridge port                             |
//! | `EXECUTION_MODE`    | `live`       | `live` or `simulation`                      |
//! | `SIM_MIN_DELAY_MS`  | `1000`       | Lower bound of simulated fill latency       |
//! | `SIM_MAX_DELAY_MS`  | `3000`       | Upper bound of simulated fill latency       |
//! | `SIM_SEED`          | *(unset)*    | Seed for reproducible simulated fills       |
//!
//! Setting host or port to an empty string marks the bridge as unconfigured:
//! real execution is skipped and every operation takes its fallback path.

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_MT5_HOST: &str = "127.0.0.1";
pub const DEFAULT_MT5_PORT: &str = "8080";

// ─── Execution Mode ───────────────────────────────────────────────────────────

/// Which stages of the execution strategy are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Try the broker first, fall back to simulation.
    Live,
    /// Never touch the broker for order placement.
    SimulationOnly,
}

impl ExecutionMode {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "simulation" | "sim" | "paper" => ExecutionMode::SimulationOnly,
            "live" | "" => ExecutionMode::Live,
            other => {
                warn!(value = other, "Unknown EXECUTION_MODE — defaulting to live");
                ExecutionMode::Live
            }
        }
    }
}

// ─── Bridge Config ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// `None` = explicitly blanked in the environment.
    pub host: Option<String>,
    pub port: Option<String>,
    pub mode: ExecutionMode,
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or_blank("MT5_SERVER_HOST", DEFAULT_MT5_HOST),
            port: env_or_blank("MT5_SERVER_PORT", DEFAULT_MT5_PORT),
            mode: ExecutionMode::parse(&std::env::var("EXECUTION_MODE").unwrap_or_default()),
        }
    }

    /// Bridge pointing at an explicit address, live mode.
    #[cfg(test)]
    pub fn with_address(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            port: Some(port.into()),
            mode: ExecutionMode::Live,
        }
    }

    /// Bridge with no address at all, everything falls back.
    #[cfg(test)]
    pub fn unconfigured() -> Self {
        Self { host: None, port: None, mode: ExecutionMode::Live }
    }

    /// Resolve the bridge base URL, or `None` if host/port are missing.
    ///
    /// A host that already carries a port (`"10.0.0.5:9000"`) or a scheme
    /// (`"https://bridge.example"`) is used as-is.
    pub fn base_url(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        let port = self.port.as_deref()?;

        let url = if host.contains("://") {
            host.trim_end_matches('/').to_string()
        } else if host.contains(':') {
            format!("http://{host}")
        } else {
            format!("http://{host}:{port}")
        };
        Some(url)
    }
}

// ─── Simulation Config ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Unset = OS entropy.
    pub seed:      Option<u64>,
}

impl SimulationConfig {
    pub fn from_env() -> Self {
        let min_ms = env_u64("SIM_MIN_DELAY_MS", 1_000);
        let max_ms = env_u64("SIM_MAX_DELAY_MS", 3_000).max(min_ms);
        Self {
            min_delay: Duration::from_millis(min_ms),
            max_delay: Duration::from_millis(max_ms),
            seed:      std::env::var("SIM_SEED").ok().and_then(|v| v.trim().parse().ok()),
        }
    }

    /// No artificial latency.
    #[cfg(test)]
    pub fn instant() -> Self {
        Self { min_delay: Duration::ZERO, max_delay: Duration::ZERO, seed: None }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(3_000),
            seed:      None,
        }
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn env_or_blank(key: &str, default: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if v.trim().is_empty() => None,
        Ok(v) => Some(v.trim().to_string()),
        Err(_) => Some(default.to_string()),
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_joins_host_and_port() {
        let config = BridgeConfig::with_address("10.0.0.5", "8080");
        assert_eq!(config.base_url().as_deref(), Some("http://10.0.0.5:8080"));
    }

    #[test]
    fn base_url_keeps_host_with_embedded_port() {
        let config = BridgeConfig::with_address("10.0.0.5:9000", "8080");
        assert_eq!(config.base_url().as_deref(), Some("http://10.0.0.5:9000"));

        let config = BridgeConfig::with_address("https://bridge.example/", "443");
        assert_eq!(config.base_url().as_deref(), Some("https://bridge.example"));
    }

    #[test]
    fn missing_port_means_unconfigured() {
        let config = BridgeConfig { port: None, ..BridgeConfig::with_address("10.0.0.5", "1") };
        assert!(config.base_url().is_none());
        assert!(BridgeConfig::unconfigured().base_url().is_none());
    }

    #[test]
    fn execution_mode_parsing() {
        assert_eq!(ExecutionMode::parse("simulation"), ExecutionMode::SimulationOnly);
        assert_eq!(ExecutionMode::parse(" PAPER "), ExecutionMode::SimulationOnly);
        assert_eq!(ExecutionMode::parse(""), ExecutionMode::Live);
        assert_eq!(ExecutionMode::parse("yolo"), ExecutionMode::Live);
    }
}
