//! # engine::simulator
//!
//! Paper fills for when the broker cannot (or must not) be reached.
//!
//! A simulated fill waits a random latency, succeeds 98% of the time, gets a
//! six/seven-digit ticket and a price within ±0.005% of the requested entry.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::SimulationConfig;
use crate::engine::entropy::RandomSource;
use crate::models::{ExecutionStage, Mt5OrderRequest, Mt5OrderResult};

const SUCCESS_RATE: f64 = 0.98;
const TICKET_BASE:  f64 = 100_000.0;
const TICKET_SPAN:  f64 = 1_000_000.0;
/// Peak-to-peak slippage as a fraction of the entry price.
const SLIPPAGE:     f64 = 0.0001;

#[derive(Clone)]
pub struct Simulator {
    config: SimulationConfig,
    random: Arc<dyn RandomSource>,
}

impl Simulator {
    pub fn new(config: SimulationConfig, random: Arc<dyn RandomSource>) -> Self {
        Self { config, random }
    }

    pub async fn fill(&self, order: &Mt5OrderRequest) -> Mt5OrderResult {
        let delay = self.latency();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.random.next_f64() >= SUCCESS_RATE {
            info!(symbol = %order.symbol, "🎲 Simulated trade failed");
            return Mt5OrderResult::failed(ExecutionStage::SimulatedFallback, "Simulated trade failure");
        }

        let order_id = (self.random.next_f64() * TICKET_SPAN).floor() as u64 + TICKET_BASE as u64;
        let offset = (self.random.next_f64() - 0.5) * SLIPPAGE * order.entry_price;
        let price = round_to(order.entry_price + offset, 5);

        info!(
            symbol    = %order.symbol,
            direction = %order.direction,
            order_id,
            price,
            delay_ms  = delay.as_millis() as u64,
            "🎲 Simulated trade filled"
        );

        Mt5OrderResult::filled(ExecutionStage::SimulatedFallback, Some(order_id), Some(price))
    }

    fn latency(&self) -> Duration {
        let min = self.config.min_delay.as_millis() as f64;
        let max = self.config.max_delay.as_millis() as f64;
        if max <= min {
            return self.config.min_delay;
        }
        Duration::from_millis((min + self.random.next_f64() * (max - min)) as u64)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
