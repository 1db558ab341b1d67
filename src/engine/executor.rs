//! # engine::executor
//!
//! The **Trade Executor** places an order on MetaTrader 5 through the
//! bridge, falling back to a simulated fill when the broker cannot fill it.
//!
//! ## Strategy
//! ```text
//!   ┌──────────────┐  Filled   ┌──────────────────────┐
//!   │ RealAttempt  │ ────────▶ │ result (RealAttempt) │
//!   └──────┬───────┘           └──────────────────────┘
//!          │ Rejected / HTTP error / timeout / unconfigured
//!          ▼
//!   ┌───────────────────┐
//!   │ SimulatedFallback │ ──▶ result (SimulatedFallback)
//!   └───────────────────┘
//! ```
//! `SimulationOnly` mode skips the first stage entirely.
//! [`Mt5Executor::execute_order`] never fails: every path ends in a result.

use tracing::{info, warn};

use crate::config::ExecutionMode;
use crate::engine::bridge::{BrokerReply, ExecutePayload, Mt5Client};
use crate::engine::simulator::Simulator;
use crate::models::{ExecutionStage, Mt5OrderRequest, Mt5OrderResult};

/// Suffix the bridge's broker uses for its tradable symbol set.
const SYMBOL_SUFFIX: &str = "pm";
const DEFAULT_COMMENT: &str = "AI Trading Bot";

#[derive(Clone)]
pub struct Mt5Executor {
    client:    Mt5Client,
    simulator: Simulator,
    mode:      ExecutionMode,
}

impl Mt5Executor {
    pub fn new(client: Mt5Client, simulator: Simulator, mode: ExecutionMode) -> Self {
        Self { client, simulator, mode }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub async fn execute_order(&self, order: &Mt5OrderRequest) -> Mt5OrderResult {
        info!(
            symbol    = %order.symbol,
            direction = %order.direction,
            lot_size  = order.lot_size,
            mode      = ?self.mode,
            "🚀 [EXECUTOR] Executing order"
        );

        if self.mode == ExecutionMode::Live {
            if let Some(result) = self.real_attempt(order).await {
                return result;
            }
        }

        self.simulator.fill(order).await
    }

    /// `Some` only when the broker confirmed a fill.
    async fn real_attempt(&self, order: &Mt5OrderRequest) -> Option<Mt5OrderResult> {
        if !self.client.is_configured() {
            info!("MT5 server not configured, using simulation");
            return None;
        }

        let payload = wire_payload(order);
        match self.client.send_order(&payload).await {
            Ok(BrokerReply::Filled { order_id, price }) => {
                info!(symbol = %payload.symbol, order_id = ?order_id, price = ?price, "✅ MT5 order filled");
                Some(Mt5OrderResult::filled(ExecutionStage::RealAttempt, order_id, price))
            }
            Ok(BrokerReply::Rejected { reason }) => {
                warn!(symbol = %payload.symbol, reason = %reason, "MT5 rejected order, falling back to simulation");
                None
            }
            Err(e) => {
                warn!(symbol = %payload.symbol, error = %e, "MT5 execution failed, falling back to simulation");
                None
            }
        }
    }
}

/// Map a domain order onto the bridge's `/execute` body.
pub fn wire_payload(order: &Mt5OrderRequest) -> ExecutePayload {
    let symbol = if order.symbol.ends_with(SYMBOL_SUFFIX) {
        order.symbol.clone()
    } else {
        format!("{}{SYMBOL_SUFFIX}", order.symbol)
    };

    ExecutePayload {
        symbol,
        action:  order.direction.action(),
        volume:  order.lot_size,
        sl:      order.stop_loss,
        tp:      order.take_profit,
        comment: order
            .comment
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_COMMENT.to_string()),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BridgeConfig, SimulationConfig};
    use crate::engine::entropy::{ScriptedRandom, SeededRandom};
    use crate::models::Direction;
    use crate::testing::StubBroker;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use crate::engine::bridge::BridgeTimeouts;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn order() -> Mt5OrderRequest {
        Mt5OrderRequest {
            symbol: "EURUSD".into(),
            direction: Direction::Short,
            lot_size: 0.25,
            entry_price: 1.08500,
            take_profit: 1.08000,
            stop_loss: 1.08800,
            comment: None,
        }
    }

    fn executor(client: Mt5Client, mode: ExecutionMode) -> Mt5Executor {
        let simulator = Simulator::new(SimulationConfig::instant(), Arc::new(ScriptedRandom::new(&[0.1, 0.5, 0.5])));
        Mt5Executor::new(client, simulator, mode)
    }

    #[test]
    fn payload_appends_suffix_once_and_defaults_comment() {
        let payload = wire_payload(&order());
        assert_eq!(payload.symbol, "EURUSDpm");
        assert_eq!(payload.action, "SELL");
        assert_eq!(payload.sl, 1.08800);
        assert_eq!(payload.tp, 1.08000);
        assert_eq!(payload.comment, "AI Trading Bot");

        let already = Mt5OrderRequest { symbol: "EURUSDpm".into(), comment: Some("AI-1234abcd".into()), ..order() };
        let payload = wire_payload(&already);
        assert_eq!(payload.symbol, "EURUSDpm");
        assert_eq!(payload.comment, "AI-1234abcd");
    }

    #[test]
    fn suffix_check_only_looks_at_the_end() {
        let inner = Mt5OrderRequest { symbol: "PMXUSD".into(), ..order() };
        assert_eq!(wire_payload(&inner).symbol, "PMXUSDpm");

        let mixed = Mt5OrderRequest { symbol: "XpmUSD".into(), ..order() };
        assert_eq!(wire_payload(&mixed).symbol, "XpmUSDpm");
    }

    #[tokio::test]
    async fn real_fill_is_returned_verbatim() {
        let seen = Arc::new(Mutex::new(None::<Value>));
        let sink = seen.clone();
        let broker = StubBroker::spawn(Router::new().route(
            "/execute",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    *sink.lock().unwrap() = Some(body);
                    Json(json!({ "success": true, "order": 0, "deal": 98765, "price": 1.08493 }))
                }
            }),
        ))
        .await;

        let result = executor(broker.client(), ExecutionMode::Live).execute_order(&order()).await;
        assert_eq!(result, Mt5OrderResult::filled(ExecutionStage::RealAttempt, Some(98765), Some(1.08493)));

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["symbol"], "EURUSDpm");
        assert_eq!(body["action"], "SELL");
        assert_eq!(body["volume"], 0.25);
        assert_eq!(body["comment"], "AI Trading Bot");
    }

    #[tokio::test]
    async fn broker_rejection_falls_back_to_simulation() {
        let broker = StubBroker::spawn(Router::new().route(
            "/execute",
            post(|| async { Json(json!({ "success": false, "retcode": 10019 })) }),
        ))
        .await;

        let result = executor(broker.client(), ExecutionMode::Live).execute_order(&order()).await;
        assert!(result.success);
        assert_eq!(result.stage, ExecutionStage::SimulatedFallback);
        assert_eq!(result.order_id, Some(600_000));
        assert_eq!(result.execution_price, Some(1.085));
    }

    #[tokio::test]
    async fn http_error_falls_back_to_simulation() {
        let broker = StubBroker::spawn(Router::new().route(
            "/execute",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "success": false, "error": "MT5 not initialized" }))) }),
        ))
        .await;

        let result = executor(broker.client(), ExecutionMode::Live).execute_order(&order()).await;
        assert_eq!(result.stage, ExecutionStage::SimulatedFallback);
    }

    #[tokio::test]
    async fn unreachable_or_unconfigured_bridge_still_resolves() {
        let dead = Mt5Client::with_base_url(reqwest::Client::new(), &StubBroker::unreachable());
        let result = executor(dead, ExecutionMode::Live).execute_order(&order()).await;
        assert_eq!(result.stage, ExecutionStage::SimulatedFallback);

        let none = Mt5Client::new(reqwest::Client::new(), &BridgeConfig::unconfigured());
        let result = executor(none, ExecutionMode::Live).execute_order(&order()).await;
        assert_eq!(result.stage, ExecutionStage::SimulatedFallback);
        assert!(result.success);
    }

    #[tokio::test]
    async fn slow_execute_falls_back_to_simulation() {
        let broker = StubBroker::spawn(Router::new().route(
            "/execute",
            post(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Json(json!({ "success": true, "order": 4242, "price": 1.2 }))
            }),
        ))
        .await;

        let client = broker.client().with_timeouts(BridgeTimeouts::uniform(Duration::from_millis(50)));
        let result = executor(client, ExecutionMode::Live).execute_order(&order()).await;
        assert!(result.success);
        assert_eq!(result.stage, ExecutionStage::SimulatedFallback);
        assert_eq!(result.order_id, Some(600_000));
    }

    #[tokio::test]
    async fn simulation_only_never_calls_broker() {
        let broker = StubBroker::spawn(Router::new().route(
            "/execute",
            post(|| async { Json(json!({ "success": true, "order": 1 })) }),
        ))
        .await;

        let result = executor(broker.client(), ExecutionMode::SimulationOnly).execute_order(&order()).await;
        assert_eq!(result.stage, ExecutionStage::SimulatedFallback);
    }

    #[tokio::test]
    async fn seeded_simulation_respects_bounds() {
        let client = Mt5Client::new(reqwest::Client::new(), &BridgeConfig::unconfigured());
        let simulator = Simulator::new(SimulationConfig::instant(), Arc::new(SeededRandom::new(2024)));
        let executor = Mt5Executor::new(client, simulator, ExecutionMode::Live);

        for _ in 0..50 {
            let result = executor.execute_order(&order()).await;
            if let (Some(id), Some(price)) = (result.order_id, result.execution_price) {
                assert!((100_000..1_100_000).contains(&id));
                assert!((price - 1.085).abs() <= 1.085 * 0.00005 + 0.000005);
            }
        }
    }
}
