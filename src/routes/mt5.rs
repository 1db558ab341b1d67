//! # routes::mt5
//!
//! Axum route handlers for the **MetaTrader 5 bridge**.
//!
//! ## Endpoints
//!
//! | Method | Path                      | Description                                  |
//! |--------|---------------------------|----------------------------------------------|
//! | GET    | `/api/health`             | Liveness + bridge configuration              |
//! | POST   | `/api/mt5/execute`        | Place an order (real, else simulated)        |
//! | GET    | `/api/mt5/account`        | Account snapshot                             |
//! | GET    | `/api/mt5/positions`      | Open positions                               |
//! | POST   | `/api/mt5/close-position` | Close one position by ticket                 |
//! | POST   | `/api/mt5/symbol`         | Resolve the broker's tradable symbol variant |

use std::sync::atomic::Ordering;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    engine::symbols::find_tradable_symbol,
    error::AppError,
    models::{Mt5OrderRequest, SymbolValidationResult},
    state::SharedState,
};

const MAX_LOT_SIZE: f64 = 100.0;

// ─── GET /api/health ──────────────────────────────────────────────────────────

pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "ok":                true,
        "service":           env!("CARGO_PKG_NAME"),
        "version":           env!("CARGO_PKG_VERSION"),
        "bridge_configured": state.bridge.base_url().is_some(),
        "execution_mode":    format!("{:?}", state.executor.mode()),
        "execution_count":   state.execution_count.load(Ordering::Relaxed),
    }))
}

// ─── POST /api/mt5/execute ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    #[serde(flatten)]
    pub order:    Mt5OrderRequest,
    /// Caller's trade record id; tags the broker order as `AI-xxxxxxxx`.
    #[serde(default)]
    pub trade_id: Option<Uuid>,
}

/// ### Request body (JSON)
/// ```json
/// {
///   "symbol": "EURUSD",
///   "direction": "LONG",
///   "lot_size": 0.1,
///   "entry_price": 1.0850,
///   "take_profit": 1.0900,
///   "stop_loss": 1.0820,
///   "trade_id": "3f2b8c1e-7d4a-4b9e-9c3a-2f1e0d9c8b7a"
/// }
/// ```
///
/// ### Response
/// `200 OK` with `{ "ok": true, "result": { "success", "order_id", "execution_price", "error", "stage" } }`.
/// A broker or simulated failure is still `200`; only malformed input is `400`.
pub async fn execute_order(
    State(state): State<SharedState>,
    Json(request): Json<ExecuteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut order = request.order;

    if order.symbol.trim().is_empty() {
        return Err(AppError::BadRequest("symbol is required".into()));
    }
    if !(order.lot_size.is_finite() && order.lot_size > 0.0 && order.lot_size <= MAX_LOT_SIZE) {
        return Err(AppError::BadRequest(format!(
            "Lot size must be greater than 0 and at most {MAX_LOT_SIZE}"
        )));
    }
    if order.comment.is_none() {
        order.comment = request.trade_id.map(trade_comment);
    }

    let result = state.executor.execute_order(&order).await;
    let n = state.execution_count.fetch_add(1, Ordering::Relaxed) + 1;

    info!(
        symbol    = %order.symbol,
        success   = result.success,
        stage     = ?result.stage,
        order_id  = ?result.order_id,
        execution = n,
        "📨 Execute request handled"
    );

    Ok(Json(json!({
        "ok":     true,
        "result": result,
    })))
}

/// `AI-` plus the first eight hex digits of the trade id.
fn trade_comment(trade_id: Uuid) -> String {
    let simple = trade_id.simple().to_string();
    format!("AI-{}", &simple[..8])
}

// ─── GET /api/mt5/account ─────────────────────────────────────────────────────

pub async fn account_info(State(state): State<SharedState>) -> impl IntoResponse {
    let account = state.gateway.get_account_info().await;
    Json(json!({ "ok": true, "account": account }))
}

// ─── GET /api/mt5/positions ───────────────────────────────────────────────────

pub async fn list_positions(State(state): State<SharedState>) -> impl IntoResponse {
    let positions = state.gateway.get_positions().await;
    Json(json!({
        "ok":        true,
        "count":     positions.len(),
        "positions": positions,
    }))
}

// ─── POST /api/mt5/close-position ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CloseRequest {
    pub ticket: i64,
}

pub async fn close_position(
    State(state): State<SharedState>,
    Json(request): Json<CloseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = u64::try_from(request.ticket)
        .ok()
        .filter(|&t| t > 0)
        .ok_or_else(|| AppError::BadRequest("Valid ticket number is required".into()))?;

    let result = state.gateway.close_position(ticket).await;
    Ok(Json(json!({ "ok": true, "ticket": ticket, "result": result })))
}

// ─── POST /api/mt5/symbol ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SymbolRequest {
    pub symbol: String,
}

pub async fn resolve_symbol(
    State(state): State<SharedState>,
    Json(request): Json<SymbolRequest>,
) -> Result<impl IntoResponse, AppError> {
    let symbol = request.symbol.trim();
    if symbol.is_empty() {
        return Err(AppError::BadRequest("symbol is required".into()));
    }

    let resolved = match state.bridge.base_url() {
        Some(base_url) => find_tradable_symbol(&state.http_client, &base_url, symbol).await,
        None => SymbolValidationResult {
            symbol:   symbol.to_string(),
            tradable: false,
            reason:   Some("MT5 server not configured".to_string()),
        },
    };

    Ok(Json(json!({ "ok": true, "resolved": resolved })))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::routes::test_support::*;
    use crate::testing::StubBroker;
    use axum::{routing::post, Router};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    fn order_body(lot_size: f64) -> Value {
        json!({
            "symbol": "EURUSD",
            "direction": "LONG",
            "lot_size": lot_size,
            "entry_price": 1.085,
            "take_profit": 1.09,
            "stop_loss": 1.082
        })
    }

    #[test]
    fn trade_comment_uses_first_eight_hex_digits() {
        let id = Uuid::parse_str("3f2b8c1e-7d4a-4b9e-9c3a-2f1e0d9c8b7a").unwrap();
        assert_eq!(trade_comment(id), "AI-3f2b8c1e");
    }

    #[tokio::test]
    async fn health_reports_bridge_state() {
        let (status, body) = send(app(BridgeConfig::unconfigured()), get("/api/health")).await;
        assert_eq!(status, 200);
        assert_eq!(body["ok"], true);
        assert_eq!(body["bridge_configured"], false);
        assert_eq!(body["execution_count"], 0);
    }

    #[tokio::test]
    async fn execute_validates_lot_size() {
        for lot in [0.0, -1.0, 100.5] {
            let (status, body) = send(app(BridgeConfig::unconfigured()), post_json("/api/mt5/execute", order_body(lot))).await;
            assert_eq!(status, 400, "lot {lot}");
            assert_eq!(body["ok"], false);
        }
    }

    #[tokio::test]
    async fn execute_unconfigured_falls_back_to_simulation() {
        let (status, body) = send(app(BridgeConfig::unconfigured()), post_json("/api/mt5/execute", order_body(0.1))).await;

        assert_eq!(status, 200);
        assert_eq!(body["result"]["success"], true);
        assert_eq!(body["result"]["stage"], "SIMULATED_FALLBACK");
        assert_eq!(body["result"]["order_id"], 100_000);
    }

    #[tokio::test]
    async fn execute_tags_order_with_trade_id() {
        let seen = Arc::new(Mutex::new(None::<Value>));
        let sink = seen.clone();
        let broker = StubBroker::spawn(Router::new().route(
            "/execute",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    *sink.lock().unwrap() = Some(body);
                    Json(json!({ "success": true, "order": 424242, "price": 1.0851 }))
                }
            }),
        ))
        .await;

        let mut body = order_body(0.1);
        body["trade_id"] = json!("3f2b8c1e-7d4a-4b9e-9c3a-2f1e0d9c8b7a");
        let (status, reply) = send(app(broker.config()), post_json("/api/mt5/execute", body)).await;

        assert_eq!(status, 200);
        assert_eq!(reply["result"]["stage"], "REAL_ATTEMPT");
        assert_eq!(reply["result"]["order_id"], 424242);
        assert_eq!(seen.lock().unwrap().as_ref().unwrap()["comment"], "AI-3f2b8c1e");
    }

    #[tokio::test]
    async fn close_rejects_invalid_ticket() {
        for ticket in [0, -5] {
            let (status, body) = send(
                app(BridgeConfig::unconfigured()),
                post_json("/api/mt5/close-position", json!({ "ticket": ticket })),
            )
            .await;
            assert_eq!(status, 400);
            assert_eq!(body["error"], "Valid ticket number is required");
        }
    }

    #[tokio::test]
    async fn close_unconfigured_reports_failure_result() {
        let (status, body) = send(
            app(BridgeConfig::unconfigured()),
            post_json("/api/mt5/close-position", json!({ "ticket": 12345 })),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(body["result"]["success"], false);
        assert_eq!(body["result"]["error"], "MT5 server not configured");
    }

    #[tokio::test]
    async fn positions_unconfigured_is_empty() {
        let (_, body) = send(app(BridgeConfig::unconfigured()), get("/api/mt5/positions")).await;
        assert_eq!(body["count"], 0);
        assert_eq!(body["positions"], json!([]));
    }

    #[tokio::test]
    async fn symbol_resolution_via_bridge() {
        let broker = StubBroker::spawn(Router::new().route(
            "/symbol_info",
            post(|Json(body): Json<Value>| async move {
                if body["symbol"] == "GBPUSDpm" {
                    Json(json!({ "symbol_info": { "visible": true, "trading": true } }))
                } else {
                    Json(json!({ "error": "Symbol not found" }))
                }
            }),
        ))
        .await;

        let (status, body) = send(app(broker.config()), post_json("/api/mt5/symbol", json!({ "symbol": "GBPUSD" }))).await;
        assert_eq!(status, 200);
        assert_eq!(body["resolved"]["symbol"], "GBPUSDpm");
        assert_eq!(body["resolved"]["tradable"], true);
    }

    #[tokio::test]
    async fn symbol_resolution_unconfigured() {
        let (_, body) = send(app(BridgeConfig::unconfigured()), post_json("/api/mt5/symbol", json!({ "symbol": "GBPUSD" }))).await;
        assert_eq!(body["resolved"]["tradable"], false);
        assert_eq!(body["resolved"]["reason"], "MT5 server not configured");
    }
}
