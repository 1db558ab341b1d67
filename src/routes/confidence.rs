//! # routes::confidence
//!
//! | Method | Path              | Description                             |
//! |--------|-------------------|-----------------------------------------|
//! | POST   | `/api/confidence` | Score a signal from its indicator set   |

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{engine::confidence::ConfidenceRequest, error::AppError, state::SharedState};

// ─── POST /api/confidence ─────────────────────────────────────────────────────

/// ### Request body (JSON)
/// ```json
/// {
///   "symbol": "EURUSD",
///   "direction": "LONG",
///   "current_price": 1.0850,
///   "volume": 52000,
///   "historical_accuracy": 68.5,
///   "indicators": {
///     "rsi": 28.4,
///     "macd": { "line": 0.0012, "signal": 0.0008, "histogram": 0.0004 },
///     "bollinger": { "upper": 1.0890, "lower": 1.0840, "bandwidth": 0.015, "squeeze": false },
///     "stochastic": { "k": 18.2, "d": 15.9 },
///     "atr": 0.0011,
///     "roc": 0.8
///   }
/// }
/// ```
pub async fn calculate_confidence(
    State(state): State<SharedState>,
    Json(request): Json<ConfidenceRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.symbol.trim().is_empty() {
        return Err(AppError::BadRequest("symbol is required".into()));
    }
    if !request.current_price.is_finite() || request.current_price <= 0.0 {
        return Err(AppError::BadRequest("current_price must be a positive number".into()));
    }

    let result = state.confidence.calculate(&request);

    Ok(Json(json!({
        "ok":         true,
        "symbol":     request.symbol,
        "direction":  request.direction,
        "confidence": result,
    })))
}

#[cfg(test)]
mod tests {
    use crate::config::BridgeConfig;
    use crate::routes::test_support::*;
    use serde_json::json;

    fn body(symbol: &str, price: f64) -> serde_json::Value {
        json!({
            "symbol": symbol,
            "direction": "LONG",
            "current_price": price,
            "volume": 50000,
            "indicators": {
                "rsi": 45.0,
                "macd": { "line": 0.002, "signal": 0.001, "histogram": 0.001 },
                "bollinger": { "upper": 1.10, "lower": 1.08, "bandwidth": 0.015 },
                "stochastic": { "k": 30.0, "d": 25.0 },
                "atr": 0.0011
            }
        })
    }

    #[tokio::test]
    async fn scores_a_signal() {
        let app = app(BridgeConfig::unconfigured());
        let (status, body) = send(app, post_json("/api/confidence", body("EURUSD", 1.085))).await;

        assert_eq!(status, 200);
        assert_eq!(body["ok"], true);
        let overall = body["confidence"]["overall"].as_u64().unwrap();
        assert!(overall <= 100);
        assert!(body["confidence"]["grade"].is_string());
        assert!(!body["confidence"]["reasoning"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_nonpositive_price() {
        let app = app(BridgeConfig::unconfigured());
        let (status, body) = send(app, post_json("/api/confidence", body("EURUSD", 0.0))).await;

        assert_eq!(status, 400);
        assert_eq!(body["error"], "current_price must be a positive number");
    }

    #[tokio::test]
    async fn missing_indicators_is_client_error() {
        let app = app(BridgeConfig::unconfigured());
        let (status, _) = send(app, post_json("/api/confidence", json!({ "symbol": "EURUSD" }))).await;
        assert_eq!(status, 422);
    }
}
