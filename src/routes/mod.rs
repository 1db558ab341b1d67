pub mod confidence;
pub mod mt5;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::require_api_key;
use crate::state::SharedState;

use confidence::calculate_confidence;
use mt5::{account_info, close_position, execute_order, health_check, list_positions, resolve_symbol};

/// Every API route plus auth.  Transport layers (trace, CORS) are added by
/// `main`.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        // ── Health ────────────────────────────────────────────────────────────
        .route("/api/health",              get(health_check))
        // ── Confidence ────────────────────────────────────────────────────────
        .route("/api/confidence",          post(calculate_confidence))
        // ── MT5 Bridge ────────────────────────────────────────────────────────
        .route("/api/mt5/execute",         post(execute_order))
        .route("/api/mt5/account",         get(account_info))
        .route("/api/mt5/positions",       get(list_positions))
        .route("/api/mt5/close-position",  post(close_position))
        .route("/api/mt5/symbol",          post(resolve_symbol))
        // ── Middleware ────────────────────────────────────────────────────────
        .layer(axum::middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, Router};
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::{BridgeConfig, SimulationConfig};
    use crate::engine::entropy::{FixedClock, ScriptedRandom};
    use crate::state::{AppState, SharedState, StateParts};

    pub fn state(bridge: BridgeConfig, api_key: Option<&str>) -> SharedState {
        Arc::new(AppState::new(StateParts {
            bridge,
            simulation: SimulationConfig::instant(),
            clock: Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 3, 5, 14, 0, 0).unwrap())),
            random: Arc::new(ScriptedRandom::constant(0.0)),
            api_key: api_key.map(str::to_string),
        }))
    }

    pub fn app(bridge: BridgeConfig) -> Router {
        super::build_router(state(bridge, None))
    }

    pub async fn send(app: Router, request: Request<Body>) -> (u16, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    pub fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use crate::config::BridgeConfig;
    use axum::{body::Body, http::Request};

    #[tokio::test]
    async fn api_key_guards_everything_but_health() {
        let app = super::build_router(state(BridgeConfig::unconfigured(), Some("s3cret")));

        let (status, _) = send(app.clone(), get("/api/health")).await;
        assert_eq!(status, 200);

        let (status, body) = send(app.clone(), get("/api/mt5/account")).await;
        assert_eq!(status, 401);
        assert_eq!(body["ok"], false);

        let authed = Request::get("/api/mt5/account")
            .header("X-API-Key", "s3cret")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, authed).await;
        assert_eq!(status, 200);
        assert_eq!(body["account"]["currency"], "USD");
    }

    #[tokio::test]
    async fn no_api_key_is_dev_mode() {
        let (status, _) = send(app(BridgeConfig::unconfigured()), get("/api/mt5/positions")).await;
        assert_eq!(status, 200);
    }
}
