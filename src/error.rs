//! # error
//!
//! Centralised error types.
//!
//! * [`AppError`]: returned by Axum handlers; `IntoResponse` turns it into a
//!   structured JSON body so callers always get a machine-readable response.
//! * [`BridgeError`]: transport-level failures talking to the MT5 bridge.
//!   These never leave the engine layer: the executor and gateway convert
//!   them into failure results or a simulated fallback.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// ─── AppError ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AppError {
    /// The request payload was syntactically correct but semantically invalid.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "ok":    false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

// ─── BridgeError ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Host or port is blank; real calls are skipped.
    #[error("MT5 server host/port not configured")]
    NotConfigured,

    #[error("MT5 request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Connection to MT5 server failed: {0}")]
    Transport(String),

    #[error("MT5 server error: {status} - {body}")]
    Http { status: u16, body: String },

    #[error("MT5 response parse error: {0}")]
    Decode(String),
}

impl BridgeError {
    /// Classify a `reqwest` failure, keeping timeouts distinguishable.
    pub fn from_reqwest(err: reqwest::Error, timeout: std::time::Duration) -> Self {
        if err.is_timeout() {
            BridgeError::Timeout(timeout)
        } else if err.is_decode() {
            BridgeError::Decode(err.to_string())
        } else {
            BridgeError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bad_request_renders_json_envelope() {
        let response = AppError::BadRequest("Valid ticket number is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Valid ticket number is required");
    }

    #[test]
    fn http_error_message_carries_status_and_body() {
        let err = BridgeError::Http { status: 502, body: "bad gateway".into() };
        assert_eq!(err.to_string(), "MT5 server error: 502 - bad gateway");
    }
}
