//! # models::order
//!
//! Order request/result value types exchanged with the Execution Bridge.
//!
//! ## Lifecycle
//! `Mt5OrderRequest` is built by the caller, consumed once by the bridge and
//! never persisted here. Storing the returned `Mt5OrderResult` next to the
//! trade identifier is the persistence layer's job.

use serde::{Deserialize, Serialize};

// ─── Direction ────────────────────────────────────────────────────────────────

/// Directional bias of a signal or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// MT5 bridge action string.
    #[inline]
    pub fn action(self) -> &'static str {
        match self {
            Direction::Long  => "BUY",
            Direction::Short => "SELL",
        }
    }

    /// `+1.0` for LONG, `-1.0` for SHORT.  Lets the engine test "agrees
    /// with direction" as a sign check.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long  => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long  => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

// ─── Order Request ────────────────────────────────────────────────────────────

/// An order the caller wants placed on MT5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mt5OrderRequest {
    /// Canonical symbol, e.g. `"EURUSD"`.
    pub symbol:      String,
    pub direction:   Direction,
    /// Lots, must be > 0.
    pub lot_size:    f64,
    /// Price the signal was generated at; anchor for simulated slippage.
    pub entry_price: f64,
    pub take_profit: f64,
    pub stop_loss:   f64,
    #[serde(default)]
    pub comment:     Option<String>,
}

// ─── Order Result ─────────────────────────────────────────────────────────────

/// Who answered a request: the broker or the simulator.
///
/// For orders this is the leg of the two-stage execution strategy.  Closes
/// are never simulated, so a close result is always `RealAttempt`, meaning
/// the broker (or the failed attempt to reach it) produced the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStage {
    /// The broker bridge answered, or was tried and failed.
    RealAttempt,
    /// The simulator produced the fill (or the simulated failure).
    SimulatedFallback,
}

/// Outcome of an execute or close request.
///
/// `success = true` with `order_id = None` is legitimate: some bridges omit
/// the ticket.  When `success = false`, `error` carries the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mt5OrderResult {
    pub success:         bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id:        Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error:           Option<String>,
    pub stage:           ExecutionStage,
}

impl Mt5OrderResult {
    pub fn filled(stage: ExecutionStage, order_id: Option<u64>, execution_price: Option<f64>) -> Self {
        Self {
            success: true,
            order_id,
            execution_price,
            error: None,
            stage,
        }
    }

    pub fn failed(stage: ExecutionStage, error: impl Into<String>) -> Self {
        Self {
            success:         false,
            order_id:        None,
            execution_price: None,
            error:           Some(error.into()),
            stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_wire_format() {
        assert_eq!(serde_json::to_string(&Direction::Long).unwrap(), r#""LONG""#);
        let parsed: Direction = serde_json::from_str(r#""SHORT""#).unwrap();
        assert_eq!(parsed, Direction::Short);
        assert_eq!(parsed.action(), "SELL");
    }

    #[test]
    fn failed_result_omits_fill_fields() {
        let result = Mt5OrderResult::failed(ExecutionStage::RealAttempt, "Position not found");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Position not found");
        assert_eq!(json["stage"], "REAL_ATTEMPT");
        assert!(json.get("order_id").is_none());
    }
}
