//! # models::account
//!
//! Normalized account snapshot and open-position rows returned by the
//! Account/Position Gateway.

use serde::{Deserialize, Serialize};

// ─── AccountInfo ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub balance:      f64,
    pub equity:       f64,
    pub margin:       f64,
    pub free_margin:  f64,
    pub margin_level: f64,
    pub currency:     String,
}

impl AccountInfo {
    /// Fixed snapshot served whenever the live bridge cannot be read.
    pub fn simulated() -> Self {
        Self {
            balance:      10_000.0,
            equity:       10_000.0,
            margin:       500.0,
            free_margin:  9_500.0,
            margin_level: 2_000.0,
            currency:     "USD".to_string(),
        }
    }
}

// ─── Position ─────────────────────────────────────────────────────────────────

/// MT5 position type: `0 = BUY`, `1 = SELL` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionSide {
    Buy,
    Sell,
}

impl PositionSide {
    pub fn from_mt5_type(kind: i64) -> Self {
        if kind == 1 { PositionSide::Sell } else { PositionSide::Buy }
    }
}

/// One open position on the broker account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ticket:        u64,
    pub symbol:        String,
    pub side:          PositionSide,
    pub volume:        f64,
    pub open_price:    f64,
    pub current_price: f64,
    pub profit:        f64,
    pub swap:          f64,
    pub comment:       String,
}
