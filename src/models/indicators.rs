//! # models::indicators
//!
//! Defines [`TechnicalIndicators`], the normalized indicator snapshot that the
//! upstream indicator source supplies for one symbol/timeframe.
//!
//! Every field is required so that a malformed snapshot is rejected at the
//! JSON boundary instead of inside the Confidence Engine.  Values themselves
//! are broker floats with no enforced range; the engine clamps downstream.

use serde::{Deserialize, Serialize};

/// MACD line / signal line / histogram triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub line:      f64,
    pub signal:    f64,
    pub histogram: f64,
}

/// Bollinger Band envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bollinger {
    pub upper:     f64,
    pub lower:     f64,
    /// `(upper - lower) / middle`, relative width of the band.
    pub bandwidth: f64,
    /// Abnormally narrow band, often preceding a breakout.
    #[serde(default)]
    pub squeeze:   bool,
}

/// Stochastic oscillator %K / %D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stochastic {
    pub k: f64,
    pub d: f64,
}

/// Indicator snapshot consumed by the Confidence Engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    /// RSI 14-period, 0–100.
    pub rsi:        f64,
    pub macd:       Macd,
    pub bollinger:  Bollinger,
    pub stochastic: Stochastic,
    /// Average True Range in price units.
    pub atr:        f64,
    /// Rate of change in percent.  Some indicator feeds omit it for
    /// instruments without enough history; treated as flat momentum.
    #[serde(default)]
    pub roc:        f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_roc_defaults_to_flat() {
        let json = r#"{
            "rsi": 25.0,
            "macd": { "line": 1.0, "signal": 0.5, "histogram": 0.6 },
            "bollinger": { "upper": 1.02, "lower": 0.98, "bandwidth": 0.02, "squeeze": false },
            "stochastic": { "k": 15.0, "d": 18.0 },
            "atr": 0.005
        }"#;

        let indicators: TechnicalIndicators = serde_json::from_str(json).unwrap();
        assert_eq!(indicators.roc, 0.0);
        assert_eq!(indicators.macd.histogram, 0.6);
    }

    #[test]
    fn missing_macd_is_rejected() {
        let json = r#"{
            "rsi": 50.0,
            "bollinger": { "upper": 1.02, "lower": 0.98, "bandwidth": 0.02 },
            "stochastic": { "k": 50.0, "d": 50.0 },
            "atr": 0.005,
            "roc": 0.1
        }"#;

        assert!(serde_json::from_str::<TechnicalIndicators>(json).is_err());
    }
}
