//! # engine::profiles
//!
//! Per-symbol market expectations used by the Confidence Engine: the volume
//! a "normal" bar should carry and the Bollinger bandwidth considered normal
//! volatility.  Built once at startup and shared read-only.

use std::collections::HashMap;

/// Crypto tickers recognised by prefix.
const CRYPTO_PREFIXES: [&str; 6] = ["BTC", "ETH", "LTC", "XRP", "SOL", "DOGE"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolProfile {
    /// Baseline volume per bar.
    pub expected_volume:     f64,
    /// Baseline Bollinger bandwidth.
    pub expected_volatility: f64,
}

/// Liquidity bucket, drives the market-conditions bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    Crypto,
    UsdPair,
    Other,
}

#[derive(Debug, Clone)]
pub struct SymbolProfiles {
    entries:  HashMap<String, SymbolProfile>,
    fallback: SymbolProfile,
}

impl SymbolProfiles {
    pub fn new(fallback: SymbolProfile) -> Self {
        Self { entries: HashMap::new(), fallback }
    }

    pub fn with(mut self, symbol: &str, expected_volume: f64, expected_volatility: f64) -> Self {
        self.entries.insert(
            symbol.to_uppercase(),
            SymbolProfile { expected_volume, expected_volatility },
        );
        self
    }

    /// Look up a symbol, tolerating broker suffixes (`EURUSDpm`) and
    /// separators (`EUR/USD`).  Unknown symbols get the fallback row.
    pub fn get(&self, symbol: &str) -> SymbolProfile {
        let key = normalize(symbol);
        if let Some(profile) = self.entries.get(&key) {
            return *profile;
        }

        self.entries
            .iter()
            .filter(|(known, _)| key.starts_with(known.as_str()))
            .max_by_key(|(known, _)| known.len())
            .map(|(_, profile)| *profile)
            .unwrap_or(self.fallback)
    }

    pub fn classify(symbol: &str) -> AssetClass {
        let key = normalize(symbol);
        if CRYPTO_PREFIXES.iter().any(|p| key.starts_with(p)) {
            AssetClass::Crypto
        } else if key.contains("USD") {
            AssetClass::UsdPair
        } else {
            AssetClass::Other
        }
    }
}

impl Default for SymbolProfiles {
    fn default() -> Self {
        SymbolProfiles::new(SymbolProfile { expected_volume: 10_000.0, expected_volatility: 0.02 })
            // ── Majors ───────────────────────────────────────────────────────
            .with("EURUSD", 50_000.0, 0.015)
            .with("GBPUSD", 40_000.0, 0.020)
            .with("USDJPY", 45_000.0, 0.015)
            .with("USDCHF", 25_000.0, 0.015)
            .with("AUDUSD", 30_000.0, 0.018)
            .with("USDCAD", 30_000.0, 0.015)
            .with("NZDUSD", 20_000.0, 0.018)
            // ── Crosses ──────────────────────────────────────────────────────
            .with("EURGBP", 20_000.0, 0.012)
            .with("EURJPY", 25_000.0, 0.020)
            .with("GBPJPY", 20_000.0, 0.030)
            // ── Metals / Indices ─────────────────────────────────────────────
            .with("XAUUSD", 30_000.0, 0.030)
            .with("XAGUSD", 10_000.0, 0.040)
            .with("US30", 15_000.0, 0.025)
            .with("NAS100", 15_000.0, 0.030)
            // ── Crypto ───────────────────────────────────────────────────────
            .with("BTCUSD", 1_000.0, 0.060)
            .with("ETHUSD", 5_000.0, 0.070)
    }
}

fn normalize(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| *c != '/' && *c != '.')
        .collect::<String>()
        .to_uppercase()
}
