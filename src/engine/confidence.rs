//! # engine::confidence
//!
//! **Confidence Engine**: turns an indicator snapshot plus trade context into
//! a graded, explainable recommendation.
//!
//! ## Pipeline
//!
//! ```text
//! TechnicalIndicators ─┐
//! symbol / direction  ─┼─▶ 8 factor scores ─▶ weighted sum ─▶ overall (rounded)
//! price / volume      ─┘                                      ├─▶ grade
//!                                                             ├─▶ recommendation
//! Clock ── session ────────▶ market_conditions                ├─▶ reasoning
//! RandomSource ────────────▶ multitimeframe_confluence        └─▶ sizing / warnings
//! ```
//!
//! | Factor                      | Weight |
//! |-----------------------------|--------|
//! | technical_alignment         | 0.25   |
//! | multitimeframe_confluence   | 0.20   |
//! | volume_confirmation         | 0.10   |
//! | market_conditions           | 0.15   |
//! | historical_performance      | 0.10   |
//! | risk_adjustment             | 0.10   |
//! | momentum_strength           | 0.05   |
//! | volatility_filter           | 0.05   |
//!
//! There are no suspension points here: the engine is a synchronous
//! computation over its inputs and the injected clock/random source.

use std::sync::Arc;

use chrono::Timelike;
use serde::Deserialize;
use tracing::debug;

use crate::engine::entropy::{Clock, RandomSource};
use crate::engine::profiles::{AssetClass, SymbolProfiles};
use crate::models::{
    Bollinger, ConfidenceFactors, ConfidenceResult, Direction, Grade, Horizon, Macd,
    Recommendation, RiskPosture, Stochastic, TechnicalIndicators, TradeSizing,
};

// ─── Constants ────────────────────────────────────────────────────────────────

const W_TECHNICAL:  f64 = 0.25;
const W_CONFLUENCE: f64 = 0.20;
const W_VOLUME:     f64 = 0.10;
const W_MARKET:     f64 = 0.15;
const W_HISTORY:    f64 = 0.10;
const W_RISK:       f64 = 0.10;
const W_MOMENTUM:   f64 = 0.05;
const W_VOLATILITY: f64 = 0.05;

/// Used when the caller has no accuracy history for this symbol.
pub const DEFAULT_HISTORICAL_ACCURACY: f64 = 75.0;

/// Timeframes polled for simulated confluence.
const CONFLUENCE_TIMEFRAMES: [&str; 3] = ["5m", "15m", "30m"];

// ─── Request ──────────────────────────────────────────────────────────────────

/// Everything a confidence evaluation needs from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfidenceRequest {
    pub indicators:          TechnicalIndicators,
    pub symbol:              String,
    pub direction:           Direction,
    pub current_price:       f64,
    #[serde(default)]
    pub volume:              Option<f64>,
    #[serde(default)]
    pub historical_accuracy: Option<f64>,
}

// ─── Trading Session ──────────────────────────────────────────────────────────

/// Liquidity window by UTC hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradingSession {
    Asian,
    European,
    Overlap,
    Us,
    DeadZone,
}

impl TradingSession {
    pub fn at_hour(hour: u32) -> Self {
        match hour {
            0..=6   => TradingSession::Asian,
            7..=12  => TradingSession::European,
            13..=16 => TradingSession::Overlap,
            17..=20 => TradingSession::Us,
            _       => TradingSession::DeadZone,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            TradingSession::Asian    => 0.95,
            TradingSession::European => 1.05,
            TradingSession::Overlap  => 1.15,
            TradingSession::Us       => 1.05,
            TradingSession::DeadZone => 0.80,
        }
    }
}

impl std::fmt::Display for TradingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TradingSession::Asian    => "Asian",
            TradingSession::European => "European",
            TradingSession::Overlap  => "London/New York overlap",
            TradingSession::Us       => "US",
            TradingSession::DeadZone => "dead-zone",
        };
        f.write_str(name)
    }
}

// ─── Engine ───────────────────────────────────────────────────────────────────

/// Shareable engine handle.  Cloning is O(1).
#[derive(Clone)]
pub struct ConfidenceEngine {
    profiles: Arc<SymbolProfiles>,
    clock:    Arc<dyn Clock>,
    random:   Arc<dyn RandomSource>,
}

impl ConfidenceEngine {
    pub fn new(
        profiles: Arc<SymbolProfiles>,
        clock: Arc<dyn Clock>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self { profiles, clock, random }
    }

    pub fn calculate(&self, request: &ConfidenceRequest) -> ConfidenceResult {
        self.calculate_confidence(
            &request.indicators,
            &request.symbol,
            request.direction,
            request.current_price,
            request.volume,
            request.historical_accuracy,
        )
    }

    /// Compute the eight factors, the weighted score and everything derived
    /// from it.
    pub fn calculate_confidence(
        &self,
        indicators: &TechnicalIndicators,
        symbol: &str,
        direction: Direction,
        current_price: f64,
        volume: Option<f64>,
        historical_accuracy: Option<f64>,
    ) -> ConfidenceResult {
        let profile = self.profiles.get(symbol);
        let session = TradingSession::at_hour(self.clock.now().hour());

        let technical = technical_alignment(indicators, current_price, direction);

        let factors = ConfidenceFactors {
            technical_alignment:       technical,
            multitimeframe_confluence: multitimeframe_confluence(technical, self.random.as_ref()),
            volume_confirmation:       volume_confirmation(volume, profile.expected_volume),
            market_conditions:         market_conditions(session, SymbolProfiles::classify(symbol)),
            historical_performance:    historical_performance(historical_accuracy),
            risk_adjustment:           risk_adjustment(indicators, current_price),
            momentum_strength:         momentum_strength(indicators, direction),
            volatility_filter:         volatility_filter(
                indicators.bollinger.bandwidth,
                profile.expected_volatility,
            ),
        };

        let overall = weighted_score(&factors).round() as u32;
        let grade = Grade::from_score(overall);
        let recommendation = Recommendation::from_score(overall);

        let result = ConfidenceResult {
            overall,
            grade,
            recommendation,
            reasoning: reasoning(&factors, overall, grade, symbol, direction, session),
            factors,
            sizing: sizing(overall, &factors),
            warnings: warnings(&factors, session),
        };

        debug!(
            symbol,
            %direction,
            overall,
            grade = %grade,
            recommendation = ?recommendation,
            %session,
            "Confidence evaluated"
        );

        result
    }
}

// ─── Weighted Sum ─────────────────────────────────────────────────────────────

/// Σ factor × weight.  Not re-clamped: every input is bounded already.
pub fn weighted_score(f: &ConfidenceFactors) -> f64 {
    f.technical_alignment * W_TECHNICAL
        + f.multitimeframe_confluence * W_CONFLUENCE
        + f.volume_confirmation * W_VOLUME
        + f.market_conditions * W_MARKET
        + f.historical_performance * W_HISTORY
        + f.risk_adjustment * W_RISK
        + f.momentum_strength * W_MOMENTUM
        + f.volatility_filter * W_VOLATILITY
}

// ─── [1] Technical Alignment ──────────────────────────────────────────────────

/// Mean of four directional sub-checks, each 25–100.
pub fn technical_alignment(ind: &TechnicalIndicators, price: f64, dir: Direction) -> f64 {
    let checks = [
        rsi_band(ind.rsi, dir),
        macd_agreement(&ind.macd, dir),
        bollinger_proximity(&ind.bollinger, price, dir),
        stochastic_zone(&ind.stochastic, dir),
    ];
    checks.iter().sum::<f64>() / checks.len() as f64
}

pub fn rsi_band(rsi: f64, dir: Direction) -> f64 {
    match dir {
        Direction::Long => {
            if rsi < 30.0 { 100.0 }        // oversold
            else if rsi < 50.0 { 75.0 }
            else if rsi < 70.0 { 50.0 }
            else { 25.0 }
        }
        Direction::Short => {
            if rsi > 70.0 { 100.0 }        // overbought
            else if rsi > 50.0 { 75.0 }
            else if rsi > 30.0 { 50.0 }
            else { 25.0 }
        }
    }
}

pub fn macd_agreement(macd: &Macd, dir: Direction) -> f64 {
    let s = dir.sign();
    let crossed = (macd.line - macd.signal) * s > 0.0;
    let histogram = macd.histogram * s > 0.0;

    match (crossed, histogram) {
        (true, true)   => 100.0,
        (true, false)  => 75.0,
        (false, true)  => 50.0,
        (false, false) => 25.0,
    }
}

/// Where price sits inside the band: near the lower band favours LONG, near
/// the upper band favours SHORT.
pub fn bollinger_proximity(band: &Bollinger, price: f64, dir: Direction) -> f64 {
    let width = band.upper - band.lower;
    if width.is_nan() || width <= 0.0 {
        return 50.0;
    }
    let position = (price - band.lower) / width;
    if !position.is_finite() {
        return 50.0;
    }

    match dir {
        Direction::Long => {
            if position <= 0.2 { 100.0 }
            else if position <= 0.5 { 75.0 }
            else if position <= 0.8 { 50.0 }
            else { 25.0 }
        }
        Direction::Short => {
            if position >= 0.8 { 100.0 }
            else if position >= 0.5 { 75.0 }
            else if position >= 0.2 { 50.0 }
            else { 25.0 }
        }
    }
}

pub fn stochastic_zone(stoch: &Stochastic, dir: Direction) -> f64 {
    match dir {
        Direction::Long => {
            if stoch.k < 20.0 { 100.0 }
            else if stoch.k < 50.0 { 75.0 }
            else if stoch.k < 80.0 { 50.0 }
            else { 25.0 }
        }
        Direction::Short => {
            if stoch.k > 80.0 { 100.0 }
            else if stoch.k > 50.0 { 75.0 }
            else if stoch.k > 20.0 { 50.0 }
            else { 25.0 }
        }
    }
}

// ─── [2] Multi-Timeframe Confluence ───────────────────────────────────────────

/// Each simulated timeframe agrees with probability derived from the
/// technical alignment (bounded to `[0.2, 0.9]`).
pub fn multitimeframe_confluence(technical: f64, random: &dyn RandomSource) -> f64 {
    let p = (technical / 100.0).clamp(0.2, 0.9);

    let mut agreeing = 0;
    for _timeframe in CONFLUENCE_TIMEFRAMES {
        if random.next_f64() < p {
            agreeing += 1;
        }
    }

    if agreeing == CONFLUENCE_TIMEFRAMES.len() {
        95.0
    } else {
        30.0 + 20.0 * agreeing as f64
    }
}

// ─── [3] Volume Confirmation ──────────────────────────────────────────────────

pub fn volume_confirmation(volume: Option<f64>, expected: f64) -> f64 {
    let Some(volume) = volume else {
        return 50.0;
    };
    if expected.is_nan() || expected <= 0.0 {
        return 50.0;
    }

    let ratio = volume / expected;
    if ratio >= 2.0 { 95.0 }
    else if ratio >= 1.5 { 85.0 }
    else if ratio >= 1.0 { 75.0 }
    else if ratio >= 0.5 { 60.0 }
    else { 40.0 }
}

// ─── [4] Market Conditions ────────────────────────────────────────────────────

pub fn market_conditions(session: TradingSession, class: AssetClass) -> f64 {
    let bonus = match class {
        AssetClass::Crypto  => 10.0,
        AssetClass::UsdPair => 5.0,
        AssetClass::Other   => 0.0,
    };
    (75.0 * session.multiplier() + bonus).min(95.0)
}

// ─── [5] Historical Performance ───────────────────────────────────────────────

pub fn historical_performance(accuracy: Option<f64>) -> f64 {
    accuracy
        .filter(|a| a.is_finite())
        .map(|a| a.clamp(0.0, 100.0))
        .unwrap_or(DEFAULT_HISTORICAL_ACCURACY)
}

// ─── [6] Risk Adjustment ──────────────────────────────────────────────────────

pub fn risk_adjustment(ind: &TechnicalIndicators, price: f64) -> f64 {
    let mut score: f64 = 80.0;

    let atr_pct = ind.atr / price * 100.0;
    if atr_pct > 3.0 {
        score -= 20.0;
    } else if atr_pct > 2.0 {
        score -= 10.0;
    } else if atr_pct < 0.5 {
        score -= 5.0;   // too quiet to reach TP
    }

    if ind.bollinger.squeeze {
        score += 10.0;
    }
    if ind.rsi > 80.0 || ind.rsi < 20.0 {
        score -= 15.0;
    }

    score.clamp(20.0, 95.0)
}

// ─── [7] Momentum Strength ────────────────────────────────────────────────────

pub fn momentum_strength(ind: &TechnicalIndicators, dir: Direction) -> f64 {
    let s = dir.sign();
    let mut score: f64 = 50.0;

    if ind.roc.abs() < 0.5 {
        score -= 10.0;
    } else if ind.roc * s > 0.0 {
        score += 25.0;
    }

    if ind.macd.histogram * s > 0.0 {
        score += 15.0;
    }
    if (ind.stochastic.k - ind.stochastic.d) * s > 0.0 {
        score += 10.0;
    }

    score.clamp(20.0, 95.0)
}

// ─── [8] Volatility Filter ────────────────────────────────────────────────────

pub fn volatility_filter(bandwidth: f64, expected: f64) -> f64 {
    let ratio = bandwidth / expected;
    if (0.8..=1.5).contains(&ratio) { 90.0 }
    else if (0.5..=2.0).contains(&ratio) { 75.0 }
    else if ratio < 0.3 { 50.0 }
    else { 30.0 }
}

// ─── Explanations ─────────────────────────────────────────────────────────────

fn reasoning(
    f: &ConfidenceFactors,
    overall: u32,
    grade: Grade,
    symbol: &str,
    direction: Direction,
    session: TradingSession,
) -> Vec<String> {
    let mut out = Vec::new();

    if f.technical_alignment >= 75.0 {
        out.push(format!(
            "Strong technical alignment ({:.0}/100): RSI, MACD, Bollinger and Stochastic favour {direction}",
            f.technical_alignment
        ));
    }
    if f.multitimeframe_confluence >= 70.0 {
        out.push(format!(
            "Multi-timeframe confluence supports the {direction} bias ({:.0}/100)",
            f.multitimeframe_confluence
        ));
    }
    if f.volume_confirmation >= 75.0 {
        out.push(format!("Volume at or above the {symbol} baseline confirms participation"));
    }
    if f.market_conditions >= 80.0 {
        out.push(format!("Favourable market conditions during the {session} session"));
    }
    if f.volatility_filter <= 50.0 {
        out.push(format!(
            "Warning: volatility outside the normal range for {symbol}, expect erratic fills"
        ));
    }
    if overall >= 75 {
        out.push(format!("High-quality setup (grade {grade}, score {overall})"));
    } else if overall < 60 {
        out.push(format!("Low-quality setup (grade {grade}, score {overall}), standing aside is advised"));
    }

    out
}

fn sizing(overall: u32, f: &ConfidenceFactors) -> TradeSizing {
    let lot_size_multiplier = match overall {
        85.. => 1.5,
        75.. => 1.2,
        60.. => 1.0,
        45.. => 0.5,
        _    => 0.1,
    };

    let risk_posture = if f.risk_adjustment >= 80.0 {
        RiskPosture::Increase
    } else if f.risk_adjustment >= 60.0 {
        RiskPosture::Normal
    } else {
        RiskPosture::Reduce
    };

    let horizon = if f.momentum_strength >= 80.0 {
        Horizon::ShortTerm
    } else if f.multitimeframe_confluence >= 75.0 {
        Horizon::MediumTerm
    } else {
        Horizon::LongTerm
    };

    TradeSizing { lot_size_multiplier, risk_posture, horizon }
}

fn warnings(f: &ConfidenceFactors, session: TradingSession) -> Vec<String> {
    let mut out = Vec::new();

    if f.technical_alignment < 50.0 {
        out.push("Weak technical alignment across indicators".to_string());
    }
    if f.multitimeframe_confluence < 40.0 {
        out.push("Poor multi-timeframe confluence, timeframes disagree".to_string());
    }
    if session == TradingSession::DeadZone {
        out.push("Low-activity session, reduced liquidity".to_string());
    }
    if f.volume_confirmation < 45.0 {
        out.push("Weak volume confirmation for the move".to_string());
    }
    if f.historical_performance < 40.0 {
        out.push("Poor historical accuracy for this symbol".to_string());
    }
    if f.risk_adjustment < 40.0 {
        out.push("High-risk market conditions, consider reducing position size".to_string());
    }

    out
}

// ─── Tests ────────────────────────────────────────────────────────────────────
