//! # models::confidence
//!
//! Output types of the Confidence Engine.  Nothing here has identity; a
//! result is recomputed per request and persisted (if at all) by the caller.

use serde::{Deserialize, Serialize};

// ─── Factors ──────────────────────────────────────────────────────────────────

/// The eight sub-scores, each conceptually 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    pub technical_alignment:       f64,
    pub multitimeframe_confluence: f64,
    pub volume_confirmation:       f64,
    pub market_conditions:         f64,
    pub historical_performance:    f64,
    pub risk_adjustment:           f64,
    pub momentum_strength:         f64,
    pub volatility_filter:         f64,
}

// ─── Grade ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl Grade {
    /// Inclusive lower bounds, checked top-down.
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Grade::APlus,
            85.. => Grade::A,
            80.. => Grade::BPlus,
            75.. => Grade::B,
            70.. => Grade::CPlus,
            65.. => Grade::C,
            60.. => Grade::DPlus,
            55.. => Grade::D,
            _    => Grade::F,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A     => "A",
            Grade::BPlus => "B+",
            Grade::B     => "B",
            Grade::CPlus => "C+",
            Grade::C     => "C",
            Grade::DPlus => "D+",
            Grade::D     => "D",
            Grade::F     => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Recommendation ───────────────────────────────────────────────────────────

/// Action suggested to the user.  Thresholds are independent of [`Grade`]:
/// a score of 75 is a "B" *and* EXECUTE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Execute,
    Review,
    Skip,
}

impl Recommendation {
    pub fn from_score(score: u32) -> Self {
        match score {
            75.. => Recommendation::Execute,
            60.. => Recommendation::Review,
            _    => Recommendation::Skip,
        }
    }
}

// ─── Sizing Advice ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskPosture {
    Reduce,
    Normal,
    Increase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Horizon {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

/// Position-sizing hints derived from the score and factor breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeSizing {
    /// Multiplier applied to the user's base lot size, 0.1–1.5.
    pub lot_size_multiplier: f64,
    pub risk_posture:        RiskPosture,
    pub horizon:             Horizon,
}

// ─── Result ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    /// Weighted score, rounded to the nearest integer.
    pub overall:        u32,
    pub grade:          Grade,
    pub recommendation: Recommendation,
    /// Ordered, human-readable justification.  May be empty.
    pub reasoning:      Vec<String>,
    pub factors:        ConfidenceFactors,
    pub sizing:         TradeSizing,
    pub warnings:       Vec<String>,
}
