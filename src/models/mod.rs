//! Domain models shared across the whole signal bridge.

pub mod account;
pub mod confidence;
pub mod indicators;
pub mod order;
pub mod symbol;

pub use account::{AccountInfo, Position, PositionSide};
pub use confidence::{
    ConfidenceFactors, ConfidenceResult, Grade, Horizon, Recommendation, RiskPosture, TradeSizing,
};
pub use indicators::{Bollinger, Macd, Stochastic, TechnicalIndicators};
pub use order::{Direction, ExecutionStage, Mt5OrderRequest, Mt5OrderResult};
pub use symbol::{SymbolInfo, SymbolValidation, SymbolValidationResult};
