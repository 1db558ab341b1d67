//! # models::symbol
//!
//! Broker symbol metadata (as served by `/symbol_info`) and the resolver's
//! validation verdicts.

use serde::{Deserialize, Serialize};

/// Subset of MT5 `symbol_info` the resolver cares about.
///
/// Every flag is optional: brokers disagree on which ones they publish, and
/// only an *explicit* negative signal makes a symbol untradable.  Fields
/// the resolver does not read (`name`, `digits`, ...) are ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    #[serde(default)]
    pub tradable:   Option<bool>,
    #[serde(default)]
    pub trading:    Option<bool>,
    #[serde(default)]
    pub visible:    Option<bool>,
    #[serde(default)]
    pub volume_min: Option<f64>,
}

/// Verdict of validating one piece of metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolValidation {
    pub tradable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason:   Option<String>,
}

impl SymbolValidation {
    pub fn ok() -> Self {
        Self { tradable: true, reason: None }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self { tradable: false, reason: Some(reason.into()) }
    }
}

/// The variant the resolver settled on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolValidationResult {
    pub symbol:   String,
    pub tradable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason:   Option<String>,
}
