//! # engine::symbols
//!
//! **Symbol Resolver**. Brokers list the same instrument under different
//! spellings (`EURUSD`, `EURUSDm`, `EURUSDpm`, `EUR/USD` …).  The resolver
//! generates candidate spellings, queries the broker for each one in order and
//! settles on the first the broker will actually trade.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::engine::bridge::Mt5Client;
use crate::error::BridgeError;
use crate::models::{SymbolInfo, SymbolValidation, SymbolValidationResult};

/// Volume floors above this many lots are treated as untradable.
const MAX_VOLUME_MIN: f64 = 0.1;

// ─── Variants ─────────────────────────────────────────────────────────────────

/// Candidate broker spellings of `symbol`, most likely first.
///
/// Always ten entries in a fixed order; duplicates are kept so the lookup
/// order stays predictable.
pub fn variants_for(symbol: &str) -> Vec<String> {
    vec![
        symbol.to_string(),
        format!("{symbol}m"),
        format!("{symbol}pm"),
        format!("{symbol}."),
        format!("{symbol}r"),
        format!("{symbol}pro"),
        symbol.replacen('/', "", 1),
        symbol.replacen('.', "", 1),
        symbol.to_uppercase(),
        symbol.to_lowercase(),
    ]
}

// ─── Validation ───────────────────────────────────────────────────────────────

/// Decide whether broker metadata describes a symbol we can trade.
///
/// Fails closed: no metadata is a rejection.  Flags the broker omits are
/// not held against the symbol, only explicit `false` values are.
pub fn validate(info: Option<&SymbolInfo>, symbol: &str) -> SymbolValidation {
    let Some(info) = info else {
        debug!(symbol, "No symbol metadata to validate");
        return SymbolValidation::rejected("Symbol info not provided");
    };

    if info.tradable == Some(false) || info.trading == Some(false) {
        return SymbolValidation::rejected("Symbol is not tradable");
    }
    if info.visible == Some(false) {
        return SymbolValidation::rejected("Symbol is not visible");
    }
    if info.volume_min.is_some_and(|v| v > MAX_VOLUME_MIN) {
        return SymbolValidation::rejected("Minimum volume too high");
    }

    SymbolValidation::ok()
}

// ─── Metadata Source ──────────────────────────────────────────────────────────

/// Anything that can answer "what does the broker know about this spelling?".
///
/// `Ok(None)` means the broker has no such symbol; `Err` is a failed lookup.
#[async_trait]
pub trait SymbolMetadataSource: Send + Sync {
    async fn symbol_info(&self, symbol: &str) -> Result<Option<SymbolInfo>, BridgeError>;
}

#[async_trait]
impl SymbolMetadataSource for Mt5Client {
    async fn symbol_info(&self, symbol: &str) -> Result<Option<SymbolInfo>, BridgeError> {
        Mt5Client::symbol_info(self, symbol).await
    }
}

// ─── Resolution ───────────────────────────────────────────────────────────────

/// Query every variant of `symbol` in order and return the first tradable one.
///
/// Lookups run one at a time.  A failed lookup is recorded as an untradable
/// candidate carrying the error text; a variant the broker does not know is
/// skipped.  When nothing is tradable the first recorded candidate is
/// returned, or the input symbol itself if nothing was recorded at all.
pub async fn find_tradable_variant(
    source: &dyn SymbolMetadataSource,
    symbol: &str,
) -> SymbolValidationResult {
    let mut recorded: Vec<SymbolValidationResult> = Vec::new();

    for variant in variants_for(symbol) {
        let info = match source.symbol_info(&variant).await {
            Ok(Some(info)) => info,
            Ok(None) => continue,
            Err(e) => {
                warn!(symbol, variant = %variant, error = %e, "Symbol lookup failed");
                recorded.push(SymbolValidationResult {
                    symbol:   variant,
                    tradable: false,
                    reason:   Some(e.to_string()),
                });
                continue;
            }
        };

        let verdict = validate(Some(&info), &variant);
        if verdict.tradable {
            info!(symbol, resolved = %variant, "🔎 Tradable symbol variant found");
            return SymbolValidationResult { symbol: variant, tradable: true, reason: None };
        }

        debug!(variant = %variant, reason = ?verdict.reason, "Variant rejected");
        recorded.push(SymbolValidationResult {
            symbol:   variant,
            tradable: false,
            reason:   verdict.reason,
        });
    }

    recorded.into_iter().next().unwrap_or_else(|| {
        warn!(symbol, "No tradable symbol variant found");
        SymbolValidationResult {
            symbol:   symbol.to_string(),
            tradable: false,
            reason:   Some("No tradable variation found".to_string()),
        }
    })
}

/// HTTP form of [`find_tradable_variant`] against the bridge at `base_url`.
pub async fn find_tradable_symbol(
    http: &reqwest::Client,
    base_url: &str,
    symbol: &str,
) -> SymbolValidationResult {
    let client = Mt5Client::with_base_url(http.clone(), base_url);
    find_tradable_variant(&client, symbol).await
}

// ─── Tests ────────────────────────────────────────────────────────────────────
