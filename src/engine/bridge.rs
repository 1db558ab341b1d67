//! # engine::bridge
//!
//! **MT5 bridge client**, the only place that speaks HTTP to the remote
//! MetaTrader 5 server.
//!
//! ## Bridge API Contract
//!
//! | Method | Path              | Timeout | Response                                   |
//! |--------|-------------------|---------|--------------------------------------------|
//! | POST   | `/execute`        | 10 s    | `{success, order, deal, price, error, retcode}` |
//! | GET    | `/status`         | 5 s     | `{connected, balance, equity, ...}`        |
//! | GET    | `/positions`      | 5 s     | `{positions: [...]}`                       |
//! | POST   | `/close_position` | 8 s     | `{success, deal, price, error}`            |
//! | POST   | `/symbol_info`    | 3 s     | `{symbol_info, error?}`                    |
//!
//! Loosely-typed broker JSON is parsed here into [`BrokerReply`] /
//! domain models, so nothing downstream sees ad hoc optional fields.

use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::models::{AccountInfo, Position, PositionSide, SymbolInfo};

pub const EXECUTE_TIMEOUT:   Duration = Duration::from_secs(10);
pub const STATUS_TIMEOUT:    Duration = Duration::from_secs(5);
pub const POSITIONS_TIMEOUT: Duration = Duration::from_secs(5);
pub const CLOSE_TIMEOUT:     Duration = Duration::from_secs(8);
pub const LOOKUP_TIMEOUT:    Duration = Duration::from_secs(3);

/// Per-endpoint request deadlines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeTimeouts {
    pub execute:   Duration,
    pub status:    Duration,
    pub positions: Duration,
    pub close:     Duration,
    pub lookup:    Duration,
}

impl Default for BridgeTimeouts {
    fn default() -> Self {
        Self {
            execute:   EXECUTE_TIMEOUT,
            status:    STATUS_TIMEOUT,
            positions: POSITIONS_TIMEOUT,
            close:     CLOSE_TIMEOUT,
            lookup:    LOOKUP_TIMEOUT,
        }
    }
}

#[cfg(test)]
impl BridgeTimeouts {
    /// The same deadline for every endpoint.
    pub fn uniform(limit: Duration) -> Self {
        Self { execute: limit, status: limit, positions: limit, close: limit, lookup: limit }
    }
}

// ─── Wire Payloads ────────────────────────────────────────────────────────────

/// Body of `POST /execute`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutePayload {
    pub symbol:  String,
    pub action:  &'static str,  // "BUY" | "SELL"
    pub volume:  f64,
    pub sl:      f64,
    pub tp:      f64,
    pub comment: String,
}

#[derive(Debug, Serialize)]
struct ClosePayload {
    ticket: u64,
}

#[derive(Debug, Serialize)]
struct SymbolQuery<'a> {
    symbol: &'a str,
}

/// Raw trade response shared by `/execute` and `/close_position`.
#[derive(Debug, Default, Deserialize)]
struct RawTradeReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    order:   Option<u64>,
    #[serde(default)]
    deal:    Option<u64>,
    #[serde(default)]
    price:   Option<f64>,
    #[serde(default)]
    error:   Option<String>,
    #[serde(default)]
    retcode: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    #[serde(default)]
    connected:    bool,
    balance:      Option<f64>,
    equity:       Option<f64>,
    margin:       Option<f64>,
    free_margin:  Option<f64>,
    margin_level: Option<f64>,
    currency:     Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPositions {
    #[serde(default)]
    positions: Option<Vec<RawPosition>>,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    ticket:        u64,
    #[serde(default)]
    symbol:        String,
    #[serde(rename = "type", default)]
    kind:          i64,
    #[serde(default)]
    volume:        f64,
    #[serde(default)]
    price_open:    f64,
    #[serde(default)]
    price_current: f64,
    #[serde(default)]
    profit:        f64,
    #[serde(default)]
    swap:          f64,
    #[serde(default)]
    comment:       Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSymbolReply {
    #[serde(default)]
    symbol_info: Option<SymbolInfo>,
    #[serde(default)]
    error:       Option<String>,
}

// ─── Broker Reply ─────────────────────────────────────────────────────────────

/// Validated outcome of a trade request the bridge answered.
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerReply {
    Filled { order_id: Option<u64>, price: Option<f64> },
    Rejected { reason: String },
}

/// Brokers report "no value" as `0` as often as they omit the field.
fn non_zero(v: Option<u64>) -> Option<u64> {
    v.filter(|&id| id != 0)
}

fn non_zero_price(v: Option<f64>) -> Option<f64> {
    v.filter(|p| p.is_finite() && *p != 0.0)
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

impl BrokerReply {
    /// `/execute`: ticket is `order`, falling back to `deal`.
    fn from_execute(raw: RawTradeReply) -> Self {
        if raw.success {
            BrokerReply::Filled {
                order_id: non_zero(raw.order).or(non_zero(raw.deal)),
                price:    non_zero_price(raw.price),
            }
        } else {
            let code = raw.retcode.map(|c| c.to_string()).unwrap_or_else(|| "unknown".into());
            BrokerReply::Rejected {
                reason: non_blank(raw.error).unwrap_or_else(|| format!("MT5 error code {code}")),
            }
        }
    }

    /// `/close_position`: the closing deal is the identifier.
    fn from_close(raw: RawTradeReply) -> Self {
        if raw.success {
            BrokerReply::Filled {
                order_id: non_zero(raw.deal),
                price:    non_zero_price(raw.price),
            }
        } else {
            BrokerReply::Rejected {
                reason: non_blank(raw.error)
                    .unwrap_or_else(|| "Failed to close position on MT5".to_string()),
            }
        }
    }
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Thin typed wrapper over the shared `reqwest::Client`.
///
/// `base_url = None` means unconfigured: every call short-circuits with
/// [`BridgeError::NotConfigured`] without touching the network.
#[derive(Debug, Clone)]
pub struct Mt5Client {
    http:     reqwest::Client,
    base_url: Option<String>,
    timeouts: BridgeTimeouts,
}

impl Mt5Client {
    pub fn new(http: reqwest::Client, config: &BridgeConfig) -> Self {
        Self { http, base_url: config.base_url(), timeouts: BridgeTimeouts::default() }
    }

    pub fn with_base_url(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: Some(base_url.trim_end_matches('/').to_string()),
            timeouts: BridgeTimeouts::default(),
        }
    }

    #[cfg(test)]
    pub fn with_timeouts(mut self, timeouts: BridgeTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    // ── Endpoints ─────────────────────────────────────────────────────────────

    pub async fn send_order(&self, payload: &ExecutePayload) -> Result<BrokerReply, BridgeError> {
        let raw: RawTradeReply = self.post_json("/execute", payload, self.timeouts.execute).await?;
        Ok(BrokerReply::from_execute(raw))
    }

    /// `Some(info)` only when the bridge reports itself connected.
    pub async fn account_status(&self) -> Result<Option<AccountInfo>, BridgeError> {
        let raw: RawStatus = self.get_json("/status", self.timeouts.status).await?;
        if !raw.connected {
            return Ok(None);
        }

        let defaults = AccountInfo::simulated();
        Ok(Some(AccountInfo {
            balance:      raw.balance.unwrap_or(defaults.balance),
            equity:       raw.equity.unwrap_or(defaults.equity),
            margin:       raw.margin.unwrap_or(defaults.margin),
            free_margin:  raw.free_margin.unwrap_or(defaults.free_margin),
            margin_level: raw.margin_level.unwrap_or(defaults.margin_level),
            currency:     raw.currency.unwrap_or(defaults.currency),
        }))
    }

    pub async fn positions(&self) -> Result<Vec<Position>, BridgeError> {
        let raw: RawPositions = self.get_json("/positions", self.timeouts.positions).await?;

        Ok(raw
            .positions
            .unwrap_or_default()
            .into_iter()
            .map(|p| Position {
                ticket:        p.ticket,
                symbol:        p.symbol,
                side:          PositionSide::from_mt5_type(p.kind),
                volume:        p.volume,
                open_price:    p.price_open,
                current_price: p.price_current,
                profit:        p.profit,
                swap:          p.swap,
                comment:       p.comment.unwrap_or_default(),
            })
            .collect())
    }

    pub async fn close_position(&self, ticket: u64) -> Result<BrokerReply, BridgeError> {
        let raw: RawTradeReply = self
            .post_json("/close_position", &ClosePayload { ticket }, self.timeouts.close)
            .await?;
        Ok(BrokerReply::from_close(raw))
    }

    /// Metadata for one symbol spelling.
    ///
    /// A non-OK status or an `error` field means "no such symbol" and yields
    /// `Ok(None)`; only transport/decode failures are errors.
    pub async fn symbol_info(&self, symbol: &str) -> Result<Option<SymbolInfo>, BridgeError> {
        let reply: Result<RawSymbolReply, BridgeError> = self
            .post_json("/symbol_info", &SymbolQuery { symbol }, self.timeouts.lookup)
            .await;

        match reply {
            Ok(RawSymbolReply { symbol_info: Some(info), error: None }) => Ok(Some(info)),
            Ok(RawSymbolReply { error, .. }) => {
                debug!(symbol, error = ?error, "Bridge has no metadata for symbol");
                Ok(None)
            }
            Err(BridgeError::Http { status, .. }) => {
                debug!(symbol, status, "Symbol lookup rejected by bridge");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // ── Transport ─────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<String, BridgeError> {
        let base = self.base_url.as_deref().ok_or(BridgeError::NotConfigured)?;
        Ok(format!("{base}{path}"))
    }

    async fn post_json<B, R>(&self, path: &str, body: &B, timeout: Duration) -> Result<R, BridgeError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path)?;
        let response = self
            .http
            .post(&url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| BridgeError::from_reqwest(e, timeout))?;

        read_json(response, timeout).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str, timeout: Duration) -> Result<R, BridgeError> {
        let url = self.url(path)?;
        let response = self
            .http
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| BridgeError::from_reqwest(e, timeout))?;

        read_json(response, timeout).await
    }
}

async fn read_json<R: DeserializeOwned>(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<R, BridgeError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(http_status = %status, body = %body, "MT5 bridge returned HTTP error");
        return Err(BridgeError::Http { status: status.as_u16(), body });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| BridgeError::from_reqwest(e, timeout))?;
    serde_json::from_slice(&bytes).map_err(|e| BridgeError::Decode(e.to_string()))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
