//! # engine::gateway
//!
//! Account/Position Gateway: read-only account and position queries plus
//! position close.  Reads degrade to a simulated/empty answer; close reports
//! failure as a result value.

use tracing::{info, warn};

use crate::engine::bridge::{BrokerReply, Mt5Client};
use crate::error::BridgeError;
use crate::models::{AccountInfo, ExecutionStage, Mt5OrderResult, Position};

#[derive(Debug, Clone)]
pub struct AccountGateway {
    client: Mt5Client,
}

impl AccountGateway {
    pub fn new(client: Mt5Client) -> Self {
        Self { client }
    }

    /// Live account snapshot, or the simulated one if the bridge is
    /// unreachable, unconfigured or reports itself disconnected.
    pub async fn get_account_info(&self) -> AccountInfo {
        match self.client.account_status().await {
            Ok(Some(info)) => info,
            Ok(None) => {
                info!("MT5 bridge not connected, returning simulated account");
                AccountInfo::simulated()
            }
            Err(BridgeError::NotConfigured) => AccountInfo::simulated(),
            Err(e) => {
                warn!(error = %e, "Failed to fetch MT5 account info");
                AccountInfo::simulated()
            }
        }
    }

    pub async fn get_positions(&self) -> Vec<Position> {
        match self.client.positions().await {
            Ok(positions) => positions,
            Err(BridgeError::NotConfigured) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to fetch MT5 positions");
                Vec::new()
            }
        }
    }

    pub async fn close_position(&self, ticket: u64) -> Mt5OrderResult {
        // Closes have no simulated leg.
        let stage = ExecutionStage::RealAttempt;

        match self.client.close_position(ticket).await {
            Ok(BrokerReply::Filled { order_id, price }) => {
                info!(ticket, deal = ?order_id, "✅ Position closed");
                Mt5OrderResult::filled(stage, order_id, price)
            }
            Ok(BrokerReply::Rejected { reason }) => {
                warn!(ticket, reason = %reason, "MT5 refused to close position");
                Mt5OrderResult::failed(stage, reason)
            }
            Err(BridgeError::NotConfigured) => Mt5OrderResult::failed(stage, "MT5 server not configured"),
            Err(e) => {
                warn!(ticket, error = %e, "Close position request failed");
                Mt5OrderResult::failed(stage, e.to_string())
            }
        }
    }
}
