use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Contract;

/// Position reported by the peer for one account/contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionData {
    pub account: String,
    pub contract: Contract,
    /// Signed position (negative = short)
    pub position: Decimal,
    pub avg_cost: f64,
}

impl PositionData {
    pub fn new(
        account: impl Into<String>,
        contract: Contract,
        position: Decimal,
        avg_cost: f64,
    ) -> Self {
        Self {
            account: account.into(),
            contract,
            position,
            avg_cost,
        }
    }

    /// Flat positions are still reported until the session ends
    pub fn is_flat(&self) -> bool {
        self.position.is_zero()
    }
}
