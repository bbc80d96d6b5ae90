//! Order and account callback payloads

use relay_core::{Contract, Order, OrderId, RequestId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `orderStatus` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub order_id: OrderId,
    /// Peer status string (`Submitted`, `Filled`, `Cancelled`, ...)
    pub status: String,
    pub filled: Decimal,
    pub remaining: Decimal,
    pub avg_fill_price: f64,
    pub perm_id: i64,
    pub parent_id: OrderId,
    pub last_fill_price: f64,
    pub client_id: i32,
    pub why_held: String,
    pub mkt_cap_price: f64,
}

impl OrderStatusUpdate {
    /// Minimal status with the remaining fields zeroed
    pub fn new(
        order_id: OrderId,
        status: impl Into<String>,
        filled: Decimal,
        remaining: Decimal,
    ) -> Self {
        Self {
            order_id,
            status: status.into(),
            filled,
            remaining,
            avg_fill_price: 0.0,
            perm_id: 0,
            parent_id: 0,
            last_fill_price: 0.0,
            client_id: 0,
            why_held: String::new(),
            mkt_cap_price: 0.0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// `openOrder` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub order_id: OrderId,
    pub contract: Contract,
    pub order: Order,
    pub status: String,
}

/// `execDetails` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub request_id: RequestId,
    pub contract: Contract,
    pub exec_id: String,
    pub order_id: OrderId,
    pub shares: Decimal,
    pub price: f64,
}

/// `accountSummary` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountValue {
    pub request_id: RequestId,
    pub account: String,
    pub tag: String,
    pub value: String,
    pub currency: String,
}
