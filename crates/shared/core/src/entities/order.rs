use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Action, OrderType};
use crate::values::OrderId;

/// Order ticket sent to the peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// 0 until the order is placed; bracket children carry their own id
    pub order_id: OrderId,
    pub action: Action,
    pub order_type: OrderType,
    pub total_quantity: Decimal,
    /// Required for limit orders
    pub limit_price: Option<f64>,
    /// Trigger price for stop / market-if-touched orders
    pub aux_price: Option<f64>,
    /// Parent order id for bracket children (0 = none)
    pub parent_id: OrderId,
    /// Whether the peer should transmit immediately
    pub transmit: bool,
    /// Allow execution outside regular trading hours
    pub outside_rth: bool,
}

impl Order {
    /// Create a transmitting order with no prices set
    pub fn new(action: Action, order_type: OrderType, total_quantity: Decimal) -> Self {
        Self {
            order_id: 0,
            action,
            order_type,
            total_quantity,
            limit_price: None,
            aux_price: None,
            parent_id: 0,
            transmit: true,
            outside_rth: false,
        }
    }

    /// Validate the order based on order type requirements
    pub fn validate(&self) -> bool {
        if self.total_quantity <= Decimal::ZERO {
            return false;
        }
        match self.order_type {
            OrderType::Market => true,
            OrderType::Limit => self.limit_price.is_some(),
            OrderType::MarketIfTouched | OrderType::Stop => self.aux_price.is_some(),
        }
    }

    /// Whether this order is a bracket child
    pub fn is_child(&self) -> bool {
        self.parent_id != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate() {
        let market = Order::new(Action::Buy, OrderType::Market, dec!(10));
        assert!(market.validate());

        let mut limit = Order::new(Action::Sell, OrderType::Limit, dec!(10));
        assert!(!limit.validate());
        limit.limit_price = Some(101.5);
        assert!(limit.validate());

        let empty = Order::new(Action::Buy, OrderType::Market, dec!(0));
        assert!(!empty.validate());
    }
}
