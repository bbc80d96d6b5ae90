//! Convenience constructors for common contracts, orders and scanners

use rust_decimal::Decimal;

use crate::entities::{Action, Contract, Order, OrderType, SecurityType};
use crate::market_data::ScannerSubscription;
use crate::values::OrderId;

/// US stock routed through SMART in USD
pub fn stock_contract(symbol: impl Into<String>) -> Contract {
    Contract::new(symbol, SecurityType::Stock, "SMART", "USD")
}

/// Market order, or limit order when `limit_price` is given
pub fn simple_order(
    action: Action,
    quantity: Decimal,
    limit_price: Option<f64>,
    extended_hours: bool,
) -> Order {
    let order_type = if limit_price.is_some() {
        OrderType::Limit
    } else {
        OrderType::Market
    };

    let mut order = Order::new(action, order_type, quantity);
    order.limit_price = limit_price;
    order.outside_rth = extended_hours;
    order
}

/// Prices for a bracket order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketPrices {
    /// Parent limit price; None places a market parent
    pub limit_price: Option<f64>,
    pub take_profit_price: f64,
    pub stop_loss_price: f64,
}

/// Parent + take-profit + stop-loss.
///
/// Children use `parent_id + 1` and `parent_id + 2`. Only the stop-loss
/// transmits, which releases the whole bracket at once.
pub fn bracket_order(
    parent_id: OrderId,
    action: Action,
    quantity: Decimal,
    prices: BracketPrices,
    extended_hours: bool,
) -> [Order; 3] {
    let mut parent = simple_order(action, quantity, prices.limit_price, extended_hours);
    parent.order_id = parent_id;
    parent.transmit = false;

    let mut take_profit = if prices.limit_price.is_some() {
        let mut order = Order::new(action.opposite(), OrderType::Limit, quantity);
        order.limit_price = Some(prices.take_profit_price);
        order
    } else {
        let mut order = Order::new(action.opposite(), OrderType::MarketIfTouched, quantity);
        order.aux_price = Some(prices.take_profit_price);
        order
    };
    take_profit.order_id = parent_id + 1;
    take_profit.parent_id = parent_id;
    take_profit.transmit = false;

    let mut stop_loss = Order::new(action.opposite(), OrderType::Stop, quantity);
    stop_loss.order_id = parent_id + 2;
    stop_loss.aux_price = Some(prices.stop_loss_price);
    stop_loss.parent_id = parent_id;
    stop_loss.transmit = true;

    [parent, take_profit, stop_loss]
}

/// Scanner subscription with the given codes; bounds are set with the
/// `ScannerSubscription` builder methods
pub fn scanner_subscription(
    instrument: impl Into<String>,
    location_code: impl Into<String>,
    scan_code: impl Into<String>,
    number_of_rows: i32,
) -> ScannerSubscription {
    ScannerSubscription {
        instrument: instrument.into(),
        location_code: location_code.into(),
        scan_code: scan_code.into(),
        number_of_rows,
        ..Default::default()
    }
}

/// Most active US major-exchange stocks, top 50
pub fn most_active_stocks() -> ScannerSubscription {
    scanner_subscription("STK", "STK.US.MAJOR", "MOST_ACTIVE", 50)
}

impl ScannerSubscription {
    pub fn with_price_range(mut self, above: Option<f64>, below: Option<f64>) -> Self {
        self.above_price = above;
        self.below_price = below;
        self
    }

    pub fn with_min_volume(mut self, above_volume: f64) -> Self {
        self.above_volume = Some(above_volume);
        self
    }

    pub fn with_market_cap_range(mut self, above: Option<f64>, below: Option<f64>) -> Self {
        self.market_cap_above = above;
        self.market_cap_below = below;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_stock_contract() {
        let contract = stock_contract("AAPL");
        assert_eq!(contract.sec_type, SecurityType::Stock);
        assert_eq!(contract.exchange, "SMART");
        assert_eq!(contract.currency, "USD");
    }

    #[test]
    fn test_simple_order_types() {
        let limit = simple_order(Action::Buy, dec!(50), Some(150.0), false);
        assert_eq!(limit.order_type, OrderType::Limit);
        assert_eq!(limit.limit_price, Some(150.0));

        let market = simple_order(Action::Sell, dec!(50), None, true);
        assert_eq!(market.order_type, OrderType::Market);
        assert!(market.outside_rth);
    }

    #[test]
    fn test_bracket_order_limit_parent() {
        let prices = BracketPrices {
            limit_price: Some(100.0),
            take_profit_price: 110.0,
            stop_loss_price: 95.0,
        };
        let [parent, take_profit, stop_loss] =
            bracket_order(10, Action::Buy, dec!(5), prices, false);

        assert_eq!(parent.order_id, 10);
        assert!(!parent.transmit);

        assert_eq!(take_profit.order_id, 11);
        assert_eq!(take_profit.parent_id, 10);
        assert_eq!(take_profit.action, Action::Sell);
        assert_eq!(take_profit.order_type, OrderType::Limit);
        assert_eq!(take_profit.limit_price, Some(110.0));
        assert!(!take_profit.transmit);

        assert_eq!(stop_loss.order_id, 12);
        assert_eq!(stop_loss.order_type, OrderType::Stop);
        assert_eq!(stop_loss.aux_price, Some(95.0));
        assert!(stop_loss.transmit);
    }

    #[test]
    fn test_bracket_order_market_parent() {
        let prices = BracketPrices {
            limit_price: None,
            take_profit_price: 90.0,
            stop_loss_price: 105.0,
        };
        let [parent, take_profit, _] = bracket_order(20, Action::Sell, dec!(1), prices, false);

        assert_eq!(parent.order_type, OrderType::Market);
        assert_eq!(take_profit.order_type, OrderType::MarketIfTouched);
        assert_eq!(take_profit.aux_price, Some(90.0));
        assert_eq!(take_profit.action, Action::Buy);
    }

    #[test]
    fn test_scanner_bounds() {
        let sub = most_active_stocks()
            .with_price_range(Some(5.0), None)
            .with_min_volume(1_000_000.0);
        assert_eq!(sub.scan_code, "MOST_ACTIVE");
        assert_eq!(sub.above_price, Some(5.0));
        assert_eq!(sub.below_price, None);
        assert_eq!(sub.above_volume, Some(1_000_000.0));
        assert_eq!(sub.rows(), Some(50));
    }
}
