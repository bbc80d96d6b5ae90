//! Order component
//!
//! Tracks the remaining quantity of every order placed through it. An order's
//! state lives from placement until the peer reports nothing left to fill.

use log::{info, warn};
use relay_core::builders::{BracketPrices, bracket_order, simple_order, stock_contract};
use relay_core::{Action, Contract, OrderId, OrderRequest};
use relay_correlation::{CorrelationError, Correlator, Reply};
use relay_ports::{OutboundRequest, Transport};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::{bind, ensure_not_reserved, mismatched};
use crate::error::{GatewayError, GatewayResult};
use crate::messages::{Event, OrderStatusUpdate};
use crate::router::{EventHandler, HandlerTable};

pub struct OrderComponent {
    transport: Arc<dyn Transport>,
    /// Remaining quantity per live order
    remaining: Correlator<Decimal>,
}

impl OrderComponent {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            remaining: Correlator::new(),
        }
    }

    pub fn place_order(&self, request: OrderRequest) -> GatewayResult<()> {
        let OrderRequest {
            order_id,
            contract,
            order,
        } = request;

        ensure_not_reserved(order_id)?;
        if !order.validate() {
            return Err(GatewayError::InvalidRequest(format!(
                "order {} failed validation: {:?} {} {}",
                order_id,
                order.action,
                order.total_quantity,
                order.order_type.as_str()
            )));
        }

        info!(
            "Placing order: {}, {}, action: {}, total quantity: {}, orderType: {}",
            order_id,
            contract.label(),
            order.action.as_str(),
            order.total_quantity,
            order.order_type.as_str()
        );

        // Tracked before sending so an immediate fill cannot race the insert
        self.remaining.store(order_id, order.total_quantity);
        if let Err(e) = self.transport.send(OutboundRequest::PlaceOrder {
            order_id,
            contract,
            order,
        }) {
            self.remaining.delete(order_id);
            return Err(e.into());
        }
        Ok(())
    }

    /// Buy `quantity` shares of `symbol`; market order unless `limit_price` is set
    pub fn place_buy_order(
        &self,
        order_id: OrderId,
        symbol: &str,
        quantity: Decimal,
        limit_price: Option<f64>,
        extended_hours: bool,
    ) -> GatewayResult<()> {
        self.place_simple(order_id, Action::Buy, symbol, quantity, limit_price, extended_hours)
    }

    /// Sell `quantity` shares of `symbol`; market order unless `limit_price` is set
    pub fn place_sell_order(
        &self,
        order_id: OrderId,
        symbol: &str,
        quantity: Decimal,
        limit_price: Option<f64>,
        extended_hours: bool,
    ) -> GatewayResult<()> {
        self.place_simple(order_id, Action::Sell, symbol, quantity, limit_price, extended_hours)
    }

    fn place_simple(
        &self,
        order_id: OrderId,
        action: Action,
        symbol: &str,
        quantity: Decimal,
        limit_price: Option<f64>,
        extended_hours: bool,
    ) -> GatewayResult<()> {
        let order = simple_order(action, quantity, limit_price, extended_hours);
        self.place_order(OrderRequest::new(order_id, stock_contract(symbol), order))
    }

    /// Place parent, take-profit and stop-loss as one bracket.
    ///
    /// Uses ids `parent_id`, `parent_id + 1` and `parent_id + 2`; only the last
    /// order transmits, so the peer activates the bracket once all three
    /// arrived.
    pub fn place_bracket_order(
        &self,
        parent_id: OrderId,
        contract: Contract,
        action: Action,
        quantity: Decimal,
        prices: BracketPrices,
        extended_hours: bool,
    ) -> GatewayResult<[OrderId; 3]> {
        let orders = bracket_order(parent_id, action, quantity, prices, extended_hours);
        let ids = [orders[0].order_id, orders[1].order_id, orders[2].order_id];

        for order in orders {
            self.place_order(OrderRequest::new(order.order_id, contract.clone(), order))?;
        }
        Ok(ids)
    }

    pub fn cancel_order(&self, order_id: OrderId) -> GatewayResult<()> {
        info!("Cancelling order: {}", order_id);
        self.transport
            .send(OutboundRequest::CancelOrder { order_id })?;
        Ok(())
    }

    pub fn request_global_cancel(&self) -> GatewayResult<()> {
        info!("Requesting global cancel");
        self.transport.send(OutboundRequest::GlobalCancel)?;
        Ok(())
    }

    /// Whether the order is still live
    pub fn fetch_order_status(&self, order_id: OrderId) -> bool {
        self.remaining.exists(order_id)
    }

    /// Quantity left to fill; `NotFound` once the order is done
    pub fn remaining_quantity(&self, order_id: OrderId) -> GatewayResult<Decimal> {
        match self.remaining.peek(order_id)? {
            Reply::Value(quantity) => Ok(quantity),
            _ => Err(CorrelationError::NotFound(order_id).into()),
        }
    }

    /// Orders still being tracked
    pub fn live_orders(&self) -> Vec<OrderId> {
        let mut ids = self.remaining.keys();
        ids.sort_unstable();
        ids
    }

    pub fn on_order_status(&self, update: &OrderStatusUpdate) {
        info!(
            "Received order status: {}, {}, filled {}, remaining {}, avg fill {}, parent {}",
            update.order_id,
            update.status,
            update.filled,
            update.remaining,
            update.avg_fill_price,
            update.parent_id
        );

        if update.is_done() {
            self.remaining.delete(update.order_id);
        } else {
            if !self.remaining.exists(update.order_id) {
                warn!("Status for untracked order {}, tracking it", update.order_id);
            }
            self.remaining.store(update.order_id, update.remaining);
        }
    }
}

impl EventHandler for OrderComponent {
    fn name(&self) -> &str {
        "orders"
    }

    fn handlers(self: Arc<Self>) -> HandlerTable {
        HandlerTable::new().on(
            "on_order_status",
            bind(&self, |s, event| match event {
                Event::OrderStatus(update) => s.on_order_status(update),
                other => mismatched("orders", "on_order_status", other),
            }),
        )
    }
}
