//! Client façade
//!
//! Owns the four request components and the router that feeds them. The
//! router is resolved once, at construction, with session first so that its
//! handlers win any name collision, then market data, orders and account.

use log::{debug, info};
use relay_ports::Transport;
use std::sync::Arc;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::handlers::{AccountComponent, MarketDataComponent, OrderComponent, SessionComponent};
use crate::messages::Event;
use crate::router::{CallbackRouter, EventHandler};
use crate::transport::EventReceiver;

pub struct Client {
    config: GatewayConfig,
    session: Arc<SessionComponent>,
    market_data: Arc<MarketDataComponent>,
    orders: Arc<OrderComponent>,
    account: Arc<AccountComponent>,
    router: CallbackRouter,
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>, config: GatewayConfig) -> Self {
        let market_data = Arc::new(MarketDataComponent::new(
            Arc::clone(&transport),
            &config.correlation,
        ));
        let orders = Arc::new(OrderComponent::new(Arc::clone(&transport)));
        let account = Arc::new(AccountComponent::new(Arc::clone(&transport)));
        let session = Arc::new(
            SessionComponent::new(Arc::clone(&transport)).with_canceller(market_data.clone()),
        );

        let candidates: [Arc<dyn EventHandler>; 4] = [
            session.clone(),
            market_data.clone(),
            orders.clone(),
            account.clone(),
        ];
        let router = CallbackRouter::new(&candidates);
        info!(
            "Client ready on {} for {}:{} (client id {}), {} callbacks bound",
            transport.name(),
            config.connection.host,
            config.connection.port,
            config.connection.client_id,
            router.bound_count()
        );

        Self {
            config,
            session,
            market_data,
            orders,
            account,
            router,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Default wait for blocking requests
    pub fn response_timeout(&self) -> Duration {
        self.config.correlation.response_timeout()
    }

    pub fn session(&self) -> &SessionComponent {
        &self.session
    }

    pub fn market_data(&self) -> &MarketDataComponent {
        &self.market_data
    }

    pub fn orders(&self) -> &OrderComponent {
        &self.orders
    }

    pub fn account(&self) -> &AccountComponent {
        &self.account
    }

    pub fn router(&self) -> &CallbackRouter {
        &self.router
    }

    /// Deliver one inbound event
    pub fn dispatch(&self, event: &Event) {
        self.router.dispatch(event);
    }

    /// Deliver events until the inbound channel closes; returns how many
    /// were delivered.
    ///
    /// Blocks the calling thread. Run it on its own thread, never on the
    /// one issuing blocking requests.
    pub fn run(&self, inbound: &mut EventReceiver) -> usize {
        let mut delivered = 0;
        while let Some(event) = inbound.blocking_next() {
            self.dispatch(&event);
            delivered += 1;
        }
        debug!("Inbound channel closed after {} events", delivered);
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_default_config;
    use crate::messages::{EventKind, PeerError};
    use crate::transport::{RecordingTransport, event_channel};

    fn client() -> (Client, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let config = load_default_config().unwrap();
        (Client::new(transport.clone(), config), transport)
    }

    #[test]
    fn test_router_priority() {
        let (client, _) = client();
        let router = client.router();

        assert_eq!(router.bound_to(EventKind::Error), Some("session"));
        assert_eq!(router.bound_to(EventKind::NextValidId), Some("session"));
        assert_eq!(router.bound_to(EventKind::HistoricalData), Some("market_data"));
        assert_eq!(router.bound_to(EventKind::OrderStatus), Some("orders"));
        assert_eq!(router.bound_to(EventKind::PositionEnd), Some("account"));
        assert_eq!(router.bound_to(EventKind::ExecDetails), None);
        assert_eq!(router.bound_to(EventKind::AccountSummary), None);
    }

    #[test]
    fn test_run_until_closed() {
        let (client, _) = client();
        let (tx, mut rx) = event_channel();

        tx.send(Event::ConnectAck).unwrap();
        tx.send(Event::Error(PeerError::new(-1, 2104, "farm OK")))
            .unwrap();
        tx.send(Event::NextValidId { order_id: 7 }).unwrap();
        drop(tx);

        assert_eq!(client.run(&mut rx), 3);
        assert!(client.session().is_connected());
        assert!(client.session().last_error(-1).is_some());
        assert_eq!(
            client.response_timeout(),
            Duration::from_millis(client.config().correlation.response_timeout_ms)
        );
    }
}
