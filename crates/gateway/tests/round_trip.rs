//! Integration test: Client <-> scripted peer over channel transports
//!
//! Tests the full round-trip:
//! Caller -> Component -> ChannelTransport -> Peer -> EventSender -> Router -> Component -> Caller

use relay_core::builders::stock_contract;
use relay_core::{
    BarData, BarType, ContractDetails, HistoricalDataRequest, OrderType, PositionData,
};
use relay_gateway::messages::{
    ContractDetailsRow, HistoricalBar, HistoricalDataEnd, OrderStatusUpdate, PeerError,
};
use relay_gateway::transport::OutboundReceiver;
use relay_gateway::{
    ChannelTransport, Client, Event, EventSender, event_channel, load_default_config,
};
use relay_correlation::CorrelationError;
use relay_gateway::GatewayError;
use relay_ports::OutboundRequest;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(5);

fn bar(date: &str, close: f64) -> BarData {
    BarData {
        date: date.to_string(),
        open: close - 0.5,
        high: close + 0.5,
        low: close - 1.0,
        close,
        volume: dec!(1000),
        wap: dec!(0),
        bar_count: 10,
    }
}

/// Answers requests the way the peer would, until asked for a global cancel,
/// which it treats as a disconnect
fn fake_peer(mut outbound: OutboundReceiver, events: EventSender) {
    events.send(Event::NextValidId { order_id: 1 }).unwrap();
    events.send(Event::ConnectAck).unwrap();

    while let Some(request) = outbound.blocking_next() {
        match request {
            OutboundRequest::RequestIds { .. } => {
                events.send(Event::NextValidId { order_id: 100 }).unwrap();
            }
            OutboundRequest::RequestCurrentTime => {
                events.send(Event::CurrentTime { time: 1_701_423_000 }).unwrap();
            }
            OutboundRequest::RequestContractDetails { request_id, contract } => {
                if contract.symbol == "AAPL" {
                    for (con_id, exchange) in [(265598, "NASDAQ"), (38708077, "MEXI")] {
                        let mut listed = contract.clone().with_con_id(con_id);
                        listed.exchange = exchange.to_string();
                        events
                            .send(Event::ContractDetails(ContractDetailsRow {
                                request_id,
                                details: ContractDetails::new(listed, "APPLE INC", 0.01),
                            }))
                            .unwrap();
                    }
                    events.send(Event::ContractDetailsEnd { request_id }).unwrap();
                } else {
                    events
                        .send(Event::Error(PeerError::new(
                            request_id,
                            200,
                            "No security definition has been found for the request",
                        )))
                        .unwrap();
                }
            }
            OutboundRequest::PlaceOrder { order_id, order, .. } => {
                let qty = order.total_quantity;
                events
                    .send(Event::OrderStatus(OrderStatusUpdate::new(
                        order_id,
                        "Submitted",
                        dec!(0),
                        qty,
                    )))
                    .unwrap();
                if order.order_type == OrderType::Market {
                    events
                        .send(Event::OrderStatus(OrderStatusUpdate::new(
                            order_id, "Filled", qty, dec!(0),
                        )))
                        .unwrap();
                }
            }
            OutboundRequest::RequestHistoricalData(request) => {
                let request_id = request.request_id;
                let bars = [
                    ("20231201 09:30:00 US/Eastern", 190.0),
                    ("20231201 09:31:00 US/Eastern", 190.5),
                ];
                for (date, close) in bars {
                    events
                        .send(Event::HistoricalData(HistoricalBar {
                            request_id,
                            bar: bar(date, close),
                        }))
                        .unwrap();
                }
                events
                    .send(Event::HistoricalDataEnd(HistoricalDataEnd {
                        request_id,
                        start: "20231201 09:30:00".to_string(),
                        end: "20231201 09:32:00".to_string(),
                    }))
                    .unwrap();
            }
            OutboundRequest::RequestPositions => {
                let contract = stock_contract("AAPL").with_con_id(265598);
                events
                    .send(Event::Position(PositionData::new("DU123", contract, dec!(50), 189.2)))
                    .unwrap();
                events.send(Event::PositionEnd).unwrap();
            }
            OutboundRequest::GlobalCancel => {
                events.send(Event::ConnectionClosed).unwrap();
                break;
            }
            _ => {}
        }
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

/// Drive every blocking request type against the scripted peer
#[test]
fn test_client_peer_round_trip() {
    let _ = env_logger::try_init();

    // === Wire transport, peer and delivery ===
    let (transport, outbound) = ChannelTransport::pair();
    let (events, mut inbound) = event_channel();
    let client = Arc::new(Client::new(Arc::new(transport), load_default_config().unwrap()));

    let peer = thread::spawn(move || fake_peer(outbound, events));
    let delivery = {
        let client = Arc::clone(&client);
        thread::spawn(move || client.run(&mut inbound))
    };

    assert!(wait_until(|| client.session().is_connected()));

    // === Session ===
    // The unsolicited id sent on connect must not answer this request
    assert_eq!(client.session().request_ids(1, WAIT).unwrap(), 100);

    let now = client.session().request_current_time(WAIT).unwrap();
    assert_eq!(now.timestamp(), 1_701_423_000);

    let details = client
        .session()
        .request_contract_details(stock_contract("AAPL"), WAIT)
        .unwrap();
    let con_ids: Vec<_> = details.iter().map(|d| d.contract.con_id).collect();
    assert_eq!(con_ids, vec![265598, 38708077]);

    let err = client
        .session()
        .request_contract_details(stock_contract("NOPE"), WAIT)
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Correlation(CorrelationError::Cancelled(-2))
    ));
    assert_eq!(client.session().last_error(-2).map(|e| e.code), Some(200));

    // === Market data ===
    let request =
        HistoricalDataRequest::new(7, stock_contract("AAPL"), "120 S", "1 min", BarType::Trades);
    let bars = client
        .market_data()
        .request_historical_data(request, WAIT)
        .unwrap()
        .unwrap();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    assert_eq!(closes, vec![190.0, 190.5]);
    assert_eq!(bars[0].time.to_rfc3339(), "2023-12-01T14:30:00+00:00");

    // === Orders ===
    client
        .orders()
        .place_buy_order(100, "AAPL", dec!(10), None, false)
        .unwrap();
    assert!(wait_until(|| !client.orders().fetch_order_status(100)));

    client
        .orders()
        .place_sell_order(101, "AAPL", dec!(5), Some(250.0), false)
        .unwrap();
    assert!(client.orders().fetch_order_status(101));
    assert_eq!(client.orders().remaining_quantity(101).unwrap(), dec!(5));

    // === Account ===
    let positions = client.account().request_positions(WAIT).unwrap();
    assert_eq!(positions[&265598].position, dec!(50));

    // === Disconnect ===
    client.orders().request_global_cancel().unwrap();
    peer.join().unwrap();
    let delivered = delivery.join().unwrap();

    assert!(!client.session().is_connected());
    assert!(delivered >= 15);
}
