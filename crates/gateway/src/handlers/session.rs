//! Session component
//!
//! Connection lifecycle, order id allocation, peer clock, contract lookups
//! and the peer's error stream. All of its requests are single-flight and
//! use reserved ids.

use chrono::DateTime;
use dashmap::DashMap;
use log::{debug, error, info, warn};
use relay_core::{Contract, ContractDetails, OrderId, RequestId, Timestamp, reserved};
use relay_correlation::Correlator;
use relay_ports::{OutboundRequest, Transport};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use super::{RequestCanceller, bind, mismatched};
use crate::error::{GatewayError, GatewayResult};
use crate::messages::{ContractDetailsRow, Event, PeerError};
use crate::router::{EventHandler, HandlerTable};

/// Request ids whose latest peer error is kept; the oldest entry goes first
pub const MAX_TRACKED_ERRORS: usize = 256;

pub struct SessionComponent {
    transport: Arc<dyn Transport>,
    next_ids: Correlator<OrderId>,
    contract_details: Correlator<ContractDetails>,
    current_time: Correlator<i64>,
    connected: AtomicBool,
    /// Latest peer error per request id, tagged with its arrival order
    errors: DashMap<RequestId, (u64, PeerError)>,
    error_seq: AtomicU64,
    cancellers: Vec<Arc<dyn RequestCanceller>>,
}

impl SessionComponent {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            next_ids: Correlator::new(),
            contract_details: Correlator::new(),
            current_time: Correlator::new(),
            connected: AtomicBool::new(false),
            errors: DashMap::new(),
            error_seq: AtomicU64::new(0),
            cancellers: Vec::new(),
        }
    }

    /// Components whose pending requests are ended by peer errors
    pub fn with_canceller(mut self, canceller: Arc<dyn RequestCanceller>) -> Self {
        self.cancellers.push(canceller);
        self
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Ask the peer for the next valid order id
    pub fn request_ids(&self, count: i32, timeout: Duration) -> GatewayResult<OrderId> {
        let pending = self.next_ids.expect(reserved::NEXT_VALID_ID);
        info!("Requesting {} order id(s)", count);
        self.transport.send(OutboundRequest::RequestIds { count })?;
        Ok(pending.wait_value(timeout)?)
    }

    /// All contracts matching `contract`, in the order the peer sent them
    pub fn request_contract_details(
        &self,
        contract: Contract,
        timeout: Duration,
    ) -> GatewayResult<Vec<ContractDetails>> {
        let request_id = reserved::CONTRACT_DETAILS;
        self.errors.remove(&request_id);
        let pending = self.contract_details.expect_sequence(request_id);
        info!("Requesting contract details for {}", contract.label());
        self.transport
            .send(OutboundRequest::RequestContractDetails { request_id, contract })?;
        Ok(pending.wait_sequence(timeout)?)
    }

    /// Peer clock
    pub fn request_current_time(&self, timeout: Duration) -> GatewayResult<Timestamp> {
        self.errors.remove(&reserved::CURRENT_TIME);
        let pending = self.current_time.expect(reserved::CURRENT_TIME);
        self.transport.send(OutboundRequest::RequestCurrentTime)?;
        let secs = pending.wait_value(timeout)?;
        DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| GatewayError::Parse(format!("current time out of range: {}", secs)))
    }

    /// Most recent peer error reported for `request_id`
    pub fn last_error(&self, request_id: RequestId) -> Option<PeerError> {
        self.errors.get(&request_id).map(|e| e.value().1.clone())
    }

    /// Remove and return the error recorded for `request_id`
    pub fn take_error(&self, request_id: RequestId) -> Option<PeerError> {
        self.errors.remove(&request_id).map(|(_, (_, e))| e)
    }

    fn record_error(&self, peer_error: &PeerError) {
        let seq = self.error_seq.fetch_add(1, Ordering::Relaxed);
        self.errors
            .insert(peer_error.request_id, (seq, peer_error.clone()));

        if self.errors.len() > MAX_TRACKED_ERRORS {
            let oldest = self
                .errors
                .iter()
                .min_by_key(|entry| entry.value().0)
                .map(|entry| *entry.key());
            if let Some(request_id) = oldest {
                debug!("Forgetting peer error for request {}", request_id);
                self.errors.remove(&request_id);
            }
        }
    }

    pub fn on_connect_ack(&self) {
        self.connected.store(true, Ordering::Release);
        info!("Connected to peer");
    }

    pub fn on_connection_closed(&self) {
        self.connected.store(false, Ordering::Release);
        warn!("Connection to peer closed");
    }

    pub fn on_next_valid_id(&self, order_id: OrderId) {
        info!("Next valid id: {}", order_id);
        self.next_ids.store(reserved::NEXT_VALID_ID, order_id);
    }

    pub fn on_current_time(&self, time: i64) {
        debug!("Peer time: {}", time);
        self.current_time.store(reserved::CURRENT_TIME, time);
    }

    pub fn on_contract_details(&self, row: &ContractDetailsRow) {
        debug!(
            "Contract details {} for request {}",
            row.details.contract.label(),
            row.request_id
        );
        if !self
            .contract_details
            .append_if_present(row.request_id, row.details.clone())
        {
            warn!("Contract details for inactive request {}", row.request_id);
        }
    }

    pub fn on_contract_details_end(&self, request_id: RequestId) {
        debug!("Contract details end for request {}", request_id);
        self.contract_details.end_sequence_if_present(request_id);
    }

    pub fn on_error(&self, peer_error: &PeerError) {
        if peer_error.is_warning() {
            info!("Peer notice {}: {}", peer_error.code, peer_error.message);
        } else {
            error!(
                "Peer error {} for request {}: {}",
                peer_error.code, peer_error.request_id, peer_error.message
            );
        }

        self.record_error(peer_error);

        if peer_error.fails_request() {
            let request_id = peer_error.request_id;
            if self.cancel_pending(request_id) {
                warn!("Cancelled pending request {}", request_id);
            }
            for canceller in &self.cancellers {
                if canceller.cancel_pending(request_id) {
                    warn!("Cancelled pending request {}", request_id);
                }
            }
        }
    }
}

impl RequestCanceller for SessionComponent {
    fn cancel_pending(&self, request_id: RequestId) -> bool {
        request_id == reserved::CONTRACT_DETAILS && self.contract_details.delete(request_id)
    }
}

impl EventHandler for SessionComponent {
    fn name(&self) -> &str {
        "session"
    }

    fn handlers(self: Arc<Self>) -> HandlerTable {
        HandlerTable::new()
            .on("on_connect_ack", bind(&self, |s, _| s.on_connect_ack()))
            .on("on_connection_closed", bind(&self, |s, _| s.on_connection_closed()))
            .on(
                "on_next_valid_id",
                bind(&self, |s, event| match event {
                    Event::NextValidId { order_id } => s.on_next_valid_id(*order_id),
                    other => mismatched("session", "on_next_valid_id", other),
                }),
            )
            .on(
                "on_current_time",
                bind(&self, |s, event| match event {
                    Event::CurrentTime { time } => s.on_current_time(*time),
                    other => mismatched("session", "on_current_time", other),
                }),
            )
            .on(
                "on_error",
                bind(&self, |s, event| match event {
                    Event::Error(peer_error) => s.on_error(peer_error),
                    other => mismatched("session", "on_error", other),
                }),
            )
            .on(
                "on_contract_details",
                bind(&self, |s, event| match event {
                    Event::ContractDetails(row) => s.on_contract_details(row),
                    other => mismatched("session", "on_contract_details", other),
                }),
            )
            .on(
                "on_contract_details_end",
                bind(&self, |s, event| match event {
                    Event::ContractDetailsEnd { request_id } => {
                        s.on_contract_details_end(*request_id)
                    }
                    other => mismatched("session", "on_contract_details_end", other),
                }),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RecordingTransport;
    use relay_core::builders::stock_contract;
    use relay_correlation::CorrelationError;
    use std::thread;

    const WAIT: Duration = Duration::from_secs(5);

    fn session() -> (Arc<SessionComponent>, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let session = Arc::new(SessionComponent::new(transport.clone()));
        (session, transport)
    }

    /// Play the peer: once `matches` sees its request, run `reply`
    fn reply_when<M, R>(
        transport: &Arc<RecordingTransport>,
        matches: M,
        reply: R,
    ) -> thread::JoinHandle<()>
    where
        M: Fn(&OutboundRequest) -> bool + Send + 'static,
        R: FnOnce() + Send + 'static,
    {
        let transport = Arc::clone(transport);
        thread::spawn(move || {
            if transport.wait_for(matches, WAIT).is_some() {
                reply();
            }
        })
    }

    #[test]
    fn test_request_ids() {
        let (session, transport) = session();
        let peer = {
            let session = Arc::clone(&session);
            reply_when(
                &transport,
                |r| matches!(r, OutboundRequest::RequestIds { count: 1 }),
                move || session.on_next_valid_id(1001),
            )
        };

        assert_eq!(session.request_ids(1, WAIT).unwrap(), 1001);
        peer.join().unwrap();
    }

    #[test]
    fn test_stale_next_valid_id_is_ignored() {
        let (session, _transport) = session();
        // Unsolicited at connect time
        session.on_next_valid_id(1);

        let err = session.request_ids(1, Duration::from_millis(30)).unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_request_contract_details() {
        let (session, transport) = session();
        let peer = {
            let session = Arc::clone(&session);
            reply_when(
                &transport,
                |r| matches!(r, OutboundRequest::RequestContractDetails { .. }),
                move || {
                    for (con_id, exchange) in [(265598, "NASDAQ"), (265599, "ARCA")] {
                        let mut contract = stock_contract("AAPL").with_con_id(con_id);
                        contract.primary_exchange = Some(exchange.to_string());
                        session.on_contract_details(&ContractDetailsRow {
                            request_id: reserved::CONTRACT_DETAILS,
                            details: ContractDetails::new(contract, "APPLE INC", 0.01),
                        });
                    }
                    session.on_contract_details_end(reserved::CONTRACT_DETAILS);
                },
            )
        };

        let details = session
            .request_contract_details(stock_contract("AAPL"), WAIT)
            .unwrap();
        peer.join().unwrap();

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].contract.con_id, 265598);
        assert_eq!(details[1].contract.con_id, 265599);
        assert_eq!(
            transport.sent()[0].request_id(),
            Some(reserved::CONTRACT_DETAILS)
        );
    }

    #[test]
    fn test_request_current_time() {
        let (session, transport) = session();
        let peer = {
            let session = Arc::clone(&session);
            reply_when(
                &transport,
                |r| matches!(r, OutboundRequest::RequestCurrentTime),
                move || session.on_current_time(1_700_000_000),
            )
        };

        let time = session.request_current_time(WAIT).unwrap();
        peer.join().unwrap();
        assert_eq!(time.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_send_failure_surfaces() {
        let (session, transport) = session();
        transport.disconnect();

        let err = session.request_ids(1, WAIT).unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[test]
    fn test_connection_flags() {
        let (session, _) = session();
        assert!(!session.is_connected());
        session.on_connect_ack();
        assert!(session.is_connected());
        session.on_connection_closed();
        assert!(!session.is_connected());
    }

    struct Pending(parking_lot::Mutex<Vec<RequestId>>);

    impl RequestCanceller for Pending {
        fn cancel_pending(&self, request_id: RequestId) -> bool {
            self.0.lock().push(request_id);
            true
        }
    }

    #[test]
    fn test_error_cancels_pending_request() {
        let canceller = Arc::new(Pending(parking_lot::Mutex::new(Vec::new())));
        let session = SessionComponent::new(Arc::new(RecordingTransport::new()))
            .with_canceller(canceller.clone());

        session.on_error(&PeerError::new(-1, 2104, "Market data farm connection is OK"));
        session.on_error(&PeerError::new(42, 162, "Historical market data service error"));

        assert_eq!(*canceller.0.lock(), vec![42]);
        assert_eq!(session.last_error(42).map(|e| e.code), Some(162));
        assert_eq!(session.last_error(-1).map(|e| e.code), Some(2104));
        assert_eq!(session.last_error(7), None);
    }

    #[test]
    fn test_unknown_contract_fails_fast() {
        let (session, transport) = session();
        let peer = {
            let session = Arc::clone(&session);
            reply_when(
                &transport,
                |r| matches!(r, OutboundRequest::RequestContractDetails { .. }),
                move || {
                    session.on_error(&PeerError::new(
                        reserved::CONTRACT_DETAILS,
                        200,
                        "No security definition has been found for the request",
                    ))
                },
            )
        };

        let err = session
            .request_contract_details(stock_contract("NOPE"), WAIT)
            .unwrap_err();
        peer.join().unwrap();

        assert!(matches!(
            err,
            GatewayError::Correlation(CorrelationError::Cancelled(-2))
        ));
        assert_eq!(
            session.last_error(reserved::CONTRACT_DETAILS).map(|e| e.code),
            Some(200)
        );
    }

    #[test]
    fn test_error_map_is_bounded() {
        let (session, _) = session();
        let total = MAX_TRACKED_ERRORS as RequestId + 10;
        for request_id in 1..=total {
            session.on_error(&PeerError::new(request_id, 162, "Query cancelled"));
        }

        assert_eq!(session.errors.len(), MAX_TRACKED_ERRORS);
        assert_eq!(session.last_error(1), None);
        assert_eq!(session.last_error(10), None);
        assert_eq!(session.last_error(11).map(|e| e.code), Some(162));
        assert_eq!(session.last_error(total).map(|e| e.code), Some(162));
    }

    #[test]
    fn test_new_request_clears_stale_error() {
        let (session, transport) = session();
        session.on_error(&PeerError::new(
            reserved::CONTRACT_DETAILS,
            200,
            "No security definition has been found for the request",
        ));
        let peer = {
            let session = Arc::clone(&session);
            reply_when(
                &transport,
                |r| matches!(r, OutboundRequest::RequestContractDetails { .. }),
                move || session.on_contract_details_end(reserved::CONTRACT_DETAILS),
            )
        };

        let details = session
            .request_contract_details(stock_contract("AAPL"), WAIT)
            .unwrap();
        peer.join().unwrap();

        assert!(details.is_empty());
        assert_eq!(session.last_error(reserved::CONTRACT_DETAILS), None);

        session.on_error(&PeerError::new(42, 162, "Query cancelled"));
        assert_eq!(session.take_error(42).map(|e| e.code), Some(162));
        assert_eq!(session.last_error(42), None);
    }

    #[test]
    fn test_timeout_maps_to_correlation_error() {
        let (session, _) = session();
        let err = session
            .request_current_time(Duration::from_millis(20))
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Correlation(CorrelationError::Timeout { key: -5, .. })
        ));
    }
}
