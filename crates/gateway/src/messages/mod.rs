//! Inbound event catalogue
//!
//! Every callback the peer can raise is one [`EventKind`] with a fixed wire
//! name, and one [`Event`] variant carrying its payload. The router resolves
//! handlers from the wire names once, then dispatches by kind index.

pub mod market_data;
pub mod order;
pub mod session;

pub use market_data::{
    HistoricalBar, HistoricalDataEnd, RealtimeBarUpdate, ScannerRow, TickByTickAllLast,
    TickByTickBidAsk, TickByTickMidPoint, TickPrice, TickSize,
};
pub use order::{AccountValue, Execution, OpenOrder, OrderStatusUpdate};
pub use session::{ContractDetailsRow, NO_REQUEST, PeerError};

use relay_core::{PositionData, RequestId};
use serde::{Deserialize, Serialize};

/// Callback names the peer may raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    ConnectAck,
    ConnectionClosed,
    NextValidId,
    CurrentTime,
    Error,
    ContractDetails,
    ContractDetailsEnd,
    OrderStatus,
    OpenOrder,
    OpenOrderEnd,
    ExecDetails,
    ExecDetailsEnd,
    Position,
    PositionEnd,
    AccountSummary,
    AccountSummaryEnd,
    TickPrice,
    TickSize,
    TickByTickAllLast,
    TickByTickBidAsk,
    TickByTickMidPoint,
    RealtimeBar,
    HistoricalData,
    HistoricalDataUpdate,
    HistoricalDataEnd,
    ScannerParameters,
    ScannerData,
    ScannerDataEnd,
}

impl EventKind {
    /// Every kind, in index order
    pub const ALL: [EventKind; 28] = [
        EventKind::ConnectAck,
        EventKind::ConnectionClosed,
        EventKind::NextValidId,
        EventKind::CurrentTime,
        EventKind::Error,
        EventKind::ContractDetails,
        EventKind::ContractDetailsEnd,
        EventKind::OrderStatus,
        EventKind::OpenOrder,
        EventKind::OpenOrderEnd,
        EventKind::ExecDetails,
        EventKind::ExecDetailsEnd,
        EventKind::Position,
        EventKind::PositionEnd,
        EventKind::AccountSummary,
        EventKind::AccountSummaryEnd,
        EventKind::TickPrice,
        EventKind::TickSize,
        EventKind::TickByTickAllLast,
        EventKind::TickByTickBidAsk,
        EventKind::TickByTickMidPoint,
        EventKind::RealtimeBar,
        EventKind::HistoricalData,
        EventKind::HistoricalDataUpdate,
        EventKind::HistoricalDataEnd,
        EventKind::ScannerParameters,
        EventKind::ScannerData,
        EventKind::ScannerDataEnd,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position in [`EventKind::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Callback name as the peer spells it
    pub fn wire_name(self) -> &'static str {
        match self {
            EventKind::ConnectAck => "connectAck",
            EventKind::ConnectionClosed => "connectionClosed",
            EventKind::NextValidId => "nextValidId",
            EventKind::CurrentTime => "currentTime",
            EventKind::Error => "error",
            EventKind::ContractDetails => "contractDetails",
            EventKind::ContractDetailsEnd => "contractDetailsEnd",
            EventKind::OrderStatus => "orderStatus",
            EventKind::OpenOrder => "openOrder",
            EventKind::OpenOrderEnd => "openOrderEnd",
            EventKind::ExecDetails => "execDetails",
            EventKind::ExecDetailsEnd => "execDetailsEnd",
            EventKind::Position => "position",
            EventKind::PositionEnd => "positionEnd",
            EventKind::AccountSummary => "accountSummary",
            EventKind::AccountSummaryEnd => "accountSummaryEnd",
            EventKind::TickPrice => "tickPrice",
            EventKind::TickSize => "tickSize",
            EventKind::TickByTickAllLast => "tickByTickAllLast",
            EventKind::TickByTickBidAsk => "tickByTickBidAsk",
            EventKind::TickByTickMidPoint => "tickByTickMidPoint",
            EventKind::RealtimeBar => "realtimeBar",
            EventKind::HistoricalData => "historicalData",
            EventKind::HistoricalDataUpdate => "historicalDataUpdate",
            EventKind::HistoricalDataEnd => "historicalDataEnd",
            EventKind::ScannerParameters => "scannerParameters",
            EventKind::ScannerData => "scannerData",
            EventKind::ScannerDataEnd => "scannerDataEnd",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<EventKind> {
        Self::ALL.into_iter().find(|kind| kind.wire_name() == name)
    }
}

/// One callback from the peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ConnectAck,
    ConnectionClosed,
    NextValidId { order_id: i32 },
    /// Peer clock, epoch seconds
    CurrentTime { time: i64 },
    Error(PeerError),
    ContractDetails(ContractDetailsRow),
    ContractDetailsEnd { request_id: RequestId },
    OrderStatus(OrderStatusUpdate),
    OpenOrder(OpenOrder),
    OpenOrderEnd,
    ExecDetails(Execution),
    ExecDetailsEnd { request_id: RequestId },
    Position(PositionData),
    PositionEnd,
    AccountSummary(AccountValue),
    AccountSummaryEnd { request_id: RequestId },
    TickPrice(TickPrice),
    TickSize(TickSize),
    TickByTickAllLast(TickByTickAllLast),
    TickByTickBidAsk(TickByTickBidAsk),
    TickByTickMidPoint(TickByTickMidPoint),
    RealtimeBar(RealtimeBarUpdate),
    HistoricalData(HistoricalBar),
    HistoricalDataUpdate(HistoricalBar),
    HistoricalDataEnd(HistoricalDataEnd),
    ScannerParameters { xml: String },
    ScannerData(ScannerRow),
    ScannerDataEnd { request_id: RequestId },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ConnectAck => EventKind::ConnectAck,
            Event::ConnectionClosed => EventKind::ConnectionClosed,
            Event::NextValidId { .. } => EventKind::NextValidId,
            Event::CurrentTime { .. } => EventKind::CurrentTime,
            Event::Error(_) => EventKind::Error,
            Event::ContractDetails(_) => EventKind::ContractDetails,
            Event::ContractDetailsEnd { .. } => EventKind::ContractDetailsEnd,
            Event::OrderStatus(_) => EventKind::OrderStatus,
            Event::OpenOrder(_) => EventKind::OpenOrder,
            Event::OpenOrderEnd => EventKind::OpenOrderEnd,
            Event::ExecDetails(_) => EventKind::ExecDetails,
            Event::ExecDetailsEnd { .. } => EventKind::ExecDetailsEnd,
            Event::Position(_) => EventKind::Position,
            Event::PositionEnd => EventKind::PositionEnd,
            Event::AccountSummary(_) => EventKind::AccountSummary,
            Event::AccountSummaryEnd { .. } => EventKind::AccountSummaryEnd,
            Event::TickPrice(_) => EventKind::TickPrice,
            Event::TickSize(_) => EventKind::TickSize,
            Event::TickByTickAllLast(_) => EventKind::TickByTickAllLast,
            Event::TickByTickBidAsk(_) => EventKind::TickByTickBidAsk,
            Event::TickByTickMidPoint(_) => EventKind::TickByTickMidPoint,
            Event::RealtimeBar(_) => EventKind::RealtimeBar,
            Event::HistoricalData(_) => EventKind::HistoricalData,
            Event::HistoricalDataUpdate(_) => EventKind::HistoricalDataUpdate,
            Event::HistoricalDataEnd(_) => EventKind::HistoricalDataEnd,
            Event::ScannerParameters { .. } => EventKind::ScannerParameters,
            Event::ScannerData(_) => EventKind::ScannerData,
            Event::ScannerDataEnd { .. } => EventKind::ScannerDataEnd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_catalogue_order() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_wire_name_lookup() {
        assert_eq!(
            EventKind::from_wire_name("tickByTickAllLast"),
            Some(EventKind::TickByTickAllLast)
        );
        assert_eq!(EventKind::from_wire_name("bondContractDetails"), None);

        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_wire_name(kind.wire_name()), Some(kind));
        }
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(Event::NextValidId { order_id: 1 }.kind(), EventKind::NextValidId);
        assert_eq!(
            Event::ScannerDataEnd { request_id: 3 }.kind(),
            EventKind::ScannerDataEnd
        );
    }
}
