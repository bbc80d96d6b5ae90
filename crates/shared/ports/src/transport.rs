use relay_core::{
    Contract, HistoricalDataRequest, Order, OrderId, RealtimeBarRequest, RequestId,
    ScannerRequest, TickByTickDataRequest,
};
use serde::{Deserialize, Serialize};

use crate::error::TransportResult;

/// Every request this bridge sends to the peer.
///
/// One variant per outbound protocol call; the payload carries the
/// correlation key where the call has one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutboundRequest {
    RequestIds { count: i32 },
    RequestCurrentTime,
    RequestContractDetails { request_id: RequestId, contract: Contract },
    PlaceOrder { order_id: OrderId, contract: Contract, order: Order },
    CancelOrder { order_id: OrderId },
    GlobalCancel,
    RequestPositions,
    CancelPositions,
    RequestTickByTickData(TickByTickDataRequest),
    CancelTickByTickData { request_id: RequestId },
    RequestRealtimeBars(RealtimeBarRequest),
    CancelRealtimeBars { request_id: RequestId },
    RequestHistoricalData(HistoricalDataRequest),
    CancelHistoricalData { request_id: RequestId },
    RequestScannerParameters,
    RequestScannerSubscription(ScannerRequest),
    CancelScannerSubscription { request_id: RequestId },
}

impl OutboundRequest {
    /// Protocol call name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RequestIds { .. } => "reqIds",
            Self::RequestCurrentTime => "reqCurrentTime",
            Self::RequestContractDetails { .. } => "reqContractDetails",
            Self::PlaceOrder { .. } => "placeOrder",
            Self::CancelOrder { .. } => "cancelOrder",
            Self::GlobalCancel => "reqGlobalCancel",
            Self::RequestPositions => "reqPositions",
            Self::CancelPositions => "cancelPositions",
            Self::RequestTickByTickData(_) => "reqTickByTickData",
            Self::CancelTickByTickData { .. } => "cancelTickByTickData",
            Self::RequestRealtimeBars(_) => "reqRealTimeBars",
            Self::CancelRealtimeBars { .. } => "cancelRealTimeBars",
            Self::RequestHistoricalData(_) => "reqHistoricalData",
            Self::CancelHistoricalData { .. } => "cancelHistoricalData",
            Self::RequestScannerParameters => "reqScannerParameters",
            Self::RequestScannerSubscription(_) => "reqScannerSubscription",
            Self::CancelScannerSubscription { .. } => "cancelScannerSubscription",
        }
    }

    /// Correlation key carried by the request, if any
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::RequestContractDetails { request_id, .. }
            | Self::CancelTickByTickData { request_id }
            | Self::CancelRealtimeBars { request_id }
            | Self::CancelHistoricalData { request_id }
            | Self::CancelScannerSubscription { request_id } => Some(*request_id),
            Self::PlaceOrder { order_id, .. } | Self::CancelOrder { order_id } => Some(*order_id),
            Self::RequestTickByTickData(req) => Some(req.request_id),
            Self::RequestRealtimeBars(req) => Some(req.request_id),
            Self::RequestHistoricalData(req) => Some(req.request_id),
            Self::RequestScannerSubscription(req) => Some(req.request_id),
            Self::RequestIds { .. }
            | Self::RequestCurrentTime
            | Self::GlobalCancel
            | Self::RequestPositions
            | Self::CancelPositions
            | Self::RequestScannerParameters => None,
        }
    }
}

/// Port for sending requests to the peer.
///
/// Implementations must not block for long: request components call `send`
/// from caller threads right before waiting on the correlator.
pub trait Transport: Send + Sync {
    /// Hand one request to the peer connection
    fn send(&self, request: OutboundRequest) -> TransportResult<()>;

    /// Transport name for logging
    fn name(&self) -> &str {
        "Transport"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::builders::stock_contract;

    // Ensure the trait is object-safe
    fn _assert_transport_object_safe(_: &dyn Transport) {}

    #[test]
    fn test_kind_and_request_id() {
        let request = OutboundRequest::RequestContractDetails {
            request_id: -2,
            contract: stock_contract("AAPL"),
        };
        assert_eq!(request.kind(), "reqContractDetails");
        assert_eq!(request.request_id(), Some(-2));

        let request = OutboundRequest::RequestIds { count: 1 };
        assert_eq!(request.kind(), "reqIds");
        assert_eq!(request.request_id(), None);
    }
}
