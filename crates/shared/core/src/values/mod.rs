use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Correlation key for one request/response exchange with the peer
pub type RequestId = i32;

/// Order identifier; orders are correlated by their own id
pub type OrderId = i32;

/// Peer-assigned contract identifier (`conId` on the wire)
pub type ContractId = i32;

/// Quantity value - uses Decimal for precision
pub type Quantity = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Request ids reserved for session-scoped, single-flight requests.
///
/// Caller-chosen ids for market data and orders are always positive, so these
/// never collide with them.
pub mod reserved {
    use super::RequestId;

    /// `reqIds` / `nextValidId`
    pub const NEXT_VALID_ID: RequestId = -1;

    /// `reqContractDetails` / `contractDetails` / `contractDetailsEnd`
    pub const CONTRACT_DETAILS: RequestId = -2;

    /// `reqScannerParameters` / `scannerParameters`
    pub const SCANNER_PARAMETERS: RequestId = -3;

    /// `reqPositions` / `positionEnd`
    pub const POSITIONS_END: RequestId = -4;

    /// `reqCurrentTime` / `currentTime`
    pub const CURRENT_TIME: RequestId = -5;

    /// All reserved ids
    pub const ALL: [RequestId; 5] = [
        NEXT_VALID_ID,
        CONTRACT_DETAILS,
        SCANNER_PARAMETERS,
        POSITIONS_END,
        CURRENT_TIME,
    ];

    /// Whether `id` belongs to the reserved session namespace
    pub fn is_reserved(id: RequestId) -> bool {
        ALL.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::reserved;

    #[test]
    fn test_reserved_ids_are_negative_and_distinct() {
        for (i, a) in reserved::ALL.iter().enumerate() {
            assert!(*a < 0);
            for b in &reserved::ALL[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(reserved::is_reserved(-2));
        assert!(!reserved::is_reserved(42));
    }
}
