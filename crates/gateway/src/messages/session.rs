//! Session-level callback payloads

use relay_core::{ContractDetails, RequestId};
use serde::{Deserialize, Serialize};

/// Request id the peer uses for errors not tied to a request
pub const NO_REQUEST: RequestId = -1;

/// `error` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerError {
    /// Request the error refers to, or -1 for session-wide notices
    pub request_id: RequestId,
    pub code: i32,
    pub message: String,
}

impl PeerError {
    pub fn new(request_id: RequestId, code: i32, message: impl Into<String>) -> Self {
        Self {
            request_id,
            code,
            message: message.into(),
        }
    }

    /// Codes 2100-2199 are informational (farm status, etc.)
    pub fn is_warning(&self) -> bool {
        (2100..2200).contains(&self.code)
    }

    /// Whether this error ends the request it refers to
    pub fn fails_request(&self) -> bool {
        self.request_id != NO_REQUEST && !self.is_warning()
    }
}

/// `contractDetails` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDetailsRow {
    pub request_id: RequestId,
    pub details: ContractDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fails_request() {
        assert!(PeerError::new(7, 200, "No security definition").fails_request());
        assert!(!PeerError::new(7, 2104, "Market data farm connection is OK").fails_request());
        assert!(!PeerError::new(NO_REQUEST, 504, "Not connected").fails_request());
        assert!(PeerError::new(-2, 200, "No security definition").fails_request());
    }
}
