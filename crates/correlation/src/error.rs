//! Error types for the correlation crate

use relay_core::RequestId;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("Timeout waiting for response for key {key} after {timeout:?}")]
    Timeout { key: RequestId, timeout: Duration },

    #[error("No correlation state for key {0}")]
    NotFound(RequestId),

    #[error("Request {0} was cancelled while waiting")]
    Cancelled(RequestId),

    #[error("Response for key {key} is not a {expected}")]
    UnexpectedShape {
        key: RequestId,
        expected: &'static str,
    },
}

impl CorrelationError {
    /// Timeouts are the only error a caller may reasonably retry
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, CorrelationError>;
