//! Error types for the gateway crate

use relay_correlation::CorrelationError;
use relay_ports::TransportError;
use thiserror::Error;

use crate::config::ConfigError;

/// Gateway-level errors (request component operations)
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Correlation error: {0}")]
    Correlation(#[from] CorrelationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl GatewayError {
    /// Whether the caller gave up waiting for the peer
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Correlation(e) if e.is_timeout())
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
