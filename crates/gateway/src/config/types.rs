use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub correlation: CorrelationSettings,
}

/// Where the peer listens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Distinguishes concurrent sessions against the same peer
    #[serde(default)]
    pub client_id: i32,
}

/// Timeouts and window sizes used by the request components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationSettings {
    #[serde(default = "default_response_timeout")]
    pub response_timeout_ms: u64,
    /// Capacity of tick, realtime bar and keep-up-to-date bar windows
    #[serde(default = "default_window_length")]
    pub window_length: usize,
    /// Scanner window capacity when the subscription leaves the row count open
    #[serde(default = "default_scanner_rows")]
    pub scanner_rows: usize,
}

impl Default for CorrelationSettings {
    fn default() -> Self {
        CorrelationSettings {
            response_timeout_ms: default_response_timeout(),
            window_length: default_window_length(),
            scanner_rows: default_scanner_rows(),
        }
    }
}

impl CorrelationSettings {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

fn default_response_timeout() -> u64 {
    10_000
}

fn default_window_length() -> usize {
    10
}

fn default_scanner_rows() -> usize {
    50
}
