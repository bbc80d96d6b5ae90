use serde::{Deserialize, Serialize};

/// Order types used by the request builders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Execute at current market price
    Market,
    /// Execute at specified price or better
    Limit,
    /// Market order triggered when the aux price is touched
    MarketIfTouched,
    /// Market order triggered when price crosses the aux price
    Stop,
}

impl OrderType {
    /// Wire code (`MKT`, `LMT`, `MIT`, `STP`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "MKT",
            Self::Limit => "LMT",
            Self::MarketIfTouched => "MIT",
            Self::Stop => "STP",
        }
    }
}
