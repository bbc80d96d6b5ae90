use serde::{Deserialize, Serialize};

use crate::entities::ContractDetails;

/// Free-form tag/value option passed through to the peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagValue {
    pub tag: String,
    pub value: String,
}

impl TagValue {
    pub fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }
}

/// Market scanner parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerSubscription {
    pub instrument: String,
    pub location_code: String,
    pub scan_code: String,
    pub above_price: Option<f64>,
    pub below_price: Option<f64>,
    pub above_volume: Option<f64>,
    pub market_cap_above: Option<f64>,
    pub market_cap_below: Option<f64>,
    /// Top-n rows to return; -1 leaves it to the peer
    pub number_of_rows: i32,
}

impl Default for ScannerSubscription {
    fn default() -> Self {
        Self {
            instrument: String::new(),
            location_code: String::new(),
            scan_code: String::new(),
            above_price: None,
            below_price: None,
            above_volume: None,
            market_cap_above: None,
            market_cap_below: None,
            number_of_rows: -1,
        }
    }
}

impl ScannerSubscription {
    /// Requested row count, if one was set
    pub fn rows(&self) -> Option<usize> {
        usize::try_from(self.number_of_rows).ok()
    }
}

/// One ranked scanner result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerData {
    pub rank: i32,
    pub contract_details: ContractDetails,
    pub legs: String,
}
