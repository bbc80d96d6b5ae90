//! Request descriptors handed to the request components

use serde::{Deserialize, Serialize};

use crate::entities::{Contract, Order};
use crate::market_data::{ScannerSubscription, TagValue, TickType};
use crate::values::{OrderId, RequestId, Timestamp};

/// Price series to build bars from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarType {
    Trades,
    Bid,
    Ask,
    Midpoint,
}

impl BarType {
    /// `whatToShow` value on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trades => "TRADES",
            Self::Bid => "BID",
            Self::Ask => "ASK",
            Self::Midpoint => "MIDPOINT",
        }
    }
}

/// Date encoding the peer should use for historical bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DateFormat {
    #[default]
    FullDateTime,
    Epoch,
    MonthDayTime,
}

impl DateFormat {
    pub fn code(&self) -> i32 {
        match self {
            Self::FullDateTime => 1,
            Self::Epoch => 2,
            Self::MonthDayTime => 3,
        }
    }
}

/// Tick-by-tick subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickByTickDataRequest {
    pub request_id: RequestId,
    pub contract: Contract,
    pub tick_type: TickType,
    /// 0 streams live ticks only
    pub number_of_ticks: i32,
    pub ignore_size: bool,
}

/// Realtime (5 second) bar subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeBarRequest {
    pub request_id: RequestId,
    pub contract: Contract,
    pub bar_size: i32,
    pub bar_type: BarType,
    pub extended_hours: bool,
}

/// Historical bars, optionally kept up to date after the initial batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDataRequest {
    pub request_id: RequestId,
    pub contract: Contract,
    /// Duration string, e.g. `1 D`
    pub time_period: String,
    /// Bar size setting, e.g. `1 min`
    pub bar_size: String,
    pub bar_type: BarType,
    /// None means "now"
    pub end_datetime: Option<Timestamp>,
    pub date_format: DateFormat,
    pub keep_up_to_date: bool,
    pub extended_hours: bool,
}

impl HistoricalDataRequest {
    pub fn new(
        request_id: RequestId,
        contract: Contract,
        time_period: impl Into<String>,
        bar_size: impl Into<String>,
        bar_type: BarType,
    ) -> Self {
        Self {
            request_id,
            contract,
            time_period: time_period.into(),
            bar_size: bar_size.into(),
            bar_type,
            end_datetime: None,
            date_format: DateFormat::default(),
            keep_up_to_date: false,
            extended_hours: false,
        }
    }

    pub fn ending_at(mut self, end: Timestamp) -> Self {
        self.end_datetime = Some(end);
        self
    }

    pub fn with_date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    pub fn keep_up_to_date(mut self) -> Self {
        self.keep_up_to_date = true;
        self
    }

    pub fn with_extended_hours(mut self) -> Self {
        self.extended_hours = true;
        self
    }

    /// `endDateTime` as sent on the wire (empty string = now)
    pub fn end_datetime_wire(&self) -> String {
        self.end_datetime
            .map(|end| end.format("%Y%m%d %H:%M:%S UTC").to_string())
            .unwrap_or_default()
    }
}

/// Market scanner subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerRequest {
    pub request_id: RequestId,
    pub subscription: ScannerSubscription,
    pub filters: Vec<TagValue>,
}

impl ScannerRequest {
    pub fn new(request_id: RequestId, subscription: ScannerSubscription) -> Self {
        Self {
            request_id,
            subscription,
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: TagValue) -> Self {
        self.filters.push(filter);
        self
    }
}

/// Order placement, correlated by the order id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub order_id: OrderId,
    pub contract: Contract,
    pub order: Order,
}

impl OrderRequest {
    pub fn new(order_id: OrderId, contract: Contract, mut order: Order) -> Self {
        order.order_id = order_id;
        Self {
            order_id,
            contract,
            order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::stock_contract;
    use chrono::TimeZone;
    use chrono::Utc;

    #[test]
    fn test_end_datetime_wire() {
        let request = HistoricalDataRequest::new(
            7,
            stock_contract("AAPL"),
            "1 D",
            "1 min",
            BarType::Trades,
        );
        assert_eq!(request.end_datetime_wire(), "");

        let end = Utc.with_ymd_and_hms(2023, 12, 1, 16, 0, 0).unwrap();
        let request = request.ending_at(end);
        assert_eq!(request.end_datetime_wire(), "20231201 16:00:00 UTC");
    }

    #[test]
    fn test_codes() {
        assert_eq!(BarType::Midpoint.as_str(), "MIDPOINT");
        assert_eq!(DateFormat::default().code(), 1);
        assert_eq!(DateFormat::Epoch.code(), 2);
    }
}
