//! Market data callback payloads

use relay_core::{
    Bar, BarData, BarTimeError, BidAskTick, ContractDetails, MidpointTick, RequestId,
    ScannerData, TickAttribBidAsk, TickAttribLast, TickType, TradeTick,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `tickPrice` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickPrice {
    pub request_id: RequestId,
    pub field: i32,
    pub price: f64,
}

/// `tickSize` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSize {
    pub request_id: RequestId,
    pub field: i32,
    pub size: Decimal,
}

/// `tickByTickAllLast` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickByTickAllLast {
    pub request_id: RequestId,
    /// 0 for `Last`, anything else for `AllLast`
    pub tick_type: i32,
    pub time: i64,
    pub price: f64,
    pub size: Decimal,
    pub attrib: TickAttribLast,
    pub exchange: String,
    pub special_conditions: String,
}

impl TickByTickAllLast {
    pub fn to_tick(&self) -> TradeTick {
        TradeTick {
            tick_type: TickType::from_trade_code(self.tick_type),
            time: self.time,
            price: self.price,
            size: self.size,
            past_limit: self.attrib.past_limit,
            unreported: self.attrib.unreported,
            exchange: self.exchange.clone(),
            special_conditions: self.special_conditions.clone(),
        }
    }
}

/// `tickByTickBidAsk` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickByTickBidAsk {
    pub request_id: RequestId,
    pub time: i64,
    pub bid_price: f64,
    pub ask_price: f64,
    pub bid_size: Decimal,
    pub ask_size: Decimal,
    pub attrib: TickAttribBidAsk,
}

impl TickByTickBidAsk {
    pub fn to_tick(&self) -> BidAskTick {
        BidAskTick {
            time: self.time,
            bid_price: self.bid_price,
            ask_price: self.ask_price,
            bid_size: self.bid_size,
            ask_size: self.ask_size,
            bid_past_low: self.attrib.bid_past_low,
            ask_past_high: self.attrib.ask_past_high,
        }
    }
}

/// `tickByTickMidPoint` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickByTickMidPoint {
    pub request_id: RequestId,
    pub time: i64,
    pub midpoint: f64,
}

impl TickByTickMidPoint {
    pub fn to_tick(&self) -> MidpointTick {
        MidpointTick {
            time: self.time,
            midpoint: self.midpoint,
        }
    }
}

/// `realtimeBar` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeBarUpdate {
    pub request_id: RequestId,
    /// Bar start, epoch seconds
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Decimal,
    pub wap: Decimal,
    pub count: i32,
}

impl RealtimeBarUpdate {
    pub fn to_bar(&self) -> Result<Bar, BarTimeError> {
        Bar::from_epoch(
            self.time,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.wap,
            self.count,
        )
    }
}

/// `historicalData` / `historicalDataUpdate` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBar {
    pub request_id: RequestId,
    pub bar: BarData,
}

/// `historicalDataEnd` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDataEnd {
    pub request_id: RequestId,
    pub start: String,
    pub end: String,
}

/// `scannerData` callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerRow {
    pub request_id: RequestId,
    pub rank: i32,
    pub contract_details: ContractDetails,
    pub distance: String,
    pub benchmark: String,
    pub projection: String,
    pub legs: String,
}

impl ScannerRow {
    pub fn to_scanner_data(&self) -> ScannerData {
        ScannerData {
            rank: self.rank,
            contract_details: self.contract_details.clone(),
            legs: self.legs.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_all_last_tick_type() {
        let mut raw = TickByTickAllLast {
            request_id: 1,
            tick_type: 0,
            time: 1_700_000_000,
            price: 101.5,
            size: dec!(200),
            attrib: TickAttribLast {
                past_limit: false,
                unreported: true,
            },
            exchange: "ARCA".to_string(),
            special_conditions: String::new(),
        };

        let tick = raw.to_tick();
        assert_eq!(tick.tick_type, TickType::Last);
        assert!(tick.unreported);

        raw.tick_type = 1;
        assert_eq!(raw.to_tick().tick_type, TickType::AllLast);
    }

    #[test]
    fn test_realtime_bar_to_bar() {
        let raw = RealtimeBarUpdate {
            request_id: 2,
            time: 1_700_000_005,
            open: 10.0,
            high: 11.0,
            low: 9.5,
            close: 10.5,
            volume: dec!(300),
            wap: dec!(10.2),
            count: 12,
        };

        let bar = raw.to_bar().unwrap();
        assert_eq!(bar.time.timestamp(), 1_700_000_005);
        assert_eq!(bar.count, 12);
    }
}
