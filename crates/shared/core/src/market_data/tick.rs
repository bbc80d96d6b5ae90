use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tick-by-tick stream kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickType {
    Last,
    AllLast,
    BidAsk,
    MidPoint,
}

impl TickType {
    /// Wire name used when subscribing
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Last => "Last",
            Self::AllLast => "AllLast",
            Self::BidAsk => "BidAsk",
            Self::MidPoint => "MidPoint",
        }
    }

    /// Map the numeric tick type of a trade tick (0 = Last, otherwise AllLast)
    pub fn from_trade_code(code: i32) -> Self {
        if code == 0 { Self::Last } else { Self::AllLast }
    }
}

/// Attributes attached to a last/all-last tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickAttribLast {
    pub past_limit: bool,
    pub unreported: bool,
}

/// Attributes attached to a bid/ask tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickAttribBidAsk {
    pub bid_past_low: bool,
    pub ask_past_high: bool,
}

/// Trade print
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeTick {
    pub tick_type: TickType,
    /// Epoch seconds
    pub time: i64,
    pub price: f64,
    pub size: Decimal,
    pub past_limit: bool,
    pub unreported: bool,
    pub exchange: String,
    pub special_conditions: String,
}

/// Top-of-book quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidAskTick {
    /// Epoch seconds
    pub time: i64,
    pub bid_price: f64,
    pub ask_price: f64,
    pub bid_size: Decimal,
    pub ask_size: Decimal,
    pub bid_past_low: bool,
    pub ask_past_high: bool,
}

impl BidAskTick {
    pub fn spread(&self) -> f64 {
        self.ask_price - self.bid_price
    }
}

/// Midpoint update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidpointTick {
    /// Epoch seconds
    pub time: i64,
    pub midpoint: f64,
}

/// Any tick-by-tick observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tick {
    Trade(TradeTick),
    BidAsk(BidAskTick),
    Midpoint(MidpointTick),
}

impl Tick {
    pub fn tick_type(&self) -> TickType {
        match self {
            Self::Trade(t) => t.tick_type,
            Self::BidAsk(_) => TickType::BidAsk,
            Self::Midpoint(_) => TickType::MidPoint,
        }
    }

    pub fn time(&self) -> i64 {
        match self {
            Self::Trade(t) => t.time,
            Self::BidAsk(t) => t.time,
            Self::Midpoint(t) => t.time,
        }
    }
}
