//! Market data payloads delivered by the peer

mod bar;
mod scanner;
mod tick;

pub use bar::{Bar, BarData, BarTimeError, parse_bar_time};
pub use scanner::{ScannerData, ScannerSubscription, TagValue};
pub use tick::{
    BidAskTick, MidpointTick, Tick, TickAttribBidAsk, TickAttribLast, TickType, TradeTick,
};
