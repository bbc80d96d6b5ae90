//! Relay Core Domain
//!
//! Pure domain types for the Relay brokerage bridge.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod builders;
pub mod entities;
pub mod market_data;
pub mod requests;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{Action, Contract, ContractDetails, Order, OrderType, PositionData, SecurityType};
pub use market_data::{
    Bar, BarData, BarTimeError, BidAskTick, MidpointTick, ScannerData, ScannerSubscription,
    TagValue, Tick, TickAttribBidAsk, TickAttribLast, TickType, TradeTick,
};
pub use requests::{
    BarType, DateFormat, HistoricalDataRequest, OrderRequest, RealtimeBarRequest, ScannerRequest,
    TickByTickDataRequest,
};
pub use values::{ContractId, OrderId, Quantity, RequestId, Timestamp, reserved};
