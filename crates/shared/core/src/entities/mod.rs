mod action;
mod contract;
mod order;
mod order_type;
mod position;

pub use action::Action;
pub use contract::{Contract, ContractDetails, SecurityType};
pub use order::Order;
pub use order_type::OrderType;
pub use position::PositionData;
