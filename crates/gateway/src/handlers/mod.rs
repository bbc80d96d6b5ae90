//! Request components
//!
//! Each component issues one family of requests through the [`Transport`]
//! port and handles the callbacks that answer them. Components own disjoint
//! key spaces:
//!
//! - session: reserved negative ids (`relay_core::reserved`)
//! - market data: caller-chosen positive request ids
//! - orders: order ids
//! - account: reserved `POSITIONS_END` plus contract ids for positions
//!
//! [`Transport`]: relay_ports::Transport

pub mod account;
pub mod market_data;
pub mod orders;
pub mod session;

pub use account::AccountComponent;
pub use market_data::MarketDataComponent;
pub use orders::OrderComponent;
pub use session::SessionComponent;

use log::warn;
use relay_core::{RequestId, reserved};
use std::sync::Arc;

use crate::error::{GatewayError, GatewayResult};
use crate::messages::Event;

/// Something holding a blocked request that a peer error can end early
pub trait RequestCanceller: Send + Sync {
    /// Release the pending state for `request_id`; true if there was any
    fn cancel_pending(&self, request_id: RequestId) -> bool;
}

/// Reject caller-chosen ids that collide with the reserved session keys
pub(crate) fn ensure_not_reserved(request_id: RequestId) -> GatewayResult<()> {
    if reserved::is_reserved(request_id) {
        return Err(GatewayError::InvalidRequest(format!(
            "request id {} is reserved",
            request_id
        )));
    }
    Ok(())
}

/// Wrap a component method as a handler closure
pub(crate) fn bind<C, F>(component: &Arc<C>, handler: F) -> impl Fn(&Event) + Send + Sync + 'static
where
    C: Send + Sync + 'static,
    F: Fn(&C, &Event) + Send + Sync + 'static,
{
    let component = Arc::clone(component);
    move |event| handler(&component, event)
}

/// Log an event whose payload does not match the handler it reached
pub(crate) fn mismatched(component: &str, handler: &str, event: &Event) {
    warn!(
        "{}::{} received mismatched event {:?}",
        component,
        handler,
        event.kind()
    );
}
