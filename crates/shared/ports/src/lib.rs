//! Relay Ports
//!
//! Port definitions (traits) for the Relay bridge.
//! These define the boundary between the correlation/handler logic and the
//! connection to the peer, which lives outside this workspace.

mod error;
mod transport;

pub use error::{TransportError, TransportResult};
pub use transport::{OutboundRequest, Transport};
