//! Transport implementations
//!
//! The outbound side implements [`relay_ports::Transport`]; the inbound side
//! is a stream of [`Event`](crate::messages::Event)s drained by the delivery
//! loop. Both use tokio unbounded channels: `send` never blocks the caller,
//! and the delivery thread reads with `blocking_recv`.

pub mod channel;
#[cfg(any(test, feature = "testing"))]
pub mod recording;

pub use channel::{ChannelTransport, EventReceiver, EventSender, OutboundReceiver, event_channel};
#[cfg(any(test, feature = "testing"))]
pub use recording::RecordingTransport;
