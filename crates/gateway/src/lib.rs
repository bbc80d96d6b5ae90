//! Relay Gateway
//!
//! Synchronous request API over an asynchronous callback protocol. Provides:
//! - Request components (session, market data, orders, account) that send
//!   through the [`Transport`](relay_ports::Transport) port and block on
//!   correlated replies
//! - A callback router that binds each peer callback to the first component
//!   defining a matching `on_*` handler
//! - Channel transports and a session runner for strategies
//!
//! ## Architecture
//!
//! ```text
//!   strategy thread                       peer connection
//!        │ request_*()                          │ callbacks
//!   ┌────▼──────┐   OutboundRequest    ┌────────▼────────┐
//!   │ Component ├─────────────────────►│    Transport    │
//!   └────┬──────┘                      └────────┬────────┘
//!        │ wait on key                          │ Event
//!   ┌────▼──────┐   store / append     ┌────────▼────────┐
//!   │Correlator │◄─────────────────────┤ CallbackRouter  │
//!   │ / Window  │   (delivery thread)  │  on_<snake>     │
//!   └───────────┘                      └─────────────────┘
//! ```
//!
//! The delivery loop must run on a different thread than the one issuing
//! blocking requests, otherwise a request waits on a reply it is itself
//! responsible for delivering.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod messages;
pub mod router;
pub mod runner;
pub mod transport;

// Re-export commonly used types
pub use client::Client;
pub use config::{GatewayConfig, load_config, load_default_config};
pub use error::{GatewayError, GatewayResult};
pub use handlers::{AccountComponent, MarketDataComponent, OrderComponent, SessionComponent};
pub use messages::{Event, EventKind};
pub use router::{CallbackRouter, EventHandler, HandlerTable};
pub use runner::{Session, SessionReport, StopReason, Strategy, init_logging};
pub use transport::{ChannelTransport, EventReceiver, EventSender, event_channel};

#[cfg(any(test, feature = "testing"))]
pub use transport::RecordingTransport;
