//! Relay Correlation
//!
//! Turns the peer's asynchronous callbacks into blocking, per-request results.
//! Provides:
//! - `KeyedSignalStore`: lazily-created slot per request id (value + wake signal)
//! - `Correlator`: single-value and chained-sequence replies with timeouts
//! - `WindowBuffer`: latest-N windows for live streams
//!
//! ## Flow
//!
//! ```text
//!  caller thread                          delivery thread
//!  ─────────────                          ───────────────
//!  expect(key) ──► send request ──► peer ──► callback
//!       │                                      │ store / append / end_sequence
//!  wait(timeout) ◄──────── slot signal ◄───────┘
//!       │
//!  drop handle ──► delete(key)
//! ```

pub mod correlator;
pub mod error;
pub mod store;
pub mod window;

pub use correlator::{Correlator, DEFAULT_RESPONSE_TIMEOUT, PendingReply, Reply};
pub use error::{CorrelationError, Result};
pub use store::{KeyedSignalStore, Slot, SlotState};
pub use window::{DEFAULT_WINDOW_LENGTH, Window, WindowBuffer};
