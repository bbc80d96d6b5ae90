//! Transport that records outbound requests instead of sending them
//!
//! Test support, compiled for this crate's tests and behind the `testing`
//! feature for downstream ones. Request components are exercised against it
//! and the test plays the peer by dispatching events once the expected
//! request shows up.

use parking_lot::{Condvar, Mutex};
use relay_ports::{OutboundRequest, Transport, TransportError, TransportResult};
use std::time::{Duration, Instant};

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundRequest>>,
    arrived: Condvar,
    disconnected: Mutex<bool>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `send` fail with `NotConnected`
    pub fn disconnect(&self) {
        *self.disconnected.lock() = true;
    }

    /// Everything sent so far, oldest first
    pub fn sent(&self) -> Vec<OutboundRequest> {
        self.sent.lock().clone()
    }

    pub fn last(&self) -> Option<OutboundRequest> {
        self.sent.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }

    /// Block until a request matching `predicate` has been sent
    pub fn wait_for<F>(&self, predicate: F, timeout: Duration) -> Option<OutboundRequest>
    where
        F: Fn(&OutboundRequest) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut sent = self.sent.lock();
        loop {
            if let Some(found) = sent.iter().find(|r| predicate(r)) {
                return Some(found.clone());
            }
            if self.arrived.wait_until(&mut sent, deadline).timed_out() {
                return sent.iter().find(|r| predicate(r)).cloned();
            }
        }
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: OutboundRequest) -> TransportResult<()> {
        if *self.disconnected.lock() {
            return Err(TransportError::NotConnected);
        }
        self.sent.lock().push(request);
        self.arrived.notify_all();
        Ok(())
    }

    fn name(&self) -> &str {
        "RecordingTransport"
    }
}
