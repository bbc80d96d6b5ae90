//! Request/response correlator
//!
//! Turns callbacks delivered on the peer's thread into blocking results for
//! the calling thread. Two delivery disciplines share one slot per key:
//!
//! - **single value**: `store` replaces the value and wakes the waiter
//! - **sequence**: `begin_sequence` / `append_to_sequence` build a list,
//!   `end_sequence` wakes the waiter once the list is complete
//!
//! Every read hands back an owned clone; nothing a producer can still mutate
//! escapes the slot lock.

use log::{debug, warn};
use relay_core::RequestId;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{CorrelationError, Result};
use crate::store::{KeyedSignalStore, Slot};

/// Default time a caller waits for a correlated response
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Contents of a correlation slot
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Reply<T> {
    /// Slot exists but nothing has been written yet
    #[default]
    Pending,
    /// Most recent single value
    Value(T),
    /// Accumulated sequence, in callback order
    Sequence(Vec<T>),
}

impl<T> Reply<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_sequence(self) -> Option<Vec<T>> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

/// Blocking correlation of asynchronous replies by request id
pub struct Correlator<T> {
    store: KeyedSignalStore<Reply<T>>,
}

impl<T: Clone + Send + 'static> Default for Correlator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Correlator<T> {
    pub fn new() -> Self {
        Self {
            store: KeyedSignalStore::new(),
        }
    }

    /// Block until `key` is signalled or `timeout` elapses.
    ///
    /// On success the slot's value is copied out and the signal cleared, so a
    /// second call blocks again until the next `store` / `end_sequence`.
    /// Creates the slot if no producer has touched the key yet.
    pub fn await_response(&self, key: RequestId, timeout: Duration) -> Result<Reply<T>> {
        wait_on(&self.store.get_or_create(key), key, timeout)
    }

    /// [`await_response`](Self::await_response) for a single-value reply
    pub fn await_value(&self, key: RequestId, timeout: Duration) -> Result<T> {
        expect_value(key, self.await_response(key, timeout)?)
    }

    /// [`await_response`](Self::await_response) for a sequence reply
    pub fn await_sequence(&self, key: RequestId, timeout: Duration) -> Result<Vec<T>> {
        expect_items(key, self.await_response(key, timeout)?)
    }

    /// Producer side: replace the value and wake the waiter
    pub fn store(&self, key: RequestId, value: T) {
        self.store.update(key, |state| {
            state.replace(Reply::Value(value));
            state.raise();
        });
    }

    /// Reset the slot to an empty sequence; the signal is left untouched
    pub fn begin_sequence(&self, key: RequestId) {
        self.store.update(key, |state| {
            state.replace(Reply::Sequence(Vec::new()));
        });
    }

    /// Append to the key's sequence without waking the waiter.
    ///
    /// A slot not holding a sequence is converted into a one-element sequence.
    pub fn append_to_sequence(&self, key: RequestId, value: T) {
        self.store
            .update(key, |state| push_onto(state.value_mut(), key, value));
    }

    /// Mark the key's sequence complete and wake the waiter
    pub fn end_sequence(&self, key: RequestId) {
        self.store.update(key, |state| state.raise());
    }

    /// [`append_to_sequence`](Self::append_to_sequence) for keys that are
    /// still outstanding. Late parts for a released key are dropped.
    pub fn append_if_present(&self, key: RequestId, value: T) -> bool {
        self.store
            .update_existing(key, |state| push_onto(state.value_mut(), key, value))
            .is_some()
    }

    /// [`end_sequence`](Self::end_sequence) for keys that are still outstanding
    pub fn end_sequence_if_present(&self, key: RequestId) -> bool {
        self.store
            .update_existing(key, |state| state.raise())
            .is_some()
    }

    /// Release the key's state. Waiters on it fail with `Cancelled`.
    /// Unknown keys are a no-op.
    pub fn delete(&self, key: RequestId) -> bool {
        self.store.remove(key)
    }

    /// Whether the key currently holds state
    pub fn exists(&self, key: RequestId) -> bool {
        self.store.contains(key)
    }

    /// Non-blocking copy of the key's current contents
    pub fn peek(&self, key: RequestId) -> Result<Reply<T>> {
        self.store
            .read(key, |state| state.value().clone())
            .ok_or(CorrelationError::NotFound(key))
    }

    /// Keys currently holding state
    pub fn keys(&self) -> Vec<RequestId> {
        self.store.keys()
    }

    /// Open a fresh single-value wait cycle for `key`.
    ///
    /// Any stale value or signal is discarded. Call before sending the
    /// request; the returned handle releases the key when dropped.
    pub fn expect(&self, key: RequestId) -> PendingReply<'_, T> {
        self.open(key, Reply::Pending)
    }

    /// Open a fresh sequence wait cycle for `key`
    pub fn expect_sequence(&self, key: RequestId) -> PendingReply<'_, T> {
        self.open(key, Reply::Sequence(Vec::new()))
    }

    fn open(&self, key: RequestId, initial: Reply<T>) -> PendingReply<'_, T> {
        let (slot, _) = self.store.update_slot(key, |state| {
            state.replace(initial);
            state.clear();
        });
        PendingReply {
            correlator: self,
            key,
            slot,
        }
    }
}

/// Handle for one outstanding request.
///
/// Bound to the slot opened by `expect`: deleting the key while the handle
/// is alive fails its wait with `Cancelled`. Dropping the handle (after a
/// wait, or on an early return) releases that slot, unless a newer cycle
/// already replaced it.
pub struct PendingReply<'a, T: Clone + Send + 'static> {
    correlator: &'a Correlator<T>,
    key: RequestId,
    slot: Arc<Slot<Reply<T>>>,
}

impl<T: Clone + Send + 'static> PendingReply<'_, T> {
    pub fn key(&self) -> RequestId {
        self.key
    }

    pub fn wait(self, timeout: Duration) -> Result<Reply<T>> {
        wait_on(&self.slot, self.key, timeout)
    }

    pub fn wait_value(self, timeout: Duration) -> Result<T> {
        let key = self.key;
        expect_value(key, self.wait(timeout)?)
    }

    pub fn wait_sequence(self, timeout: Duration) -> Result<Vec<T>> {
        let key = self.key;
        expect_items(key, self.wait(timeout)?)
    }
}

impl<T: Clone + Send + 'static> Drop for PendingReply<'_, T> {
    fn drop(&mut self) {
        self.correlator.store.remove_slot(self.key, &self.slot);
    }
}

/// Block on one slot until it is signalled, retired, or `timeout` elapses.
///
/// On success the value is copied out and the signal cleared.
fn wait_on<T: Clone>(
    slot: &Slot<Reply<T>>,
    key: RequestId,
    timeout: Duration,
) -> Result<Reply<T>> {
    let mut state = slot.wait_until(deadline_after(timeout));
    if state.is_signalled() {
        state.clear();
        return Ok(state.value().clone());
    }

    if state.is_retired() {
        debug!("Wait for key {} cancelled", key);
        return Err(CorrelationError::Cancelled(key));
    }

    debug!("Timed out after {:?} waiting for key {}", timeout, key);
    Err(CorrelationError::Timeout { key, timeout })
}

fn expect_value<T>(key: RequestId, reply: Reply<T>) -> Result<T> {
    reply.into_value().ok_or(CorrelationError::UnexpectedShape {
        key,
        expected: "single value",
    })
}

fn expect_items<T>(key: RequestId, reply: Reply<T>) -> Result<Vec<T>> {
    reply.into_sequence().ok_or(CorrelationError::UnexpectedShape {
        key,
        expected: "sequence",
    })
}

fn push_onto<T>(reply: &mut Reply<T>, key: RequestId, value: T) {
    match reply {
        Reply::Sequence(items) => items.push(value),
        other => {
            warn!("Append to key {} without an open sequence, starting one", key);
            *other = Reply::Sequence(vec![value]);
        }
    }
}

fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(u32::MAX as u64))
}
