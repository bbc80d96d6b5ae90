//! Keyed signal store
//!
//! One slot per request id: a value guarded by its own mutex, plus a wake
//! signal waiters block on. Slots are created lazily on first touch.
//!
//! ## Locking
//!
//! ```text
//! DashMap shard lock (coarse, map structure)  ──►  never held while locking a slot
//! Slot mutex (fine, value + signal)           ──►  may briefly take a shard lock (remove)
//! ```
//!
//! Waiting on a slot's signal releases the slot mutex and never touches the
//! map, so a blocked caller does not stall any other key.

use dashmap::DashMap;
use parking_lot::{Condvar, Mutex, MutexGuard};
use relay_core::RequestId;
use std::sync::Arc;
use std::time::Instant;

/// Value and signal state of one slot, only reachable through the slot lock
#[derive(Debug)]
pub struct SlotState<V> {
    value: V,
    signalled: bool,
    retired: bool,
}

impl<V> SlotState<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            signalled: false,
            retired: false,
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Replace the value, returning the previous one
    pub fn replace(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    /// Set the wake signal. Waiters are notified when the lock is released
    /// by [`KeyedSignalStore::update`].
    pub fn raise(&mut self) {
        self.signalled = true;
    }

    /// Clear the wake signal
    pub fn clear(&mut self) {
        self.signalled = false;
    }

    pub fn is_signalled(&self) -> bool {
        self.signalled
    }

    /// A retired slot has been removed from the store; writes to it are lost
    pub fn is_retired(&self) -> bool {
        self.retired
    }
}

/// Per-key mutex + condition variable
#[derive(Debug)]
pub struct Slot<V> {
    state: Mutex<SlotState<V>>,
    signal: Condvar,
}

impl<V> Slot<V> {
    fn new(value: V) -> Self {
        Self {
            state: Mutex::new(SlotState::new(value)),
            signal: Condvar::new(),
        }
    }

    /// Acquire the slot lock
    pub fn lock(&self) -> MutexGuard<'_, SlotState<V>> {
        self.state.lock()
    }

    /// Block until the slot is signalled, retired, or `deadline` passes.
    ///
    /// Returns the held lock; the caller inspects the state to tell which of
    /// the three happened.
    pub fn wait_until(&self, deadline: Instant) -> MutexGuard<'_, SlotState<V>> {
        let mut state = self.state.lock();
        while !state.signalled && !state.retired {
            if self.signal.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        state
    }
}

/// Lazily-populated map from request id to slot
pub struct KeyedSignalStore<V> {
    slots: DashMap<RequestId, Arc<Slot<V>>>,
    factory: Box<dyn Fn() -> V + Send + Sync>,
}

impl<V: Default + 'static> KeyedSignalStore<V> {
    /// Store whose new slots start at `V::default()`
    pub fn new() -> Self {
        Self::with_factory(V::default)
    }
}

impl<V: Default + 'static> Default for KeyedSignalStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyedSignalStore<V> {
    /// Store whose new slots start at `factory()`
    pub fn with_factory(factory: impl Fn() -> V + Send + Sync + 'static) -> Self {
        Self {
            slots: DashMap::new(),
            factory: Box::new(factory),
        }
    }

    /// Return the slot for `key`, creating it if needed.
    ///
    /// Concurrent callers for the same key always get the same slot.
    pub fn get_or_create(&self, key: RequestId) -> Arc<Slot<V>> {
        if let Some(slot) = self.slots.get(&key) {
            return Arc::clone(slot.value());
        }

        Arc::clone(
            self.slots
                .entry(key)
                .or_insert_with(|| Arc::new(Slot::new((self.factory)())))
                .value(),
        )
    }

    /// Return the slot for `key` without creating it
    pub fn get(&self, key: RequestId) -> Option<Arc<Slot<V>>> {
        self.slots.get(&key).map(|slot| Arc::clone(slot.value()))
    }

    pub fn contains(&self, key: RequestId) -> bool {
        self.slots.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Keys currently holding state, in no particular order
    pub fn keys(&self) -> Vec<RequestId> {
        self.slots.iter().map(|entry| *entry.key()).collect()
    }

    /// Mutate the slot for `key` under its lock, creating it if needed.
    ///
    /// If `f` leaves the signal raised, every waiter is woken before the
    /// lock is released. A slot retired by a concurrent [`remove`](Self::remove)
    /// is skipped and a fresh one is used instead.
    pub fn update<R>(&self, key: RequestId, f: impl FnOnce(&mut SlotState<V>) -> R) -> R {
        self.update_slot(key, f).1
    }

    /// [`update`](Self::update), also handing back the slot that was written
    pub fn update_slot<R>(
        &self,
        key: RequestId,
        f: impl FnOnce(&mut SlotState<V>) -> R,
    ) -> (Arc<Slot<V>>, R) {
        let mut slot = self.get_or_create(key);
        loop {
            let mut state = slot.lock();
            if !state.retired {
                let result = f(&mut state);
                if state.signalled {
                    slot.signal.notify_all();
                }
                drop(state);
                return (slot, result);
            }
            drop(state);
            slot = self.get_or_create(key);
        }
    }

    /// Like [`update`](Self::update), but only if `key` already has a slot
    pub fn update_existing<R>(
        &self,
        key: RequestId,
        f: impl FnOnce(&mut SlotState<V>) -> R,
    ) -> Option<R> {
        let slot = self.get(key)?;
        let mut state = slot.lock();
        if state.retired {
            return None;
        }
        let result = f(&mut state);
        if state.signalled {
            slot.signal.notify_all();
        }
        Some(result)
    }

    /// Read the slot for `key` under its lock without creating it
    pub fn read<R>(&self, key: RequestId, f: impl FnOnce(&SlotState<V>) -> R) -> Option<R> {
        let slot = self.get(key)?;
        let state = slot.lock();
        if state.retired {
            return None;
        }
        Some(f(&state))
    }

    /// Two-phase removal.
    ///
    /// The entry is looked up under the map lock, then its slot lock is taken
    /// and the entry removed only if it is still the same slot. The slot is
    /// marked retired and its waiters woken before the slot lock is released,
    /// so no producer can write into it afterwards. Returns false for unknown
    /// keys or when another remover won the race.
    pub fn remove(&self, key: RequestId) -> bool {
        let Some(slot) = self.get(key) else {
            return false;
        };
        self.remove_slot(key, &slot)
    }

    /// [`remove`](Self::remove), but only while `key` still maps to `slot`.
    ///
    /// A slot that was already replaced by a fresh one leaves the fresh one
    /// in place.
    pub fn remove_slot(&self, key: RequestId, slot: &Arc<Slot<V>>) -> bool {
        let mut state = slot.lock();
        if state.retired {
            return false;
        }

        let removed = self
            .slots
            .remove_if(&key, |_, current| Arc::ptr_eq(current, slot))
            .is_some();

        if removed {
            state.retired = true;
            slot.signal.notify_all();
        }
        removed
    }
}
