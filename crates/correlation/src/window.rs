//! Bounded window buffers
//!
//! Latest-N view of a live stream per request id. Appends past capacity
//! evict the oldest element in arrival order. Windows are read with
//! [`WindowBuffer::snapshot`] and never signal a waiter.

use relay_core::RequestId;
use std::collections::VecDeque;

use crate::store::KeyedSignalStore;

/// Default number of elements kept per stream
pub const DEFAULT_WINDOW_LENGTH: usize = 10;

/// Fixed-capacity FIFO
#[derive(Debug, Clone, PartialEq)]
pub struct Window<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> Window<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    /// Push to the back, evicting from the front when full.
    /// A zero-capacity window keeps nothing.
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Overwrite the last element if its marker matches `item`'s, else push
    pub fn replace_or_push_by<M, F>(&mut self, item: T, marker: F)
    where
        M: PartialEq,
        F: Fn(&T) -> M,
    {
        if let Some(last) = self.items.back_mut() {
            if marker(last) == marker(&item) {
                *last = item;
                return;
            }
        }
        self.push(item);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Clone> Window<T> {
    /// Oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

/// Windows keyed by request id, sharing the keyed store's locking
pub struct WindowBuffer<T> {
    windows: KeyedSignalStore<Window<T>>,
    default_capacity: usize,
}

impl<T: Send + 'static> Default for WindowBuffer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_LENGTH)
    }
}

impl<T: Send + 'static> WindowBuffer<T> {
    /// Windows created implicitly by an append get `default_capacity`
    pub fn new(default_capacity: usize) -> Self {
        Self {
            windows: KeyedSignalStore::with_factory(move || Window::new(default_capacity)),
            default_capacity,
        }
    }

    pub fn default_capacity(&self) -> usize {
        self.default_capacity
    }

    /// (Re)create the window for `key`, discarding prior contents
    pub fn init(&self, key: RequestId, capacity: usize) {
        self.windows.update(key, |state| {
            state.replace(Window::new(capacity));
        });
    }

    pub fn append(&self, key: RequestId, item: T) {
        self.windows
            .update(key, |state| state.value_mut().push(item));
    }

    /// Overwrite the newest element when `marker` matches, else append.
    ///
    /// Used for bar streams where the peer revises the still-open bar.
    pub fn replace_or_append_by_marker<M, F>(&self, key: RequestId, item: T, marker: F)
    where
        M: PartialEq,
        F: Fn(&T) -> M,
    {
        self.windows
            .update(key, |state| state.value_mut().replace_or_push_by(item, marker));
    }

    /// [`append`](Self::append) for windows that are still subscribed.
    /// Items for a removed window are dropped instead of recreating it.
    pub fn append_if_present(&self, key: RequestId, item: T) -> bool {
        self.windows
            .update_existing(key, |state| state.value_mut().push(item))
            .is_some()
    }

    /// [`replace_or_append_by_marker`](Self::replace_or_append_by_marker)
    /// without recreating a removed window
    pub fn replace_or_append_if_present<M, F>(&self, key: RequestId, item: T, marker: F) -> bool
    where
        M: PartialEq,
        F: Fn(&T) -> M,
    {
        self.windows
            .update_existing(key, |state| state.value_mut().replace_or_push_by(item, marker))
            .is_some()
    }

    pub fn exists(&self, key: RequestId) -> bool {
        self.windows.contains(key)
    }

    pub fn remove(&self, key: RequestId) -> bool {
        self.windows.remove(key)
    }

    pub fn keys(&self) -> Vec<RequestId> {
        self.windows.keys()
    }
}

impl<T: Clone + Send + 'static> WindowBuffer<T> {
    /// Independent copy of the window, oldest first.
    /// Unknown keys yield an empty vector and are not created.
    pub fn snapshot(&self, key: RequestId) -> Vec<T> {
        self.windows
            .read(key, |state| state.value().to_vec())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_evicts_oldest() {
        let mut window = Window::new(3);
        for c in ['a', 'b', 'c', 'd', 'e'] {
            window.push(c);
        }
        assert_eq!(window.to_vec(), vec!['c', 'd', 'e']);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut window = Window::new(0);
        window.push(1);
        window.replace_or_push_by(2, |v| *v);
        assert!(window.is_empty());
    }

    #[test]
    fn test_replace_on_empty_window_pushes() {
        let mut window = Window::new(2);
        window.replace_or_push_by((10, "x"), |(t, _)| *t);
        assert_eq!(window.to_vec(), vec![(10, "x")]);
    }

    #[test]
    fn test_replace_only_touches_last() {
        let mut window = Window::new(5);
        window.push((10, 'a'));
        window.push((11, 'b'));
        // Matches the first element but not the last
        window.replace_or_push_by((10, 'c'), |(t, _)| *t);
        assert_eq!(window.to_vec(), vec![(10, 'a'), (11, 'b'), (10, 'c')]);
    }

    #[test]
    fn test_buffer_snapshot_unknown_key() {
        let buffer: WindowBuffer<i32> = WindowBuffer::default();
        assert!(buffer.snapshot(77).is_empty());
        assert!(!buffer.exists(77));
    }

    #[test]
    fn test_buffer_append_uses_default_capacity() {
        let buffer = WindowBuffer::new(2);
        buffer.append(1, 'a');
        buffer.append(1, 'b');
        buffer.append(1, 'c');
        assert_eq!(buffer.snapshot(1), vec!['b', 'c']);
    }

    #[test]
    fn test_buffer_init_resets() {
        let buffer = WindowBuffer::new(2);
        buffer.append(1, 1);
        buffer.init(1, 4);
        assert!(buffer.snapshot(1).is_empty());

        for i in 0..6 {
            buffer.append(1, i);
        }
        assert_eq!(buffer.snapshot(1), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let buffer = WindowBuffer::new(3);
        buffer.append(2, 1);
        let before = buffer.snapshot(2);
        buffer.append(2, 2);

        assert_eq!(before, vec![1]);
        assert_eq!(buffer.snapshot(2), vec![1, 2]);
    }

    #[test]
    fn test_buffer_remove() {
        let buffer = WindowBuffer::new(3);
        buffer.append(3, 'x');
        assert!(buffer.remove(3));
        assert!(!buffer.exists(3));
        assert!(buffer.snapshot(3).is_empty());
    }

    #[test]
    fn test_late_append_after_remove_is_dropped() {
        let buffer = WindowBuffer::new(5);
        buffer.init(11, 3);
        assert!(buffer.append_if_present(11, 1));
        assert!(buffer.remove(11));

        assert!(!buffer.append_if_present(11, 99));
        assert!(!buffer.replace_or_append_if_present(11, 100, |v| *v));
        assert!(!buffer.exists(11));
        assert!(buffer.keys().is_empty());
    }

    #[test]
    fn test_replace_if_present_revises_last() {
        let buffer = WindowBuffer::new(5);
        buffer.init(12, 3);
        buffer.append(12, (1, 'a'));

        assert!(buffer.replace_or_append_if_present(12, (1, 'b'), |v| v.0));
        assert!(buffer.replace_or_append_if_present(12, (2, 'c'), |v| v.0));
        assert_eq!(buffer.snapshot(12), vec![(1, 'b'), (2, 'c')]);
    }
}
