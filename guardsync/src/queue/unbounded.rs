//! Unbounded, non-blocking queue.

use crate::sync::Monitor;
use std::collections::VecDeque;

/// A FIFO queue without capacity limit.
///
/// The callers of [`push`] and [`pop`] are never blocked for longer than the
/// insertion into or removal from the container. [`pop`] on an empty queue
/// returns `None` instead of waiting; use a [`BoundedQueue`] when consumers
/// should block.
///
/// [`push`]: UnboundedQueue::push
/// [`pop`]: UnboundedQueue::pop
/// [`BoundedQueue`]: crate::queue::BoundedQueue
#[derive(Debug)]
pub struct UnboundedQueue<T> {
    monitor: Monitor<VecDeque<T>>,
}

impl<T> UnboundedQueue<T> {
    /// Creates an empty queue.
    pub const fn new() -> Self {
        Self {
            monitor: Monitor::new(VecDeque::new()),
        }
    }

    /// Appends `item` to the back of the queue.
    pub fn push(&self, item: T) {
        self.monitor.apply(|q| q.push_back(item));
    }

    /// Removes the item at the front of the queue, or returns `None` if the
    /// queue is empty.
    pub fn pop(&self) -> Option<T> {
        self.monitor.apply(VecDeque::pop_front)
    }

    /// Returns `true` if the queue was empty at the time of the call.
    pub fn is_empty(&self) -> bool {
        self.monitor.apply(|q| q.is_empty())
    }

    /// Returns the number of items at the time of the call.
    pub fn len(&self) -> usize {
        self.monitor.apply(|q| q.len())
    }
}

impl<T> Default for UnboundedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for UnboundedQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.monitor.get_mut().extend(iter);
    }
}

impl<T> FromIterator<T> for UnboundedQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            monitor: Monitor::new(iter.into_iter().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fifo_order() {
        init_test_logging();
        let q = UnboundedQueue::new();
        q.push(1);
        q.push(2);
        q.push(3);
        assert_eq!(q.len(), 3);
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), Some(3));
    }

    #[test]
    fn pop_on_empty_returns_none() {
        init_test_logging();
        let q = UnboundedQueue::<String>::default();
        assert!(q.is_empty());
        assert_eq!(q.pop(), None);
        q.push("x".to_owned());
        assert!(!q.is_empty());
        assert_eq!(q.pop().as_deref(), Some("x"));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn collect_and_extend() {
        init_test_logging();
        let mut q: UnboundedQueue<_> = (0..3).collect();
        q.extend(3..5);
        let drained: Vec<_> = std::iter::from_fn(|| q.pop()).collect();
        assert_eq!(drained, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn concurrent_producers_keep_per_producer_order() {
        init_test_logging();
        const PRODUCERS: usize = 4;
        const ITEMS: usize = 500;
        let q = Arc::new(UnboundedQueue::new());

        let handles: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let q = q.clone();
                thread::spawn(move || {
                    for i in 0..ITEMS {
                        q.push((p, i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut next = [0usize; PRODUCERS];
        while let Some((p, i)) = q.pop() {
            assert_eq!(i, next[p], "items of producer {p} reordered");
            next[p] += 1;
        }
        assert_eq!(next, [ITEMS; PRODUCERS]);
    }
}
