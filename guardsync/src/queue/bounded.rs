//! # Bounded, blocking queue.
//!
//! A [`BoundedQueue`] holds at most `capacity` items. Producers block in
//! [`push`] while the queue is full and consumers block in [`pop`] while it is
//! empty.
//!
//! Flow control is kept apart from storage. The items live in a
//! [`Monitor<VecDeque<T>>`](Monitor), and two semaphores do the bookkeeping:
//!
//! - `free` counts the empty slots and starts at `capacity`,
//! - `filled` counts the items that a consumer may take and starts at 0.
//!
//! Each item goes through three states: *absent*, *enqueued* (it occupies a
//! slot) and *dequeued* (its slot is free again). Both paths follow the same
//! order: take a permit from the semaphore guarding the transition, touch the
//! container under the monitor, then release a permit on the sibling
//! semaphore.
//!
//! ```text
//!  push:  free.p()   -> push_back  -> filled.v()
//!  pop:   filled.p() -> pop_front  -> free.v()
//! ```
//!
//! Because a producer only inserts after taking a free slot and only
//! publishes the item to consumers after inserting it, `filled` never exceeds
//! the length of the container and `free` never exceeds the number of empty
//! slots. Hence `0 <= len <= capacity` holds at every instant.
//!
//! The non-blocking [`try_pop`] follows the same discipline: it takes a
//! `filled` permit with [`Semaphore::try_p`] before removing anything, and
//! reports an empty queue when no permit is available. Removing an item
//! without consuming its permit would let a later blocking [`pop`] pass on a
//! queue that is actually empty.
//!
//! [`push`]: BoundedQueue::push
//! [`pop`]: BoundedQueue::pop
//! [`try_pop`]: BoundedQueue::try_pop
//! [`Semaphore::try_p`]: crate::sync::Semaphore::try_p

use crate::error::{Error, Result};
use crate::sync::{ExclusiveSemaphore, Monitor};
use std::collections::VecDeque;

/// A FIFO queue with a fixed capacity.
///
/// Insertion blocks while the queue is full, removal blocks while it is empty.
/// Share it between threads with an [`Arc`](std::sync::Arc), or split it into
/// a sender and a receiver with [`channel`](crate::channel()).
#[derive(Debug)]
pub struct BoundedQueue<T> {
    monitor: Monitor<VecDeque<T>>,
    free: ExclusiveSemaphore,
    filled: ExclusiveSemaphore,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue that holds at most `capacity` items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is 0, since such a queue
    /// would block every producer forever.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        tracing::debug!(capacity, "bounded queue created");
        Ok(Self {
            monitor: Monitor::new(VecDeque::with_capacity(capacity)),
            free: ExclusiveSemaphore::new(capacity),
            filled: ExclusiveSemaphore::new(0),
            capacity,
        })
    }

    /// Appends `item` to the back of the queue, blocking while the queue is
    /// full.
    ///
    /// Wakes up one consumer blocked in [`pop`](BoundedQueue::pop), if any.
    pub fn push(&self, item: T) {
        if !self.free.try_p() {
            tracing::trace!(capacity = self.capacity, "queue full, producer waiting");
            self.free.p();
        }
        self.monitor.apply(|q| q.push_back(item));
        self.filled.v();
    }

    /// Appends `item` to the back of the queue if a slot is free right now.
    ///
    /// # Errors
    ///
    /// Gives `item` back when the queue is full.
    pub fn try_push(&self, item: T) -> core::result::Result<(), T> {
        if !self.free.try_p() {
            return Err(item);
        }
        self.monitor.apply(|q| q.push_back(item));
        self.filled.v();
        Ok(())
    }

    /// Removes the item at the front of the queue, blocking while the queue
    /// is empty.
    ///
    /// Wakes up one producer blocked in [`push`](BoundedQueue::push), if any.
    pub fn pop(&self) -> T {
        if !self.filled.try_p() {
            tracing::trace!("queue empty, consumer waiting");
            self.filled.p();
        }
        self.take_front()
    }

    /// Removes the item at the front of the queue, or returns `None` if no
    /// item is available right now.
    ///
    /// Neither semaphore nor the container is touched when the queue is
    /// empty.
    pub fn try_pop(&self) -> Option<T> {
        if !self.filled.try_p() {
            return None;
        }
        Some(self.take_front())
    }

    /// Removes the front item after a `filled` permit was taken, then frees
    /// its slot.
    fn take_front(&self) -> T {
        let Some(item) = self.monitor.apply(VecDeque::pop_front) else {
            unreachable!("a filled-slot permit was taken on an empty queue");
        };
        self.free.v();
        item
    }

    /// Returns `true` if the queue was empty at the time of the call.
    pub fn is_empty(&self) -> bool {
        self.monitor.apply(|q| q.is_empty())
    }

    /// Returns `true` if the queue held `capacity` items at the time of the
    /// call.
    pub fn is_full(&self) -> bool {
        self.monitor.apply(|q| q.len() == self.capacity)
    }

    /// Returns the number of items at the time of the call.
    pub fn len(&self) -> usize {
        self.monitor.apply(|q| q.len())
    }

    /// Returns the maximum number of items the queue can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
