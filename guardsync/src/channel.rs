//! # Single-Producer, Single-Consumer Channel.
//!
//! A channel splits one [`BoundedQueue`] into two capabilities: the
//! [`SendChannel`] can only insert and the [`ReceiveChannel`] can only remove.
//! The restriction is enforced by the types; neither handle exposes the
//! other half's operations.
//!
//! Both halves hold an [`Arc`] to the same queue, created by [`channel`]. The
//! queue is dropped, together with any item still inside, once both halves
//! have been dropped.
//!
//! The intended usage is one producer thread holding the sender and one
//! consumer thread holding the receiver. The halves are not [`Clone`], but
//! nothing prevents sharing one by reference across threads; in that case the
//! only guarantees are those of the underlying [`BoundedQueue`].
//!
//! Besides the named methods, the halves support stream-like operators:
//!
//! ```rust
//! use guardsync::channel;
//!
//! let (tx, rx) = channel(4)?;
//! let _ = &tx << 1 << 2;
//!
//! let (mut a, mut b) = (0, 0);
//! let _ = &rx >> &mut a >> &mut b;
//! assert_eq!((a, b), (1, 2));
//!
//! // An `Option` slot receives without blocking.
//! let mut c: Option<i32> = Some(0);
//! let _ = &rx >> &mut c;
//! assert_eq!(c, None);
//! # Ok::<(), guardsync::Error>(())
//! ```

use crate::error::Result;
use crate::queue::BoundedQueue;
use core::ops::{Shl, Shr};
use std::sync::Arc;

/// Creates a single-producer, single-consumer channel over a new
/// [`BoundedQueue`] of the given capacity.
///
/// # Errors
///
/// Returns [`Error::ZeroCapacity`](crate::Error::ZeroCapacity) if `capacity`
/// is 0.
pub fn channel<T>(capacity: usize) -> Result<(SendChannel<T>, ReceiveChannel<T>)> {
    let queue = Arc::new(BoundedQueue::new(capacity)?);
    tracing::debug!(capacity, "channel created");
    Ok((
        SendChannel {
            queue: queue.clone(),
        },
        ReceiveChannel { queue },
    ))
}

/// The sending half of a [`channel`].
#[derive(Debug)]
pub struct SendChannel<T> {
    queue: Arc<BoundedQueue<T>>,
}

impl<T> SendChannel<T> {
    /// Sends `item`, blocking while the channel is full.
    pub fn send(&self, item: T) {
        self.queue.push(item);
    }

    /// Sends `item` if the channel has room right now.
    ///
    /// # Errors
    ///
    /// Gives `item` back when the channel is full.
    pub fn try_send(&self, item: T) -> core::result::Result<(), T> {
        self.queue.try_push(item)
    }

    /// Returns the capacity of the channel.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

impl<'a, T> Shl<T> for &'a SendChannel<T> {
    type Output = &'a SendChannel<T>;

    /// Sends `item` like [`SendChannel::send`] and returns the sender, so
    /// sends can be chained.
    fn shl(self, item: T) -> Self::Output {
        self.send(item);
        self
    }
}

impl<T> Extend<T> for SendChannel<T> {
    /// Sends every item of `iter` in order, blocking as needed.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.send(item);
        }
    }
}

/// The receiving half of a [`channel`].
#[derive(Debug)]
pub struct ReceiveChannel<T> {
    queue: Arc<BoundedQueue<T>>,
}

impl<T> ReceiveChannel<T> {
    /// Receives the oldest item, blocking while the channel is empty.
    pub fn receive(&self) -> T {
        self.queue.pop()
    }

    /// Receives the oldest item if one is available right now.
    pub fn try_receive(&self) -> Option<T> {
        self.queue.try_pop()
    }

    /// Returns `true` if the channel was empty at the time of the call.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns an iterator that blocks on every item.
    ///
    /// The iterator never ends on its own; bound it with
    /// [`Iterator::take`] or similar.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { rx: self }
    }

    /// Returns an iterator over the items available without blocking.
    pub fn try_iter(&self) -> TryIter<'_, T> {
        TryIter { rx: self }
    }
}

impl<'a, 'b, T> Shr<&'b mut T> for &'a ReceiveChannel<T> {
    type Output = &'a ReceiveChannel<T>;

    /// Receives into `slot` like [`ReceiveChannel::receive`] and returns the
    /// receiver, so receives can be chained.
    fn shr(self, slot: &'b mut T) -> Self::Output {
        *slot = self.receive();
        self
    }
}

impl<'a, 'b, T> Shr<&'b mut Option<T>> for &'a ReceiveChannel<T> {
    type Output = &'a ReceiveChannel<T>;

    /// Stores the result of [`ReceiveChannel::try_receive`] in `slot`, so an
    /// empty channel leaves `None` there instead of blocking.
    fn shr(self, slot: &'b mut Option<T>) -> Self::Output {
        *slot = self.try_receive();
        self
    }
}

impl<'a, T> IntoIterator for &'a ReceiveChannel<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Blocking iterator returned by [`ReceiveChannel::iter`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    rx: &'a ReceiveChannel<T>,
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        Some(self.rx.receive())
    }
}

/// Non-blocking iterator returned by [`ReceiveChannel::try_iter`].
#[derive(Debug)]
pub struct TryIter<'a, T> {
    rx: &'a ReceiveChannel<T>,
}

impl<T> Iterator for TryIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.rx.try_receive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_utils::init_test_logging;
    use std::thread;

    #[test]
    fn zero_capacity_is_rejected() {
        init_test_logging();
        assert_eq!(channel::<u8>(0).unwrap_err(), Error::ZeroCapacity);
    }

    #[test]
    fn spsc_delivers_in_order() {
        init_test_logging();
        let (tx, rx) = channel(1).unwrap();
        let producer = thread::spawn(move || {
            for i in 1..=5 {
                tx.send(i);
            }
        });
        let consumer = thread::spawn(move || rx.iter().take(5).collect::<Vec<_>>());
        producer.join().unwrap();
        assert_eq!(consumer.join().unwrap(), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn try_receive_does_not_block() {
        init_test_logging();
        let (tx, rx) = channel(2).unwrap();
        assert_eq!(rx.try_receive(), None);
        tx.send('a');
        assert_eq!(tx.try_send('b'), Ok(()));
        assert_eq!(tx.try_send('c'), Err('c'));
        assert_eq!(rx.try_iter().collect::<String>(), "ab");
        assert!(rx.is_empty());
        // A later blocking receive is matched by a send, not by the drained items.
        tx.send('d');
        assert_eq!(rx.receive(), 'd');
    }

    #[test]
    fn operators_send_and_receive() {
        init_test_logging();
        let (mut tx, rx) = channel(8).unwrap();
        let _ = &tx << "x".to_owned() << "y".to_owned();
        tx.extend(["z".to_owned()]);
        assert_eq!(tx.capacity(), 8);

        let (mut a, mut b, mut c) = (String::new(), String::new(), String::new());
        let _ = &rx >> &mut a >> &mut b >> &mut c;
        assert_eq!([a, b, c], ["x", "y", "z"]);
    }

    #[test]
    fn option_slot_receives_without_blocking() {
        init_test_logging();
        let (tx, rx) = channel::<i32>(1).unwrap();

        let mut slot = Some(-1);
        let _ = &rx >> &mut slot;
        assert_eq!(slot, None, "empty channel clears the slot");

        tx.send(1);
        let _ = &rx >> &mut slot;
        assert_eq!(slot, Some(1));
        assert!(rx.is_empty());

        // Blocking and non-blocking slots chain on one receiver.
        let _ = &tx << 2;
        let mut value = 0;
        let _ = &rx >> &mut value >> &mut slot;
        assert_eq!((value, slot), (2, None));
    }

    #[test]
    fn queue_is_dropped_with_both_halves() {
        init_test_logging();
        let token = Arc::new(());
        let (tx, rx) = channel(1).unwrap();
        tx.send(token.clone());
        assert_eq!(Arc::strong_count(&token), 2);

        drop(tx);
        assert_eq!(Arc::strong_count(&token), 2, "receiver still owns the queue");
        drop(rx);
        assert_eq!(Arc::strong_count(&token), 1);
    }
}
