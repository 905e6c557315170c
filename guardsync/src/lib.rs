//! # guardsync: Monitors, Semaphores and Producer/Consumer Queues
//!
//! This crate provides a small stack of blocking synchronization primitives
//! for OS threads. Each layer is built only from the layer below it, so the
//! whole stack ultimately rests on one mutex and one condition variable per
//! guarded object.
//!
//! ## Layers
//!
//! From the leaves to the root:
//!
//! 1. [`GuardedValue`]: a value protected by a mutex and paired with a
//!    condition variable. Threads can read it, mutate it, or block until a
//!    predicate over it holds.
//! 2. [`Monitor`]: a resource protected by a mutex alone. Every access runs a
//!    closure while the lock is held.
//! 3. [`Semaphore`]: a counting semaphore on top of a
//!    [`GuardedValue<usize>`](GuardedValue), together with the
//!    [`SharedSemaphore`] and [`ExclusiveSemaphore`] handles.
//! 4. [`UnboundedQueue`] and [`BoundedQueue`]: FIFO containers inside a
//!    [`Monitor`]. The bounded one is flow-controlled by two semaphores, one
//!    counting free slots and one counting filled slots.
//! 5. [`channel`]: a single-producer/single-consumer pair of handles,
//!    [`SendChannel`] and [`ReceiveChannel`], over one shared
//!    [`BoundedQueue`].
//!
//! ## Blocking
//!
//! Only the waiting operations suspend the calling thread:
//! [`GuardedValue::wait`], [`GuardedValue::wait_then_mutate`],
//! [`Semaphore::p`] and everything built on them ([`BoundedQueue::push`],
//! [`BoundedQueue::pop`], [`SendChannel::send`], [`ReceiveChannel::receive`]).
//! None of them accept a deadline. A blocking call that never gets its
//! complementary operation from another thread blocks forever.
//!
//! No primitive is fair. When several threads wait on the same semaphore or
//! the same lock, which one proceeds next is up to the operating system.
//!
//! ## Example
//!
//! ```rust
//! use guardsync::channel;
//! use std::thread;
//!
//! let (tx, rx) = channel::<u32>(1)?;
//!
//! let producer = thread::spawn(move || {
//!     for i in 1..=5 {
//!         tx.send(i);
//!     }
//! });
//!
//! let received: Vec<u32> = (0..5).map(|_| rx.receive()).collect();
//! producer.join().unwrap();
//! assert_eq!(received, [1, 2, 3, 4, 5]);
//! # Ok::<(), guardsync::Error>(())
//! ```

#![deny(rustdoc::broken_intra_doc_links)]
#![warn(missing_docs)]

pub mod channel;
pub mod error;
pub mod queue;
pub mod sync;

pub use channel::{ReceiveChannel, SendChannel, channel};
pub use error::{Error, Result};
pub use queue::{BoundedQueue, UnboundedQueue};
pub use sync::{
    ExclusiveSemaphore, GuardedValue, Monitor, MonitorGuard, Semaphore, SemaphorePermit,
    SharedSemaphore,
};
