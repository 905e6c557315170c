//! # Synchronization Primitives.
//!
//! Threads that share memory must coordinate every access to the shared
//! state. This module provides the building blocks used by the rest of the
//! crate to do so, layered so that each primitive is defined in terms of the
//! previous one:
//!
//! - [`GuardedValue`]: A value protected by a mutex and paired with a
//!   condition variable. Threads can block until a predicate over the value
//!   becomes true, and wake each other up after mutating it. The predicate is
//!   always re-checked under the lock after a wake-up, so spurious wake-ups
//!   are harmless.
//!
//! - [`Monitor`]: A resource protected by a mutex only. Every access runs a
//!   caller-supplied closure while the lock is held, and the lock is released
//!   on every exit path, including unwinding.
//!
//! - [`Semaphore`]: A counting semaphore implemented as a
//!   [`GuardedValue<usize>`](GuardedValue). `p` waits for a non-zero count and
//!   decrements it, `v` increments it and wakes one waiter.
//!
//! The semaphore can be owned directly, or through one of two handles that
//! only differ in ownership:
//!
//! - [`SharedSemaphore`] is reference counted; cloning it yields another
//!   handle to the same semaphore.
//! - [`ExclusiveSemaphore`] is uniquely owned; it can be moved but never
//!   duplicated.
//!
//! The table below summarizes the primitives:
//!
//! | Primitive              | Blocks Thread? | Fair? | Typical Use Case                           |
//! |------------------------|----------------|-------|--------------------------------------------|
//! | [`Monitor`]            | Lock only      | No    | Exclusive access to a container            |
//! | [`GuardedValue`]       | Yes            | No    | Waiting for a condition on a shared value  |
//! | [`Semaphore`]          | Yes            | No    | Counting a bounded resource, signaling     |
//!
//! ## Layering
//! 1. [`guarded`]
//! 2. [`monitor`]
//! 3. [`semaphore`]
//!
//! [`guarded`]: self::guarded
//! [`monitor`]: self::monitor
//! [`semaphore`]: self::semaphore

pub mod guarded;
pub mod monitor;
pub mod semaphore;

pub use guarded::*;
pub use monitor::*;
pub use semaphore::*;
