//! # Producer/Consumer Queues.
//!
//! Both queues store their items in a [`VecDeque`] inside a [`Monitor`], so
//! every access to the container is mutually exclusive and items inserted by
//! one producer come out in insertion order. They differ in what happens at
//! the edges:
//!
//! |                  | [`UnboundedQueue`]          | [`BoundedQueue`]                     |
//! |------------------|-----------------------------|--------------------------------------|
//! | Capacity         | None                        | Fixed at construction, at least 1    |
//! | `push` when full | Never full                  | Blocks until a slot is freed         |
//! | `pop` when empty | Returns `None` immediately  | Blocks until an item is pushed       |
//! | Non-blocking pop | `pop`                       | `try_pop`                            |
//!
//! [`VecDeque`]: std::collections::VecDeque
//! [`Monitor`]: crate::sync::Monitor

pub mod bounded;
pub mod unbounded;

pub use bounded::BoundedQueue;
pub use unbounded::UnboundedQueue;
