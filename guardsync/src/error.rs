//! Errors reported by the constructors of this crate.
//!
//! Normal operation never fails: an empty queue is reported as [`None`] by the
//! non-blocking operations, and the blocking operations wait instead of
//! failing. The only error is an invalid configuration detected at
//! construction time.

/// Error type of this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A bounded queue or channel was requested with a capacity of zero.
    ///
    /// Such a queue could never accept an item, so every `push` would block
    /// forever.
    #[error("bounded queue capacity must be at least 1")]
    ZeroCapacity,
}

/// Result type of this crate.
pub type Result<T> = core::result::Result<T, Error>;
