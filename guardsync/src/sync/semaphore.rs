//! # Semaphore.
//!
//! A **semaphore** is a fundamental synchronization primitive used to regulate
//! concurrent access to a finite set of resources. It maintains an internal
//! count representing the number of available "permits". Taking a permit
//! (`p`) blocks while the count is zero and decrements it; releasing a permit
//! (`v`) increments it and wakes up one blocked thread.
//!
//! Here the semaphore is nothing more than a [`GuardedValue<usize>`]: `p` is
//! `wait_then_mutate(count != 0, count -= 1)` and `v` is
//! `mutate_then_notify_one(count += 1)`. The count is a `usize`, so it can
//! never become negative.
//!
//! Semaphores are widely used to solve the **producer-consumer** problem: the
//! [`BoundedQueue`] keeps one semaphore counting free slots and one counting
//! filled slots. A semaphore initialized with zero permits can also serve as
//! an **event signal**, letting one thread notify another that something has
//! happened.
//!
//! Each operation has three names, after the classic literature:
//!
//! | Take a permit | Release a permit |
//! |---------------|------------------|
//! | [`p`]         | [`v`]            |
//! | [`wait`]      | [`signal`]       |
//! | [`enter`]     | [`exit`]         |
//!
//! Threads can also take a permit through the [`SemaphorePermit`] RAII guard
//! returned by [`Semaphore::acquire`], which releases it when dropped, even in
//! the presence of early returns or panics.
//!
//! No fairness is promised: when several threads are blocked in `p`, `v` lets
//! *some* waiter proceed.
//!
//! ## Handles
//!
//! A semaphore is often shared by the code that takes permits and the code
//! that releases them. Two handles cover the two ownership models:
//!
//! - [`SharedSemaphore`] is reference counted. Cloning the handle does not
//!   create a new semaphore; all clones operate on the same count.
//! - [`ExclusiveSemaphore`] is uniquely owned. It can be moved to a new owner
//!   but not duplicated.
//!
//! Both forward every operation to the underlying [`Semaphore`] unchanged.
//!
//! #### Usage Example
//!
//! ```rust
//! use guardsync::SharedSemaphore;
//! use std::thread;
//!
//! let done = SharedSemaphore::new(0);
//! let worker = {
//!     let done = done.clone();
//!     thread::spawn(move || {
//!         // ... work ...
//!         done.signal();
//!     })
//! };
//! done.wait(); // Blocks until the worker signals.
//! # worker.join().unwrap();
//! ```
//!
//! [`GuardedValue<usize>`]: crate::sync::GuardedValue
//! [`BoundedQueue`]: crate::queue::BoundedQueue
//! [`p`]: Semaphore::p
//! [`v`]: Semaphore::v
//! [`wait`]: Semaphore::wait
//! [`signal`]: Semaphore::signal
//! [`enter`]: Semaphore::enter
//! [`exit`]: Semaphore::exit

use super::guarded::GuardedValue;
use std::sync::Arc;

/// Counting semaphore.
///
/// A semaphore maintains a set of permits. Permits are used to synchronize
/// access to a shared resource. A semaphore differs from a mutex in that it
/// can allow more than one concurrent caller to proceed at a time.
#[derive(Debug, Default)]
pub struct Semaphore {
    count: GuardedValue<usize>,
}

impl Semaphore {
    /// Creates a new semaphore initialized with `permits` available permits.
    #[inline]
    pub const fn new(permits: usize) -> Self {
        Self {
            count: GuardedValue::new(permits),
        }
    }

    /// Takes a permit, blocking the current thread until one is available.
    pub fn p(&self) {
        if self.try_p() {
            return;
        }
        tracing::trace!("no permit available, waiting");
        self.count.wait_then_mutate(|count| *count != 0, |count| *count -= 1);
    }

    /// Alias of [`p`](Semaphore::p).
    #[inline]
    pub fn wait(&self) {
        self.p();
    }

    /// Alias of [`p`](Semaphore::p).
    #[inline]
    pub fn enter(&self) {
        self.p();
    }

    /// Releases a permit, waking up one blocked thread if any.
    pub fn v(&self) {
        self.count.mutate_then_notify_one(|count| *count += 1);
    }

    /// Alias of [`v`](Semaphore::v).
    #[inline]
    pub fn signal(&self) {
        self.v();
    }

    /// Alias of [`v`](Semaphore::v).
    #[inline]
    pub fn exit(&self) {
        self.v();
    }

    /// Takes a permit if one is available right now.
    ///
    /// Returns `false` without blocking when the count is zero.
    pub fn try_p(&self) -> bool {
        self.count
            .try_mutate_if(|count| *count != 0, |count| *count -= 1)
            .is_some()
    }

    /// Returns the number of permits available at the time of the call.
    pub fn available_permits(&self) -> usize {
        self.count.query(|count| *count)
    }

    /// Takes a permit and returns a guard that releases it when dropped.
    ///
    /// Blocks like [`p`](Semaphore::p).
    pub fn acquire(&self) -> SemaphorePermit<'_> {
        self.p();
        SemaphorePermit { sema: self }
    }
}

/// An RAII implementation of a "scoped permit". When this structure is
/// dropped (falls out of scope), the permit is released with
/// [`Semaphore::v`].
///
/// This structure is created by the [`acquire`] method on [`Semaphore`] and
/// its handles.
///
/// [`acquire`]: Semaphore::acquire
#[must_use = "if unused the permit is released immediately"]
#[derive(Debug)]
pub struct SemaphorePermit<'a> {
    sema: &'a Semaphore,
}

impl SemaphorePermit<'_> {
    /// Consumes the guard without releasing the permit.
    pub fn forget(self) {
        core::mem::forget(self);
    }
}

impl Drop for SemaphorePermit<'_> {
    fn drop(&mut self) {
        self.sema.v();
    }
}

macro_rules! forward_semaphore_ops {
    () => {
        /// Takes a permit, blocking until one is available.
        #[inline]
        pub fn p(&self) {
            self.0.p()
        }

        /// Alias of `p`.
        #[inline]
        pub fn wait(&self) {
            self.0.wait()
        }

        /// Alias of `p`.
        #[inline]
        pub fn enter(&self) {
            self.0.enter()
        }

        /// Releases a permit, waking up one blocked thread if any.
        #[inline]
        pub fn v(&self) {
            self.0.v()
        }

        /// Alias of `v`.
        #[inline]
        pub fn signal(&self) {
            self.0.signal()
        }

        /// Alias of `v`.
        #[inline]
        pub fn exit(&self) {
            self.0.exit()
        }

        /// Takes a permit if one is available right now.
        #[inline]
        pub fn try_p(&self) -> bool {
            self.0.try_p()
        }

        /// Returns the number of permits available at the time of the call.
        #[inline]
        pub fn available_permits(&self) -> usize {
            self.0.available_permits()
        }

        /// Takes a permit and returns a guard that releases it when dropped.
        #[inline]
        pub fn acquire(&self) -> SemaphorePermit<'_> {
            self.0.acquire()
        }
    };
}

/// A reference-counted handle to a [`Semaphore`].
///
/// Cloning the handle yields another handle to the *same* semaphore.
#[derive(Debug, Clone, Default)]
pub struct SharedSemaphore(Arc<Semaphore>);

impl SharedSemaphore {
    /// Creates a new semaphore with `permits` permits and a first handle to
    /// it.
    pub fn new(permits: usize) -> Self {
        Self(Arc::new(Semaphore::new(permits)))
    }

    /// Returns `true` if both handles refer to the same semaphore.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }

    forward_semaphore_ops!();
}

impl From<Semaphore> for SharedSemaphore {
    fn from(sema: Semaphore) -> Self {
        Self(Arc::new(sema))
    }
}

/// A uniquely-owned handle to a [`Semaphore`].
///
/// The handle can be moved, transferring ownership of the semaphore, but it
/// cannot be cloned.
#[derive(Debug, Default)]
pub struct ExclusiveSemaphore(Box<Semaphore>);

impl ExclusiveSemaphore {
    /// Creates a new semaphore with `permits` permits, owned by this handle.
    pub fn new(permits: usize) -> Self {
        Self(Box::new(Semaphore::new(permits)))
    }

    /// Consumes the handle, returning the semaphore.
    pub fn into_inner(self) -> Semaphore {
        *self.0
    }

    forward_semaphore_ops!();
}

impl From<Semaphore> for ExclusiveSemaphore {
    fn from(sema: Semaphore) -> Self {
        Self(Box::new(sema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use crossbeam_utils::Backoff;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn settle() {
        thread::sleep(Duration::from_millis(30));
    }

    fn spin_until(cond: impl Fn() -> bool) {
        let backoff = Backoff::new();
        while !cond() {
            backoff.snooze();
        }
    }

    #[test]
    fn zero_permits_blocks_until_signal() {
        init_test_logging();
        let sema = Arc::new(Semaphore::new(0));
        let woken = Arc::new(AtomicBool::new(false));

        let worker = {
            let (sema, woken) = (sema.clone(), woken.clone());
            thread::spawn(move || {
                sema.p();
                woken.store(true, Ordering::SeqCst);
            })
        };

        settle();
        assert!(!woken.load(Ordering::SeqCst));
        sema.v();
        worker.join().unwrap();
        assert!(woken.load(Ordering::SeqCst));
        assert_eq!(sema.available_permits(), 0);
    }

    #[test]
    fn each_signal_releases_exactly_one_waiter() {
        init_test_logging();
        const WAITERS: usize = 4;
        let sema = Arc::new(Semaphore::new(0));
        let passed = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..WAITERS)
            .map(|_| {
                let (sema, passed) = (sema.clone(), passed.clone());
                thread::spawn(move || {
                    sema.wait();
                    passed.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        settle();
        assert_eq!(passed.load(Ordering::SeqCst), 0);
        for expected in 1..=WAITERS {
            sema.signal();
            spin_until(|| passed.load(Ordering::SeqCst) >= expected);
            // Give a wrongly released second waiter time to show up.
            settle();
            assert_eq!(passed.load(Ordering::SeqCst), expected);
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sema.available_permits(), 0);
    }

    #[test]
    fn initial_permits_pass_without_blocking() {
        init_test_logging();
        let sema = Semaphore::new(3);
        sema.p();
        sema.enter();
        sema.wait();
        assert!(!sema.try_p());
        sema.exit();
        assert!(sema.try_p());
        assert_eq!(sema.available_permits(), 0);
    }

    #[test]
    fn permit_guard_releases_on_drop() {
        init_test_logging();
        let sema = Semaphore::new(1);
        {
            let _permit = sema.acquire();
            assert_eq!(sema.available_permits(), 0);
        }
        assert_eq!(sema.available_permits(), 1);

        sema.acquire().forget();
        assert_eq!(sema.available_permits(), 0);
    }

    #[test]
    fn permits_bound_concurrency() {
        init_test_logging();
        const PERMITS: usize = 3;
        const THREADS: usize = 12;
        let sema = SharedSemaphore::new(PERMITS);
        let inside = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let (sema, inside, peak) = (sema.clone(), inside.clone(), peak.clone());
                thread::spawn(move || {
                    for _ in 0..50 {
                        let _permit = sema.acquire();
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        thread::yield_now();
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= PERMITS);
        assert_eq!(sema.available_permits(), PERMITS);
    }

    #[test]
    fn shared_handles_refer_to_one_semaphore() {
        init_test_logging();
        let a = SharedSemaphore::new(0);
        let b = a.clone();
        let c = SharedSemaphore::new(0);
        assert!(SharedSemaphore::ptr_eq(&a, &b));
        assert!(!SharedSemaphore::ptr_eq(&a, &c));

        a.v();
        assert_eq!(b.available_permits(), 1);
        assert!(b.try_p());
        assert_eq!(a.available_permits(), 0);
        assert_eq!(c.available_permits(), 0);
    }

    #[test]
    fn exclusive_handle_moves_between_threads() {
        init_test_logging();
        let sema = ExclusiveSemaphore::new(0);
        let sema = thread::spawn(move || {
            sema.v();
            sema.v();
            sema
        })
        .join()
        .unwrap();
        sema.p();
        assert_eq!(sema.into_inner().available_permits(), 1);
    }
}
