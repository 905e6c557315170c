//! # Monitor.
//!
//! A monitor pairs a resource with the mutex that governs it, so that
//! **only one thread at a time** can touch the resource. Unlike a
//! [`GuardedValue`], a [`Monitor`] has no condition variable of its own: it
//! provides mutual exclusion and nothing else.
//!
//! The resource is never handed out directly. Instead, [`Monitor::apply`] runs
//! a closure on it while the lock is held and releases the lock afterwards,
//! on every exit path. If the closure panics, the lock is released while
//! unwinding and the monitor stays usable.
//!
//! ```rust
//! use guardsync::Monitor;
//! use std::collections::VecDeque;
//!
//! let queue = Monitor::new(VecDeque::new());
//! queue.apply(|q| q.push_back(1));
//! assert_eq!(queue.apply(|q| q.pop_front()), Some(1));
//! ```
//!
//! ## Waiting inside a monitor
//!
//! Some callers need to wait for a state change before acting on the
//! resource, with a condition variable they manage themselves.
//! [`Monitor::apply_after`] first runs a *wait step* that receives the lock
//! guard, so it can block on an external [`Condvar`] (which releases and
//! reacquires the lock), then runs the action with the lock still held:
//!
//! ```rust
//! use guardsync::Monitor;
//! use parking_lot::Condvar;
//!
//! let jobs = Monitor::new(vec![1, 2]);
//! let not_empty = Condvar::new();
//! let job = jobs.apply_after(
//!     |guard| not_empty.wait_while(guard, |jobs| jobs.is_empty()),
//!     |jobs| jobs.pop(),
//! );
//! assert_eq!(job, Some(2));
//! ```
//!
//! [`GuardedValue`]: crate::sync::GuardedValue
//! [`Condvar`]: parking_lot::Condvar

use core::fmt;
use parking_lot::{Mutex, MutexGuard};

/// An RAII scoped lock of a [`Monitor`].
///
/// The resource is accessible through the guard via `Deref`/`DerefMut`, and
/// the lock is released when the guard is dropped. This is the guard type a
/// wait step of [`Monitor::apply_after`] receives, so it can be passed to
/// [`parking_lot::Condvar::wait`].
pub type MonitorGuard<'a, T> = MutexGuard<'a, T>;

/// A resource protected by a mutex.
///
/// A monitor can be moved to a new owner, but not cloned.
#[derive(Default)]
pub struct Monitor<T> {
    resource: Mutex<T>,
}

impl<T> Monitor<T> {
    /// Creates a new monitor around `resource`, in an unlocked state.
    #[inline]
    pub const fn new(resource: T) -> Self {
        Self {
            resource: Mutex::new(resource),
        }
    }

    /// Runs `f` on the resource while holding the lock and returns its
    /// result.
    pub fn apply<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut *self.resource.lock())
    }

    /// Acquires the lock, runs `wait_step`, then runs `f` on the resource and
    /// returns its result.
    ///
    /// `wait_step` may block, typically by waiting on a condition variable
    /// with the provided guard. The lock is held when `f` runs.
    pub fn apply_after<R>(
        &self,
        wait_step: impl FnOnce(&mut MonitorGuard<'_, T>),
        f: impl FnOnce(&mut T) -> R,
    ) -> R {
        let mut guard = self.resource.lock();
        wait_step(&mut guard);
        f(&mut *guard)
    }

    /// Acquires the lock and returns a scoped guard.
    ///
    /// The exact behavior on locking a monitor in the thread which already
    /// holds the lock is left unspecified; it deadlocks with the current
    /// implementation.
    pub fn lock(&self) -> MonitorGuard<'_, T> {
        self.resource.lock()
    }

    /// Returns a mutable reference to the resource.
    pub fn get_mut(&mut self) -> &mut T {
        self.resource.get_mut()
    }

    /// Consumes this monitor, returning the underlying resource.
    pub fn into_inner(self) -> T {
        self.resource.into_inner()
    }
}

impl<T> From<T> for Monitor<T> {
    fn from(resource: T) -> Self {
        Self::new(resource)
    }
}

impl<T: fmt::Debug> fmt::Debug for Monitor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Monitor");
        match self.resource.try_lock() {
            Some(guard) => d.field("resource", &&*guard),
            None => d.field("resource", &format_args!("<locked>")),
        };
        d.finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use parking_lot::Condvar;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn apply_returns_closure_result() {
        init_test_logging();
        let m = Monitor::new(String::from("ab"));
        m.apply(|s| s.push('c'));
        assert_eq!(m.apply(|s| s.len()), 3);
        assert_eq!(m.into_inner(), "abc");
    }

    #[test]
    fn lock_is_released_after_panic() {
        init_test_logging();
        let m = Monitor::new(0);
        let r = catch_unwind(AssertUnwindSafe(|| {
            m.apply(|v| {
                *v = 1;
                panic!("inside monitor");
            })
        }));
        assert!(r.is_err());
        // A second lock would deadlock if the guard had leaked.
        assert_eq!(m.apply(|v| *v), 1);
    }

    #[test]
    fn monitor_serializes_writers() {
        init_test_logging();
        const THREADS: usize = 8;
        const ROUNDS: usize = 1000;
        let m = Arc::new(Monitor::new(Vec::new()));

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let m = m.clone();
                thread::spawn(move || {
                    for i in 0..ROUNDS {
                        m.apply(|v| v.push(t * ROUNDS + i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut all = m.apply(std::mem::take);
        all.sort_unstable();
        assert_eq!(all, (0..THREADS * ROUNDS).collect::<Vec<_>>());
    }

    #[test]
    fn apply_after_waits_on_external_condvar() {
        init_test_logging();
        let m = Arc::new(Monitor::new(None::<u32>));
        let filled = Arc::new(Condvar::new());

        let consumer = {
            let (m, filled) = (m.clone(), filled.clone());
            thread::spawn(move || {
                m.apply_after(
                    |guard| filled.wait_while(guard, |slot| slot.is_none()),
                    |slot| slot.take(),
                )
            })
        };

        thread::sleep(Duration::from_millis(20));
        m.apply(|slot| *slot = Some(42));
        filled.notify_one();

        assert_eq!(consumer.join().unwrap(), Some(42));
        assert_eq!(m.apply(|slot| *slot), None);
    }

    #[test]
    fn monitor_can_be_moved_to_another_thread() {
        init_test_logging();
        let m = Monitor::from(vec![1]);
        let m = thread::spawn(move || {
            m.apply(|v| v.push(2));
            m
        })
        .join()
        .unwrap();
        assert_eq!(m.lock().as_slice(), &[1, 2]);
    }

    #[test]
    fn debug_shows_resource_or_lock_state() {
        let m = Monitor::new("idle");
        assert_eq!(format!("{m:?}"), "Monitor { resource: \"idle\", .. }");
        let guard = m.lock();
        assert_eq!(format!("{m:?}"), "Monitor { resource: <locked>, .. }");
        drop(guard);
    }
}
