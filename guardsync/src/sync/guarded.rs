//! # Guarded Value.
//!
//! A [`GuardedValue`] pairs a value with a mutex and a condition variable. It
//! allows a thread to efficiently block until the value reaches a certain
//! state, without consuming CPU cycles, and lets other threads wake it up
//! after they changed that state.
//!
//! Every operation takes a closure that runs while the mutex is held:
//!
//! ```rust
//! use guardsync::GuardedValue;
//!
//! let pending = GuardedValue::new(3usize);
//! pending.mutate_then_notify_all(|n| *n -= 1);
//! assert_eq!(pending.query(|n| *n), 2);
//! ```
//!
//! The waiting operations take a predicate instead of a plain condition
//! variable. [`GuardedValue::wait`] checks the predicate, blocks the current
//! thread while it is false, and re-checks it upon every wake-up. A single
//! wake-up therefore never implies that the predicate holds; spurious
//! wake-ups and notifications issued for unrelated changes simply put the
//! thread back to sleep.
//!
//! [`GuardedValue::wait_then_mutate`] combines the wait and the mutation under
//! one lock hold, so no other thread can invalidate the predicate between the
//! check and the act. This is the primitive the [`Semaphore`] is built on.
//!
//! ## Boolean flags
//!
//! A `GuardedValue<bool>` has a few extra operations with a fixed predicate
//! ([`GuardedValue::wait_true`], [`GuardedValue::set_true_notify_all`], ...)
//! for the common "wait until a flag is raised" case.
//!
//! [`Semaphore`]: crate::sync::Semaphore

use core::fmt;
use parking_lot::{Condvar, Mutex, MutexGuard};

/// A value protected by a mutex, with wait/notify support.
///
/// The value can only be accessed by closures passed to the methods of this
/// type, which guarantees that it is only ever accessed when the mutex is
/// locked.
///
/// Notifications are not buffered: [`notify_one`] and [`notify_all`] only wake
/// threads that are already blocked. Always mutate the value before
/// notifying, and always wait on a predicate over the value.
///
/// [`notify_one`]: GuardedValue::notify_one
/// [`notify_all`]: GuardedValue::notify_all
#[derive(Default)]
pub struct GuardedValue<T> {
    value: Mutex<T>,
    condvar: Condvar,
}

impl<T> GuardedValue<T> {
    /// Creates a new guarded value.
    #[inline]
    pub const fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
            condvar: Condvar::new(),
        }
    }

    /// Locks the mutex and blocks until `predicate` holds for the value.
    ///
    /// The predicate is re-evaluated under the lock after every wake-up.
    fn lock_when<P>(&self, mut predicate: P) -> MutexGuard<'_, T>
    where
        P: FnMut(&T) -> bool,
    {
        let mut guard = self.value.lock();
        while !predicate(&*guard) {
            self.condvar.wait(&mut guard);
        }
        guard
    }

    /// Runs `f` on a shared reference to the value and returns its result.
    ///
    /// This blocks only for as long as another thread holds the lock.
    pub fn query<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.value.lock())
    }

    /// Blocks the current thread until `predicate` returns `true`.
    ///
    /// The lock is released before returning, so the predicate may already
    /// be false again by the time the caller acts on it. Use
    /// [`wait_then_mutate`] when the action must happen while the predicate
    /// still holds.
    ///
    /// [`wait_then_mutate`]: GuardedValue::wait_then_mutate
    pub fn wait(&self, predicate: impl FnMut(&T) -> bool) {
        drop(self.lock_when(predicate));
    }

    /// Runs `f` on a mutable reference to the value and returns its result.
    ///
    /// No waiter is woken up; see [`mutate_then_notify_one`] and
    /// [`mutate_then_notify_all`].
    ///
    /// [`mutate_then_notify_one`]: GuardedValue::mutate_then_notify_one
    /// [`mutate_then_notify_all`]: GuardedValue::mutate_then_notify_all
    pub fn mutate<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut *self.value.lock())
    }

    /// Blocks until `predicate` returns `true`, then runs `f` on the value
    /// without releasing the lock in between.
    ///
    /// # Example
    /// ```rust
    /// use guardsync::GuardedValue;
    ///
    /// let tickets = GuardedValue::new(1u32);
    /// // Takes a ticket, blocking while none is left.
    /// tickets.wait_then_mutate(|t| *t > 0, |t| *t -= 1);
    /// assert_eq!(tickets.query(|t| *t), 0);
    /// ```
    pub fn wait_then_mutate<R>(
        &self,
        predicate: impl FnMut(&T) -> bool,
        f: impl FnOnce(&mut T) -> R,
    ) -> R {
        let mut guard = self.lock_when(predicate);
        f(&mut *guard)
    }

    /// Runs `f` on the value only if `predicate` currently holds.
    ///
    /// Returns `None` without calling `f` when the predicate is false. This
    /// function never waits on the condition variable.
    pub fn try_mutate_if<R>(
        &self,
        predicate: impl FnOnce(&T) -> bool,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        let mut guard = self.value.lock();
        if predicate(&*guard) {
            Some(f(&mut *guard))
        } else {
            None
        }
    }

    /// Mutates the value, then wakes up one blocked thread.
    pub fn mutate_then_notify_one<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let r = self.mutate(f);
        self.notify_one();
        r
    }

    /// Mutates the value, then wakes up all blocked threads.
    pub fn mutate_then_notify_all<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let r = self.mutate(f);
        self.notify_all();
        r
    }

    /// Wakes up one thread blocked on this value, if any.
    ///
    /// Can be called with or without the lock held by someone else.
    #[inline]
    pub fn notify_one(&self) {
        self.condvar.notify_one();
    }

    /// Wakes up all threads blocked on this value.
    #[inline]
    pub fn notify_all(&self) {
        self.condvar.notify_all();
    }

    /// Returns a mutable reference to the value.
    ///
    /// No locking is needed since the exclusive borrow guarantees that no
    /// other thread can access the value.
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    /// Consumes this guarded value, returning the underlying value.
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl GuardedValue<bool> {
    /// Returns the current state of the flag.
    pub fn is_set(&self) -> bool {
        self.query(|v| *v)
    }

    /// Blocks until the flag is `true`.
    pub fn wait_true(&self) {
        self.wait(|v| *v);
    }

    /// Blocks until the flag is `false`.
    pub fn wait_false(&self) {
        self.wait(|v| !*v);
    }

    /// Raises the flag without waking anyone up.
    pub fn set_true(&self) {
        self.mutate(|v| *v = true);
    }

    /// Raises the flag and wakes up one waiter.
    pub fn set_true_notify_one(&self) {
        self.mutate_then_notify_one(|v| *v = true);
    }

    /// Raises the flag and wakes up all waiters.
    pub fn set_true_notify_all(&self) {
        self.mutate_then_notify_all(|v| *v = true);
    }

    /// Lowers the flag without waking anyone up.
    pub fn set_false(&self) {
        self.mutate(|v| *v = false);
    }

    /// Lowers the flag and wakes up one waiter.
    pub fn set_false_notify_one(&self) {
        self.mutate_then_notify_one(|v| *v = false);
    }

    /// Lowers the flag and wakes up all waiters.
    pub fn set_false_notify_all(&self) {
        self.mutate_then_notify_all(|v| *v = false);
    }
}

impl<T> From<T> for GuardedValue<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for GuardedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("GuardedValue");
        match self.value.try_lock() {
            Some(guard) => d.field("value", &&*guard),
            None => d.field("value", &format_args!("<locked>")),
        };
        d.finish_non_exhaustive()
    }
}
