//! Synchronization primitives, swapped for `loom`'s under `cfg(loom)`.
//!
//! Everything the ring and the wait path share between threads goes through
//! here, so the model checker sees every atomic access, fence and park.
//!
//! ```text
//! RUSTFLAGS="--cfg loom" cargo test -p spsc --release loom
//! ```

#[cfg(not(loom))]
pub(crate) use std::sync::atomic::{fence, AtomicBool, AtomicUsize, Ordering};
#[cfg(not(loom))]
pub(crate) use std::sync::Arc;

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{fence, AtomicBool, AtomicUsize, Ordering};
#[cfg(loom)]
pub(crate) use loom::sync::Arc;

use std::time::Duration;

/// Lock and condition variable a blocked side parks on.
pub(crate) struct Parker {
    #[cfg(not(loom))]
    lock: parking_lot::Mutex<()>,
    #[cfg(not(loom))]
    cond: parking_lot::Condvar,
    #[cfg(loom)]
    lock: loom::sync::Mutex<()>,
    #[cfg(loom)]
    cond: loom::sync::Condvar,
}

#[cfg(not(loom))]
impl Parker {
    pub(crate) fn new() -> Self {
        Self {
            lock: parking_lot::Mutex::new(()),
            cond: parking_lot::Condvar::new(),
        }
    }

    /// Parks for at most `slice` unless `ready()` holds under the lock.
    /// Returns whether it parked.
    pub(crate) fn park_unless(&self, ready: impl Fn() -> bool, slice: Duration) -> bool {
        let mut guard = self.lock.lock();
        if ready() {
            return false;
        }
        self.cond.wait_for(&mut guard, slice);
        true
    }

    pub(crate) fn unpark_all(&self) {
        let _guard = self.lock.lock();
        self.cond.notify_all();
    }
}

#[cfg(loom)]
impl Parker {
    pub(crate) fn new() -> Self {
        Self {
            lock: loom::sync::Mutex::new(()),
            cond: loom::sync::Condvar::new(),
        }
    }

    /// Parks until notified unless `ready()` holds under the lock. The slice
    /// is ignored: without a timeout a lost wakeup shows up as a deadlock.
    pub(crate) fn park_unless(&self, ready: impl Fn() -> bool, _slice: Duration) -> bool {
        let guard = self
            .lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if ready() {
            return false;
        }
        drop(self.cond.wait(guard));
        true
    }

    pub(crate) fn unpark_all(&self) {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.cond.notify_all();
    }
}
