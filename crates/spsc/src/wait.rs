//! Waiting for space or data.
//!
//! A blocked side first retries under `crossbeam::utils::Backoff` (spin, then
//! yield), and once the backoff is exhausted parks on a condition variable in
//! slices of [`WaitConfig::park_interval`]. The opposite side only touches the
//! lock when somebody is registered as parked, so the non-blocking paths stay
//! lock-free.
//!
//! Deadlines and cancel tokens are checked between attempts; a parked waiter
//! observes them within one park interval.

use std::fmt;
use std::time::Instant;

use crossbeam::utils::Backoff;
use tracing::trace;

use crate::config::WaitConfig;
use crate::sync::{fence, Arc, AtomicBool, AtomicUsize, Ordering, Parker};

/// Cooperative cancellation for blocking pushes and pops.
///
/// Clones share one flag; cancelling any clone cancels them all.
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Outcome of one attempt made by a blocked operation.
pub(crate) enum Poll<R> {
    Ready(R),
    Pending,
    /// The other side is gone; waiting cannot succeed.
    Closed,
}

/// Why a blocked operation stopped without succeeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stop {
    Timeout,
    Cancelled,
    Disconnected,
}

/// Wake-up channel for one direction (data available, or space available).
pub(crate) struct Signal {
    parked: AtomicUsize,
    parker: Parker,
}

impl Default for Signal {
    fn default() -> Self {
        Self {
            parked: AtomicUsize::new(0),
            parker: Parker::new(),
        }
    }
}

impl Signal {
    /// Wakes parked waiters, if any. Called after publishing an index.
    ///
    /// Costs one `SeqCst` fence on every call, on top of the acquire/release
    /// pair that publishes the index. The lock is only taken when a waiter is
    /// registered.
    #[inline]
    pub(crate) fn notify(&self) {
        // Orders the caller's index store before the `parked` load; pairs
        // with the fence taken before parking in `block_on`. Without it a
        // waiter can register and re-check the index while both stores are
        // still buffered, and each side misses the other.
        fence(Ordering::SeqCst);
        if self.parked.load(Ordering::Relaxed) != 0 {
            self.parker.unpark_all();
        }
    }
}

/// Retries `poll` until it is ready, the other side closes, the deadline
/// passes or `cancel` fires.
///
/// `ready` is a side-effect-free check that `poll` would make progress. It
/// runs under the signal's lock right before parking, so it must not notify
/// anything itself.
pub(crate) fn block_on<R>(
    signal: &Signal,
    config: &WaitConfig,
    deadline: Option<Instant>,
    cancel: Option<&CancelToken>,
    mut poll: impl FnMut() -> Poll<R>,
    ready: impl Fn() -> bool,
) -> Result<R, Stop> {
    let backoff = Backoff::new();
    loop {
        match poll() {
            Poll::Ready(r) => return Ok(r),
            Poll::Closed => return Err(Stop::Disconnected),
            Poll::Pending => {}
        }
        if cancel.map_or(false, CancelToken::is_cancelled) {
            return Err(Stop::Cancelled);
        }
        let now = Instant::now();
        if deadline.map_or(false, |d| now >= d) {
            return Err(Stop::Timeout);
        }

        // Under loom every retry is a scheduling point, so go straight to
        // parking.
        if !cfg!(loom) && !backoff.is_completed() {
            backoff.snooze();
            continue;
        }

        let slice = match deadline {
            Some(d) => d.saturating_duration_since(now).min(config.park_interval()),
            None => config.park_interval(),
        };

        signal.parked.fetch_add(1, Ordering::SeqCst);
        fence(Ordering::SeqCst);
        // A notify issued before we registered is not lost: the state it
        // published is visible to `ready` here.
        if signal.parker.park_unless(&ready, slice) {
            trace!(?slice, "parked");
        }
        signal.parked.fetch_sub(1, Ordering::SeqCst);
    }
}
