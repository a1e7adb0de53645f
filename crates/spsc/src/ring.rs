//! SPSC ring storage and the producer/consumer handles.
//!
//! # Design
//!
//! - `size` slots, one always kept empty so that `head == tail` means empty
//!   and `next(tail) == head` means full. Usable capacity is `size - 1`.
//! - Indices wrap by comparison against `size`, not by masking, so any size
//!   of at least two works. Powers of two are still a good choice.
//! - `head` (next slot to read) is written only by the consumer; `tail` (next
//!   slot to write) only by the producer. Each lives on its own cache line.
//! - Each side caches the other side's index and only reloads it when the
//!   ring looks full (producer) or empty (consumer).
//!
//! # Ordering
//!
//! ```text
//! Producer writes slot, then Release-stores tail  →  consumer Acquire-loads tail, then reads slot
//! Consumer reads slot, then Release-stores head   →  producer Acquire-loads head, then writes slot
//! ```
//!
//! # Safety
//!
//! Slots are `UnsafeCell<MaybeUninit<T>>`. Slots in the logical range
//! `[head, tail)` are initialized and owned by the consumer; all others are
//! uninitialized and owned by the producer. A slot changes owner only through
//! the release store of the index that moves past it.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::time::{Duration, Instant};

use crossbeam::utils::CachePadded;
use tracing::debug;

use crate::config::{BufferConfig, WaitConfig};
use crate::error::{Error, PopError, PushError, Result};
use crate::sync::{Arc, AtomicBool, AtomicUsize, Ordering};
use crate::wait::{block_on, CancelToken, Poll, Signal, Stop};

// ============================================================================
// Shared Ring Storage
// ============================================================================

struct Shared<T> {
    /// Consumer's read index.
    head: CachePadded<AtomicUsize>,
    /// Producer's write index.
    tail: CachePadded<AtomicUsize>,
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    producer_alive: AtomicBool,
    consumer_alive: AtomicBool,
    /// Signalled by the producer after publishing data.
    not_empty: Signal,
    /// Signalled by the consumer after freeing a slot.
    not_full: Signal,
    wait: WaitConfig,
}

// SAFETY: the producer and consumer only touch disjoint slots, and ownership
// of a slot moves between them through the release/acquire pairs on
// head/tail. Values cross threads, hence `T: Send`.
unsafe impl<T: Send> Send for Shared<T> {}
unsafe impl<T: Send> Sync for Shared<T> {}

impl<T> Shared<T> {
    #[inline]
    fn next(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.slots.len() {
            0
        } else {
            next
        }
    }

    #[inline]
    fn distance(&self, head: usize, tail: usize) -> usize {
        if tail >= head {
            tail - head
        } else {
            self.slots.len() - head + tail
        }
    }

    #[inline]
    fn slot(&self, index: usize) -> *mut MaybeUninit<T> {
        self.slots[index].get()
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        // Both handles are gone, so nothing races these loads.
        let mut index = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        while index != tail {
            // SAFETY: slots in [head, tail) are initialized, and both handles
            // are gone.
            unsafe { (*self.slots[index].get()).assume_init_drop() };
            index = self.next(index);
        }
    }
}

// ============================================================================
// Constructor
// ============================================================================

/// Creates a ring with `size` slots (`size - 1` usable) and default wait
/// settings, returning its two ends.
///
/// # Errors
/// [`Error::InvalidCapacity`] if `size < 2`.
///
/// # Example
///
/// ```
/// let (mut tx, mut rx) = spsc::channel(4).unwrap();
/// assert_eq!(tx.capacity(), 3);
/// tx.push("a").unwrap();
/// assert_eq!(rx.front(), Some(&"a"));
/// ```
pub fn channel<T>(size: usize) -> Result<(Producer<T>, Consumer<T>)> {
    channel_with_config(&BufferConfig::with_size(size))
}

/// Creates a ring from configuration.
pub fn channel_with_config<T>(config: &BufferConfig) -> Result<(Producer<T>, Consumer<T>)> {
    config.validate()?;

    let slots = (0..config.size)
        .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
        .collect::<Vec<_>>()
        .into_boxed_slice();

    let shared = Arc::new(Shared {
        head: CachePadded::new(AtomicUsize::new(0)),
        tail: CachePadded::new(AtomicUsize::new(0)),
        slots,
        producer_alive: AtomicBool::new(true),
        consumer_alive: AtomicBool::new(true),
        not_empty: Signal::default(),
        not_full: Signal::default(),
        wait: config.wait,
    });
    debug!(size = config.size, "created spsc ring buffer");

    let producer = Producer {
        shared: Arc::clone(&shared),
        tail: 0,
        cached_head: 0,
    };
    let consumer = Consumer {
        shared,
        head: 0,
        cached_tail: 0,
    };
    Ok((producer, consumer))
}

// ============================================================================
// Producer
// ============================================================================

/// Writing end of the ring. Exactly one exists per ring.
pub struct Producer<T> {
    shared: Arc<Shared<T>>,
    /// Local copy of `tail`; only this handle writes it.
    tail: usize,
    /// Snapshot of the consumer's `head`, refreshed when the ring looks full.
    cached_head: usize,
}

impl<T> Producer<T> {
    /// Pushes `value` if a slot is free, handing it back if the ring is full.
    /// Never blocks.
    ///
    /// # Ordering
    ///
    /// 1. If `next(tail)` equals the cached head, Acquire-load `head`.
    /// 2. Write the value into slot `tail`.
    /// 3. Release-store `next(tail)` to publish it.
    /// 4. Wake the consumer if it is parked.
    ///
    /// # Cost
    ///
    /// Step 4 is one `SeqCst` fence plus a relaxed load of the parked count,
    /// paid even when nobody waits. The wake-up lock is only taken when the
    /// consumer is actually parked.
    #[inline]
    pub fn push(&mut self, value: T) -> std::result::Result<(), T> {
        let tail = self.tail;
        let next = self.shared.next(tail);
        if next == self.cached_head {
            self.cached_head = self.shared.head.load(Ordering::Acquire);
            if next == self.cached_head {
                return Err(value);
            }
        }

        // SAFETY: slot `tail` is outside [head, tail), so the consumer will
        // not read it until the store below.
        unsafe { (*self.shared.slot(tail)).write(value) };
        self.tail = next;
        self.shared.tail.store(next, Ordering::Release);
        self.shared.not_empty.notify();
        Ok(())
    }

    /// Pushes `value`, waiting for space as long as it takes.
    ///
    /// Fails only with [`PushError::Disconnected`] once the consumer has been
    /// dropped.
    pub fn block_push(&mut self, value: T) -> std::result::Result<(), PushError<T>> {
        self.push_wait(value, None, None)
    }

    /// Pushes `value`, waiting for space at most `timeout`.
    pub fn push_timeout(
        &mut self,
        value: T,
        timeout: Duration,
    ) -> std::result::Result<(), PushError<T>> {
        self.push_wait(value, Instant::now().checked_add(timeout), None)
    }

    /// Pushes `value`, waiting for space until `token` is cancelled.
    pub fn push_cancellable(
        &mut self,
        value: T,
        token: &CancelToken,
    ) -> std::result::Result<(), PushError<T>> {
        self.push_wait(value, None, Some(token))
    }

    fn push_wait(
        &mut self,
        value: T,
        deadline: Option<Instant>,
        cancel: Option<&CancelToken>,
    ) -> std::result::Result<(), PushError<T>> {
        let shared = Arc::clone(&self.shared);
        let mut pending = Some(value);

        let outcome = block_on(
            &shared.not_full,
            &shared.wait,
            deadline,
            cancel,
            || {
                if !shared.consumer_alive.load(Ordering::Acquire) {
                    return Poll::Closed;
                }
                match pending.take() {
                    Some(value) => match self.push(value) {
                        Ok(()) => Poll::Ready(()),
                        Err(value) => {
                            pending = Some(value);
                            Poll::Pending
                        }
                    },
                    None => Poll::Ready(()),
                }
            },
            || {
                let tail = shared.tail.load(Ordering::Relaxed);
                shared.next(tail) != shared.head.load(Ordering::Acquire)
                    || !shared.consumer_alive.load(Ordering::Acquire)
            },
        );

        match (outcome, pending.take()) {
            (Ok(()), _) | (Err(_), None) => Ok(()),
            (Err(Stop::Timeout), Some(value)) => Err(PushError::Timeout(value)),
            (Err(Stop::Cancelled), Some(value)) => Err(PushError::Cancelled(value)),
            (Err(Stop::Disconnected), Some(value)) => Err(PushError::Disconnected(value)),
        }
    }

    /// Number of values waiting to be popped, as seen by the producer.
    pub fn len(&self) -> usize {
        self.shared
            .distance(self.shared.head.load(Ordering::Acquire), self.tail)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.shared.next(self.tail) == self.shared.head.load(Ordering::Acquire)
    }

    /// Usable capacity: one less than the slot count.
    pub fn capacity(&self) -> usize {
        self.shared.slots.len() - 1
    }

    pub fn is_consumer_alive(&self) -> bool {
        self.shared.consumer_alive.load(Ordering::Acquire)
    }
}

impl<T> Drop for Producer<T> {
    fn drop(&mut self) {
        self.shared.producer_alive.store(false, Ordering::Release);
        self.shared.not_empty.notify();
        debug!(pending = self.len(), "spsc producer dropped");
    }
}

// ============================================================================
// Consumer
// ============================================================================

/// Reading end of the ring. Exactly one exists per ring.
pub struct Consumer<T> {
    shared: Arc<Shared<T>>,
    /// Local copy of `head`; only this handle writes it.
    head: usize,
    /// Snapshot of the producer's `tail`, refreshed when the ring looks empty.
    cached_tail: usize,
}

impl<T> Consumer<T> {
    /// Pops the oldest value, or `None` if the ring is empty. Never blocks.
    ///
    /// # Ordering
    ///
    /// 1. If `head` equals the cached tail, Acquire-load `tail`.
    /// 2. Move the value out of slot `head`.
    /// 3. Release-store `next(head)` to hand the slot back.
    /// 4. Wake the producer if it is parked.
    ///
    /// # Cost
    ///
    /// As for [`Producer::push`], step 4 costs one `SeqCst` fence per call.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if !self.refresh() {
            return None;
        }
        // SAFETY: slot `head` is in [head, tail) and therefore initialized;
        // the producer will not touch it until head moves past it.
        let value = unsafe { (*self.shared.slot(self.head)).assume_init_read() };
        self.advance();
        Some(value)
    }

    /// Pops the oldest value, waiting for one as long as it takes.
    ///
    /// Fails only with [`PopError::Disconnected`] once the producer has been
    /// dropped and every value it pushed has been popped.
    pub fn block_pop(&mut self) -> std::result::Result<T, PopError> {
        self.pop_wait(None, None)
    }

    /// Pops the oldest value, waiting at most `timeout`.
    pub fn pop_timeout(&mut self, timeout: Duration) -> std::result::Result<T, PopError> {
        self.pop_wait(Instant::now().checked_add(timeout), None)
    }

    /// Pops the oldest value, waiting until `token` is cancelled.
    pub fn pop_cancellable(&mut self, token: &CancelToken) -> std::result::Result<T, PopError> {
        self.pop_wait(None, Some(token))
    }

    fn pop_wait(
        &mut self,
        deadline: Option<Instant>,
        cancel: Option<&CancelToken>,
    ) -> std::result::Result<T, PopError> {
        let shared = Arc::clone(&self.shared);

        block_on(
            &shared.not_empty,
            &shared.wait,
            deadline,
            cancel,
            || {
                if let Some(value) = self.pop() {
                    return Poll::Ready(value);
                }
                if shared.producer_alive.load(Ordering::Acquire) {
                    return Poll::Pending;
                }
                // The producer's last push happens before it marks itself
                // dead, so one more look drains it.
                match self.pop() {
                    Some(value) => Poll::Ready(value),
                    None => Poll::Closed,
                }
            },
            || {
                shared.head.load(Ordering::Relaxed) != shared.tail.load(Ordering::Acquire)
                    || !shared.producer_alive.load(Ordering::Acquire)
            },
        )
        .map_err(|stop| match stop {
            Stop::Timeout => PopError::Timeout,
            Stop::Cancelled => PopError::Cancelled,
            Stop::Disconnected => PopError::Disconnected,
        })
    }

    /// The oldest value, left in place, or `None` if the ring is empty.
    pub fn front(&self) -> Option<&T> {
        if self.head == self.shared.tail.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: slot `head` is initialized and stays so while `&self` is
        // borrowed, since only `&mut self` methods advance head.
        Some(unsafe { (*self.shared.slot(self.head)).assume_init_ref() })
    }

    /// Mutable access to the oldest value for in-place processing.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        if !self.refresh() {
            return None;
        }
        // SAFETY: as in `front`, with exclusive access through `&mut self`.
        Some(unsafe { (*self.shared.slot(self.head)).assume_init_mut() })
    }

    /// Drops the oldest value in place.
    ///
    /// # Errors
    /// [`Error::PreconditionViolation`] if the ring is empty.
    pub fn pop_front(&mut self) -> Result<()> {
        if !self.refresh() {
            return Err(Error::PreconditionViolation("pop_front on an empty ring buffer"));
        }
        // SAFETY: slot `head` is initialized; it is dropped exactly once
        // before head moves past it.
        unsafe { (*self.shared.slot(self.head)).assume_init_drop() };
        self.advance();
        Ok(())
    }

    /// Pops values until the ring is empty.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(move || self.pop())
    }

    /// Number of values waiting to be popped, as seen by the consumer.
    pub fn len(&self) -> usize {
        self.shared
            .distance(self.head, self.shared.tail.load(Ordering::Acquire))
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.shared.tail.load(Ordering::Acquire)
    }

    /// Usable capacity: one less than the slot count.
    pub fn capacity(&self) -> usize {
        self.shared.slots.len() - 1
    }

    pub fn is_producer_alive(&self) -> bool {
        self.shared.producer_alive.load(Ordering::Acquire)
    }

    /// True if slot `head` holds a value, reloading the producer's tail only
    /// when the cached one says empty.
    #[inline]
    fn refresh(&mut self) -> bool {
        if self.head == self.cached_tail {
            self.cached_tail = self.shared.tail.load(Ordering::Acquire);
        }
        self.head != self.cached_tail
    }

    #[inline]
    fn advance(&mut self) {
        self.head = self.shared.next(self.head);
        self.shared.head.store(self.head, Ordering::Release);
        self.shared.not_full.notify();
    }
}

impl<T> Drop for Consumer<T> {
    fn drop(&mut self) {
        self.shared.consumer_alive.store(false, Ordering::Release);
        self.shared.not_full.notify();
        debug!(pending = self.len(), "spsc consumer dropped");
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn test_size_below_two_rejected() {
        assert_eq!(channel::<u8>(0).err(), Some(Error::InvalidCapacity(0)));
        assert_eq!(channel::<u8>(1).err(), Some(Error::InvalidCapacity(1)));
        assert!(channel::<u8>(2).is_ok());
    }

    #[test]
    fn test_concrete_sequence_size_four() {
        let (mut tx, mut rx) = channel(4).unwrap();
        assert!(tx.push(1).is_ok());
        assert!(tx.push(2).is_ok());
        assert!(tx.push(3).is_ok());
        assert_eq!(tx.push(4), Err(4));
        assert_eq!(rx.pop(), Some(1));
        assert!(tx.push(4).is_ok());
        assert_eq!(rx.pop(), Some(2));
        assert_eq!(rx.pop(), Some(3));
        assert_eq!(rx.pop(), Some(4));
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn test_non_power_of_two_size_wraps() {
        let (mut tx, mut rx) = channel(5).unwrap();
        for round in 0..10u32 {
            for i in 0..4 {
                assert!(tx.push(round * 4 + i).is_ok());
            }
            assert!(tx.is_full());
            for i in 0..4 {
                assert_eq!(rx.pop(), Some(round * 4 + i));
            }
            assert!(rx.is_empty());
        }
    }

    #[test]
    fn test_len_from_both_sides() {
        let (mut tx, mut rx) = channel(3).unwrap();
        assert_eq!((tx.len(), rx.len()), (0, 0));
        tx.push('a').unwrap();
        tx.push('b').unwrap();
        assert_eq!((tx.len(), rx.len()), (2, 2));
        rx.pop();
        tx.push('c').unwrap();
        assert_eq!((tx.len(), rx.len()), (2, 2));
    }

    #[test]
    fn test_front_and_pop_front() {
        let (mut tx, mut rx) = channel(4).unwrap();
        assert!(rx.front().is_none());
        assert_eq!(
            rx.pop_front(),
            Err(Error::PreconditionViolation("pop_front on an empty ring buffer"))
        );

        tx.push(vec![1, 2]).unwrap();
        tx.push(vec![3]).unwrap();
        rx.front_mut().unwrap().push(9);
        assert_eq!(rx.front(), Some(&vec![1, 2, 9]));
        assert_eq!(rx.pop_front(), Ok(()));
        assert_eq!(rx.pop(), Some(vec![3]));
    }

    #[test]
    fn test_drop_remaining_items() {
        let drop_count = Arc::new(AtomicUsize::new(0));

        struct DropTracker(Arc<AtomicUsize>);
        impl Drop for DropTracker {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }

        {
            let (mut tx, mut rx) = channel(8).unwrap();
            for _ in 0..5 {
                assert!(tx.push(DropTracker(drop_count.clone())).is_ok());
            }
            drop(rx.pop());
            assert_eq!(rx.pop_front(), Ok(()));
            assert_eq!(drop_count.load(Ordering::Relaxed), 2);
        }

        assert_eq!(drop_count.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_disconnect_is_reported_after_drain() {
        let (mut tx, mut rx) = channel(4).unwrap();
        tx.push(1).unwrap();
        drop(tx);

        assert!(!rx.is_producer_alive());
        assert_eq!(rx.block_pop(), Ok(1));
        assert_eq!(rx.block_pop(), Err(PopError::Disconnected));

        let (mut tx, rx) = channel::<u8>(2).unwrap();
        drop(rx);
        assert_eq!(tx.block_push(1).unwrap_err().into_inner(), 1);
    }

    #[test]
    fn test_blocked_consumer_wakes_on_push() {
        let (mut tx, mut rx) = channel(4).unwrap();
        let consumer = thread::spawn(move || rx.block_pop());
        thread::sleep(Duration::from_millis(20));
        tx.push(42u64).unwrap();
        assert_eq!(consumer.join().unwrap(), Ok(42));
    }
}

// ============================================================================
// Loom Tests
// ============================================================================
