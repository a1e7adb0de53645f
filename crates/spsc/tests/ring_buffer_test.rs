//! Tests for the SPSC ring buffer.
//!
//! # Test Strategy
//!
//! 1. **Sequential behavior**: FIFO order, capacity boundary, the size-4 walk
//! 2. **Model check**: random push/pop/front/pop_front against a `VecDeque`
//! 3. **Concurrency**: cross-thread stress with every blocking variant
//! 4. **Waiting**: timeouts, cancellation, disconnection
//!
//! The `cfg(loom)` build runs the model-checked tests in `src/ring.rs` instead.

#![cfg(not(loom))]

use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use spsc::{channel, channel_with_config, BufferConfig, CancelToken, PopError, PushError};

// ============================================================================
// Sequential Behavior
// ============================================================================

#[test]
fn test_fifo_order() {
    let (mut tx, mut rx) = channel(16).unwrap();
    for i in 0..15 {
        tx.push(i).unwrap();
    }
    let drained: Vec<i32> = rx.drain().collect();
    assert_eq!(drained, (0..15).collect::<Vec<_>>());
}

#[test]
fn test_capacity_boundary() {
    for size in [2usize, 3, 4, 7, 8, 100] {
        let (mut tx, mut rx) = channel(size).unwrap();
        assert_eq!(tx.capacity(), size - 1);
        assert_eq!(rx.capacity(), size - 1);

        for i in 0..size - 1 {
            assert!(tx.push(i).is_ok(), "size {} rejected push {}", size, i);
        }
        assert!(tx.is_full());
        assert_eq!(tx.push(usize::MAX), Err(usize::MAX));

        assert_eq!(rx.pop(), Some(0));
        assert!(tx.push(usize::MAX).is_ok());
        assert_eq!(rx.len(), size - 1);
    }
}

#[test]
fn test_size_four_walkthrough() {
    let (mut tx, mut rx) = channel(4).unwrap();
    let pushes: Vec<bool> = (1..=4).map(|i| tx.push(i).is_ok()).collect();
    assert_eq!(pushes, vec![true, true, true, false]);

    assert_eq!(rx.pop(), Some(1));
    assert!(tx.push(4).is_ok());
    assert_eq!(rx.pop(), Some(2));
    assert_eq!(rx.pop(), Some(3));
    assert_eq!(rx.pop(), Some(4));
    assert_eq!(rx.pop(), None);
}

#[test]
fn test_channel_from_config() {
    let config: BufferConfig =
        serde_json::from_str(r#"{ "size": 3, "wait": { "park_interval_micros": 100 } }"#).unwrap();
    let (mut tx, mut rx) = channel_with_config(&config).unwrap();
    assert_eq!(tx.capacity(), 2);
    tx.push("x").unwrap();
    assert_eq!(rx.pop(), Some("x"));

    let bad: BufferConfig = serde_json::from_str(r#"{ "size": 1 }"#).unwrap();
    assert!(channel_with_config::<u8>(&bad).is_err());
}

// ============================================================================
// Model Check
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Push(u32),
    Pop,
    Front,
    PopFront,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u32>().prop_map(Op::Push),
        2 => Just(Op::Pop),
        1 => Just(Op::Front),
        1 => Just(Op::PopFront),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_matches_vecdeque_model(
        size in 2usize..12,
        ops in prop::collection::vec(op(), 0..200),
    ) {
        let (mut tx, mut rx) = channel(size).unwrap();
        let mut model: VecDeque<u32> = VecDeque::new();

        for op in ops {
            match op {
                Op::Push(v) => {
                    let accepted = tx.push(v).is_ok();
                    prop_assert_eq!(accepted, model.len() < size - 1);
                    if accepted {
                        model.push_back(v);
                    }
                }
                Op::Pop => prop_assert_eq!(rx.pop(), model.pop_front()),
                Op::Front => prop_assert_eq!(rx.front(), model.front()),
                Op::PopFront => {
                    prop_assert_eq!(rx.pop_front().is_ok(), model.pop_front().is_some());
                }
            }
            prop_assert_eq!(rx.len(), model.len());
            prop_assert_eq!(tx.len(), model.len());
        }
    }
}

// ============================================================================
// Concurrency
// ============================================================================

const STRESS_ITEMS: u64 = 500_000;

#[test]
fn test_concurrent_stress_blocking() {
    // Size 2 hands over every single item, so it gets a shorter run.
    for &(size, items) in &[(2usize, 100_000u64), (7, STRESS_ITEMS), (1024, STRESS_ITEMS)] {
        let (mut tx, mut rx) = channel::<u64>(size).unwrap();

        let producer = thread::spawn(move || {
            for i in 0..items {
                tx.block_push(i).unwrap();
            }
        });

        let mut expected = 0u64;
        loop {
            match rx.block_pop() {
                Ok(v) => {
                    assert_eq!(v, expected, "out of order at size {}", size);
                    expected += 1;
                }
                Err(PopError::Disconnected) => break,
                Err(e) => panic!("unexpected {:?}", e),
            }
        }

        producer.join().unwrap();
        assert_eq!(expected, items);
    }
}

#[test]
fn test_concurrent_stress_mixed_variants() {
    let (mut tx, mut rx) = channel::<u64>(64).unwrap();
    let token = CancelToken::new();

    let producer = thread::spawn(move || {
        for i in 0..STRESS_ITEMS {
            let mut value = i;
            loop {
                let result = match i % 3 {
                    0 => tx.push(value).map_err(PushError::Timeout),
                    1 => tx.push_timeout(value, Duration::from_micros(50)),
                    _ => tx.block_push(value),
                };
                match result {
                    Ok(()) => break,
                    Err(e) => value = e.into_inner(),
                }
            }
        }
    });

    let mut expected = 0u64;
    while expected < STRESS_ITEMS {
        let next = match expected % 4 {
            0 => rx.pop().ok_or(PopError::Timeout),
            1 => rx.pop_timeout(Duration::from_micros(50)),
            2 => rx.pop_cancellable(&token),
            _ => rx.block_pop(),
        };
        if let Ok(v) = next {
            assert_eq!(v, expected);
            expected += 1;
        }
    }

    producer.join().unwrap();
    assert_eq!(rx.pop(), None);
}

#[test]
fn test_concurrent_heap_values_are_not_lost_or_duplicated() {
    let (mut tx, mut rx) = channel::<String>(8).unwrap();

    let producer = thread::spawn(move || {
        for i in 0..50_000 {
            tx.block_push(format!("item-{}", i)).unwrap();
        }
    });

    let mut seen = 0;
    while let Ok(item) = rx.block_pop() {
        assert_eq!(item, format!("item-{}", seen));
        seen += 1;
    }
    producer.join().unwrap();
    assert_eq!(seen, 50_000);
}

// ============================================================================
// Waiting
// ============================================================================

#[test]
fn test_pop_timeout_on_empty() {
    let (_tx, mut rx) = channel::<u8>(4).unwrap();
    let started = Instant::now();
    assert_eq!(rx.pop_timeout(Duration::from_millis(30)), Err(PopError::Timeout));
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[test]
fn test_push_timeout_returns_value() {
    let (mut tx, _rx) = channel(2).unwrap();
    tx.push(1).unwrap();
    match tx.push_timeout(2, Duration::from_millis(10)) {
        Err(PushError::Timeout(v)) => assert_eq!(v, 2),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[test]
fn test_cancel_wakes_blocked_pop() {
    let (_tx, mut rx) = channel::<u8>(4).unwrap();
    let token = CancelToken::new();

    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            token.cancel();
        })
    };

    assert_eq!(rx.pop_cancellable(&token), Err(PopError::Cancelled));
    canceller.join().unwrap();
}

#[test]
fn test_cancel_wakes_blocked_push() {
    let (mut tx, _rx) = channel(2).unwrap();
    tx.push(0u8).unwrap();
    let token = CancelToken::new();
    token.cancel();
    assert!(matches!(
        tx.push_cancellable(1, &token),
        Err(PushError::Cancelled(1))
    ));
}

#[test]
fn test_consumer_drop_unblocks_producer() {
    let (mut tx, rx) = channel(2).unwrap();
    tx.push(0u32).unwrap();

    let dropper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        drop(rx);
    });

    assert!(matches!(tx.block_push(1), Err(PushError::Disconnected(1))));
    assert!(!tx.is_consumer_alive());
    dropper.join().unwrap();
}

#[test]
fn test_producer_drop_unblocks_consumer_after_drain() {
    let (mut tx, mut rx) = channel(4).unwrap();

    let producer = thread::spawn(move || {
        tx.push(1u32).unwrap();
        tx.push(2u32).unwrap();
        thread::sleep(Duration::from_millis(20));
    });

    assert_eq!(rx.block_pop(), Ok(1));
    assert_eq!(rx.block_pop(), Ok(2));
    assert_eq!(rx.block_pop(), Err(PopError::Disconnected));
    producer.join().unwrap();
}
