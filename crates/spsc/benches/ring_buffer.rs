use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spsc::channel;

const OPS_PER_ITER: u64 = 10_000;

/// Single-threaded push/pop pairs - the uncontended hot path.
fn bench_alternating(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");
    group.throughput(Throughput::Elements(OPS_PER_ITER));

    for &size in &[8usize, 64, 1024] {
        let (mut tx, mut rx) = channel::<u64>(size).unwrap();
        group.bench_with_input(BenchmarkId::new("alternating", size), &size, |b, _| {
            b.iter(|| {
                for i in 0..OPS_PER_ITER {
                    let _ = tx.push(black_box(i));
                    black_box(rx.pop());
                }
            })
        });
    }

    group.finish();
}

/// Fill to capacity, then drain.
fn bench_fill_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");

    for &size in &[16usize, 256, 4096] {
        let (mut tx, mut rx) = channel::<u64>(size).unwrap();
        group.throughput(Throughput::Elements((size - 1) as u64));
        group.bench_with_input(BenchmarkId::new("fill_drain", size), &size, |b, _| {
            b.iter(|| {
                let mut i = 0u64;
                while tx.push(black_box(i)).is_ok() {
                    i += 1;
                }
                while let Some(v) = rx.pop() {
                    black_box(v);
                }
            })
        });
    }

    group.finish();
}

/// Producer and consumer on separate threads, blocking variants.
fn bench_cross_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");
    group.throughput(Throughput::Elements(OPS_PER_ITER));
    group.sample_size(20);

    for &size in &[64usize, 1024] {
        group.bench_with_input(BenchmarkId::new("cross_thread", size), &size, |b, &size| {
            b.iter(|| {
                let (mut tx, mut rx) = channel::<u64>(size).unwrap();
                let consumer = thread::spawn(move || {
                    let mut sum = 0u64;
                    while let Ok(v) = rx.block_pop() {
                        sum = sum.wrapping_add(v);
                    }
                    sum
                });
                for i in 0..OPS_PER_ITER {
                    tx.block_push(i).unwrap();
                }
                drop(tx);
                black_box(consumer.join().unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_alternating, bench_fill_drain, bench_cross_thread);
criterion_main!(benches);
