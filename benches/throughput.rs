//! Publish throughput benchmarks for single- and multi-producer configurations.
//!
//! Run with: `cargo bench --bench throughput`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ringex::{Publisher, RingConfig, RingStorage, Sequence, Sequencer};
use std::sync::Arc;

fn single_producer_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_producer_publish");
    for capacity in [1 << 10, 1 << 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let config = RingConfig::new(capacity).unwrap();
                let storage = Arc::new(RingStorage::new(config.capacity(), || 0u64));
                let sequencer = Arc::new(Sequencer::new(&config));
                let publisher = Publisher::new(storage, sequencer);
                let consumed = Arc::new(Sequence::new());
                publisher
                    .add_gating_sequences(vec![consumed.clone()])
                    .unwrap();

                let mut i = 0u64;
                b.iter(|| {
                    let seq = publisher
                        .publish_event(|_s, slot: &mut u64| *slot = black_box(i))
                        .unwrap();
                    i += 1;
                    // keep the gating sequence close behind so the bench
                    // measures steady-state publish cost, not blocking.
                    if seq - consumed.get() > (capacity as i64) / 2 {
                        consumed.set(seq - (capacity as i64) / 4);
                    }
                });
            },
        );
    }
    group.finish();
}

fn single_producer_batch_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_producer_batch_publish");
    for batch_size in [1i64, 16, 128] {
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            &batch_size,
            |b, &batch_size| {
                let config = RingConfig::new(1 << 16).unwrap();
                let storage = Arc::new(RingStorage::new(config.capacity(), || 0u64));
                let sequencer = Arc::new(Sequencer::new(&config));
                let publisher = Publisher::new(storage, sequencer);
                let consumed = Arc::new(Sequence::new());
                publisher
                    .add_gating_sequences(vec![consumed.clone()])
                    .unwrap();

                b.iter(|| {
                    let high = publisher
                        .publish_events(batch_size, |s, slot: &mut u64| *slot = black_box(s as u64))
                        .unwrap();
                    if high - consumed.get() > (1i64 << 16) / 2 {
                        consumed.set(high - (1i64 << 16) / 4);
                    }
                });
            },
        );
    }
    group.finish();
}

fn multi_producer_contended_claim(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("multi_producer_contended_claim");
    for producer_count in [2usize, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(producer_count),
            &producer_count,
            |b, &producer_count| {
                let config = RingConfig::new(1 << 16)
                    .unwrap()
                    .with_producer_kind(ringex::ProducerKind::Multi);
                let storage = Arc::new(RingStorage::new(config.capacity(), || 0u64));
                let sequencer = Arc::new(Sequencer::new(&config));
                let publisher = Arc::new(Publisher::new(storage, sequencer));
                let consumed = Arc::new(Sequence::new());
                publisher
                    .add_gating_sequences(vec![consumed.clone()])
                    .unwrap();

                b.iter(|| {
                    thread::scope(|scope| {
                        for p in 0..producer_count {
                            let publisher = publisher.clone();
                            scope.spawn(move || {
                                for i in 0..64u64 {
                                    let _ = publisher.publish_event(|_s, slot: &mut u64| {
                                        *slot = black_box(p as u64 * 1000 + i)
                                    });
                                }
                            });
                        }
                    });
                    let cursor = publisher.sequencer().cursor();
                    consumed.set(cursor);
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    single_producer_publish,
    single_producer_batch_publish,
    multi_producer_contended_claim
);
criterion_main!(benches);
