//! Benchmarks for the admission gate's hot structures.
//!
//! Covers lane push/pop throughput, mixed-priority ordering, result-cache
//! lookups, and breaker transitions.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::time::{Duration, Instant};

use loadgate::core::{CircuitBreaker, LaneSet, ResultCache, Ticket};
use loadgate::util::serde::{new_ticket_id, Priority};

use rand::prelude::IndexedRandom;

fn build_ticket(priority: Priority) -> Ticket<String> {
    Ticket::new(new_ticket_id(), "payload".to_string(), priority)
}

fn bench_lane_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("lanes");

    for size in [100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::new("push_pop_single_lane", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    let mut lanes = LaneSet::new();
                    for _ in 0..size {
                        lanes.push(build_ticket(Priority::Normal));
                    }
                    while let Some(t) = lanes.pop_next() {
                        black_box(t);
                    }
                });
            },
        );
    }

    group.bench_function("push_pop_mixed_priorities", |b| {
        let mut rng = rand::rng();
        let classes = Priority::ALL;
        b.iter(|| {
            let mut lanes = LaneSet::new();
            for _ in 0..1_000 {
                let priority = *classes.choose(&mut rng).unwrap();
                lanes.push(build_ticket(priority));
            }
            while let Some(t) = lanes.pop_next() {
                black_box(t);
            }
        });
    });

    group.finish();
}

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache");

    group.bench_function("insert_1000", |b| {
        b.iter(|| {
            let mut cache = ResultCache::new();
            for i in 0..1_000 {
                cache.insert(format!("key-{i}"), i, Duration::from_secs(60));
            }
            black_box(cache.len());
        });
    });

    group.bench_function("fresh_lookup", |b| {
        let mut cache = ResultCache::new();
        for i in 0..1_000 {
            cache.insert(format!("key-{i}"), i, Duration::from_secs(60));
        }
        b.iter(|| {
            let now = Instant::now();
            for i in 0..1_000 {
                black_box(cache.get_fresh(&format!("key-{i}"), now));
            }
        });
    });

    group.finish();
}

fn bench_breaker(c: &mut Criterion) {
    c.bench_function("breaker_failure_trip_reset", |b| {
        b.iter(|| {
            let mut breaker = CircuitBreaker::new(5, Duration::from_millis(0));
            let now = Instant::now();
            for _ in 0..5 {
                black_box(breaker.on_failure(now));
            }
            breaker.reset();
            black_box(breaker.is_open());
        });
    });
}

criterion_group!(benches, bench_lane_push_pop, bench_cache, bench_breaker);
criterion_main!(benches);
