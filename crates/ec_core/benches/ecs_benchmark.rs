//! # Entity Lifecycle Benchmark
//!
//! Entity creation (with growth), component writes and compaction.
//!
//! Run with: `cargo bench --package ec_core --bench ecs_benchmark`

#![allow(missing_docs)]
#![allow(dead_code)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use ec_core::{registry, EntityId, Manager, ManagerConfig};

#[derive(Debug, Default, Clone, Copy)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Default, Clone, Copy)]
struct Velocity {
    x: f32,
    y: f32,
}

#[derive(Debug, Default, Clone, Copy)]
struct Marker(u64);

struct Frozen;

registry! {
    struct Game {
        components: [Position, Velocity, Marker],
        tags: [Frozen],
    }
}

const COUNTS: [usize; 3] = [1_000, 10_000, 100_000];

fn populated(count: usize) -> Manager<Game> {
    let mut manager = Manager::new();
    for i in 0..count {
        let id = manager.add_entity();
        manager.add_component(id, Marker(i as u64));
        manager.add_component(id, Position::default());
    }
    manager
}

/// Benchmark: add entities starting from the default capacity.
fn bench_add_entities(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_entities");

    for count in COUNTS {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut manager = Manager::<Game>::new();
                for _ in 0..count {
                    black_box(manager.add_entity());
                }
                manager.len()
            });
        });
    }

    group.finish();
}

/// Benchmark: add entities into pre-sized storage (no growth).
fn bench_add_entities_presized(c: &mut Criterion) {
    let count = 100_000;
    c.bench_function("add_entities_presized_100k", |b| {
        b.iter(|| {
            let mut manager = Manager::<Game>::with_config(ManagerConfig {
                initial_capacity: count,
                grow_amount: 256,
            })
            .unwrap_or_default();
            for _ in 0..count {
                black_box(manager.add_entity());
            }
            manager.len()
        });
    });
}

/// Benchmark: overwrite a component on every entity.
fn bench_add_component(c: &mut Criterion) {
    let count = 100_000;
    let mut manager = populated(count);

    c.bench_function("add_component_100k", |b| {
        b.iter(|| {
            for i in 0..count {
                manager.add_component(EntityId::new(i), Velocity { x: 1.0, y: 0.5 });
            }
        });
    });
}

/// Benchmark: cleanup after deleting every other entity.
fn bench_cleanup(c: &mut Criterion) {
    let mut group = c.benchmark_group("cleanup_half_dead");

    for count in COUNTS {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let mut manager = populated(count);
                    for i in (0..count).step_by(2) {
                        manager.delete_entity(EntityId::new(i));
                    }
                    manager
                },
                |mut manager| black_box(manager.cleanup()),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_add_entities,
    bench_add_entities_presized,
    bench_add_component,
    bench_cleanup,
);

criterion_main!(benches);
