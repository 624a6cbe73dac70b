//! # Instance Store Benchmark
//!
//! Measures record pushes with and without growth, and whole-generation event
//! application through the render bridge.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pipeworks_core::{World, WorldConfig};
use pipeworks_rendering::{
    HeapAllocator, InstanceStore, InstanceTransform, RecordingDrawer, RenderBridge,
    RenderBridgeConfig,
};

/// Benchmark alternating pushes from a tiny and a presized store.
fn bench_push(c: &mut Criterion) {
    const RECORDS: usize = 4096;
    let mut group = c.benchmark_group("store_push");
    group.throughput(Throughput::Elements(RECORDS as u64));

    for initial in [1usize, RECORDS] {
        group.bench_with_input(BenchmarkId::new("initial_capacity", initial), &initial, |b, &initial| {
            b.iter(|| {
                let mut store: InstanceStore<InstanceTransform, HeapAllocator> =
                    InstanceStore::new(HeapAllocator::new(), initial).unwrap();
                for i in 0..RECORDS {
                    let t = InstanceTransform::translation([i as f32, 0.0, 0.0]);
                    if i % 2 == 0 {
                        store.push_left(t).unwrap();
                    } else {
                        store.push_right(t).unwrap();
                    }
                }
                black_box(store.grow_count())
            });
        });
    }

    group.finish();
}

/// Benchmark applying and drawing one default generation.
fn bench_bridge(c: &mut Criterion) {
    let mut world = World::new(WorldConfig {
        seed: Some(42),
        ..WorldConfig::default()
    })
    .unwrap();
    let mut events = Vec::new();
    while !world.is_generation_complete() {
        world.tick(&mut events).unwrap();
    }

    c.bench_function("bridge_apply_generation", |b| {
        b.iter(|| {
            let mut bridge = RenderBridge::headless(RenderBridgeConfig::default()).unwrap();
            bridge.apply_all(&events).unwrap();
            black_box(bridge.stats().events_applied)
        });
    });

    let mut bridge = RenderBridge::headless(RenderBridgeConfig::default()).unwrap();
    bridge.apply_all(&events).unwrap();
    c.bench_function("bridge_draw_generation", |b| {
        let mut drawer = RecordingDrawer::new();
        b.iter(|| {
            drawer.clear();
            black_box(bridge.draw(&mut drawer, world.colors()))
        });
    });
}

criterion_group!(benches, bench_push, bench_bridge);
criterion_main!(benches);
