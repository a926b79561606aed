//! Criterion benchmarks for the Factorish simulation.
//!
//! Benchmark groups:
//! - `smelting`: 32 parallel mine -> furnace -> chest lines on a 32×32 map
//! - `belt_heavy`: a 64×64 map of belts carrying ~1000 items
//! - `serialization`: JSON and binary save/load of the smelting world

use criterion::{Criterion, criterion_group, criterion_main};
use factorish_core::grid::Rotation;
use factorish_core::id::ItemType;
use factorish_core::test_utils::*;
use factorish_core::world::World;

// ===========================================================================
// World builders
// ===========================================================================

/// One smelting line per row, warmed up until every line is producing.
fn build_smelting_world() -> World {
    let mut world = World::new(32);
    for y in 0..32 {
        smelting_line(&mut world, y, 1000);
    }
    run(&mut world, 200);
    world
}

/// Serpentine rows of belts: even rows run east, odd rows west, every
/// tile seeded with an item.
fn build_belt_world() -> World {
    let mut world = World::new(64);
    for y in 0..64 {
        let rotation = if y % 2 == 0 { Rotation::Right } else { Rotation::Left };
        let start = if y % 2 == 0 { 0 } else { 63 };
        belt_line(&mut world, start, y, 64, rotation);
    }
    for y in 0..64 {
        for x in (0..64).step_by(4) {
            world.drop_item(pos(x, y), ItemType::IronOre);
        }
    }
    world
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_smelting(c: &mut Criterion) {
    let mut group = c.benchmark_group("smelting");
    group.sample_size(30);

    let mut world = build_smelting_world();
    group.bench_function("32_lines_tick", |b| {
        b.iter(|| {
            world.tick();
        });
    });

    group.finish();
}

fn bench_belt_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("belt_heavy");
    group.sample_size(30);

    let mut world = build_belt_world();
    group.bench_function("4096_belts_1024_items", |b| {
        b.iter(|| {
            world.tick();
        });
    });

    group.finish();
}

fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");
    group.sample_size(30);

    let world = build_smelting_world();

    group.bench_function("to_json", |b| {
        b.iter(|| {
            world.to_json().unwrap();
        });
    });

    group.bench_function("serialize_binary", |b| {
        b.iter(|| {
            world.serialize().unwrap();
        });
    });

    let json = world.to_json().unwrap();
    group.bench_function("from_json", |b| {
        b.iter(|| {
            World::from_json(&json).unwrap();
        });
    });

    let bytes = world.serialize().unwrap();
    group.bench_function("deserialize_binary", |b| {
        b.iter(|| {
            World::deserialize(&bytes).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_smelting, bench_belt_heavy, bench_serialization);
criterion_main!(benches);
