//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::fixed::Fixed64;
use crate::grid::{OreKind, Rotation, TilePos};
use crate::id::{ItemType, StructureKind};
use crate::world::World;

// ===========================================================================
// Small constructors
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

pub fn pos(x: i32, y: i32) -> TilePos {
    TilePos::new(x, y)
}

// ===========================================================================
// World building
// ===========================================================================

/// Place a structure, panicking if the footprint is taken.
pub fn place(world: &mut World, x: i32, y: i32, kind: StructureKind, rotation: Rotation) -> TilePos {
    let at = pos(x, y);
    assert!(world.place(at, kind, rotation), "could not place {kind:?} at {at:?}");
    at
}

/// A straight belt of `len` tiles starting at `(x, y)` and running towards
/// `rotation`.
pub fn belt_line(world: &mut World, x: i32, y: i32, len: u32, rotation: Rotation) -> Vec<TilePos> {
    let mut at = pos(x, y);
    let mut tiles = Vec::with_capacity(len as usize);
    for _ in 0..len {
        place(world, at.x, at.y, StructureKind::TransportBelt, rotation);
        tiles.push(at);
        at = at.step(rotation);
    }
    tiles
}

pub fn set_ore(world: &mut World, at: TilePos, kind: OreKind, amount: u32) {
    let tile = world.grid_mut().tile_mut(at).expect("ore tile out of bounds");
    *tile.ore.get_mut(kind) = amount;
}

/// Feed `count` units of coal to the structure anchored at `at`.
pub fn fuel(world: &mut World, at: TilePos, count: u32) {
    for _ in 0..count {
        assert!(world.structure_input(at, ItemType::CoalOre), "structure at {at:?} refused fuel");
    }
}

pub fn run(world: &mut World, ticks: u32) {
    for _ in 0..ticks {
        world.tick();
    }
}

/// Count of `item` held by the structure at `at` (0 when there is none).
pub fn held(world: &World, at: TilePos, item: ItemType) -> u32 {
    world
        .grid()
        .structure(at)
        .and_then(|s| s.inventory())
        .map_or(0, |inventory| inventory.count(item))
}

/// Floating items of type `item` anywhere on the map.
pub fn floating(world: &World, item: ItemType) -> usize {
    world.items().iter().filter(|d| d.item == item).count()
}

// ===========================================================================
// Canned layouts
// ===========================================================================

/// Positions of the pieces of [`smelting_line`].
#[derive(Debug, Clone, Copy)]
pub struct SmeltingLine {
    pub mine: TilePos,
    pub furnace: TilePos,
    pub chest: TilePos,
}

/// Fuelled ore mine → belt → inserter → fuelled furnace → inserter → chest,
/// running east along row `y`. Needs a world at least 8 tiles wide.
pub fn smelting_line(world: &mut World, y: i32, ore: u32) -> SmeltingLine {
    let mine = place(world, 0, y, StructureKind::OreMine, Rotation::Right);
    set_ore(world, mine, OreKind::Iron, ore);
    belt_line(world, 1, y, 2, Rotation::Right);
    place(world, 3, y, StructureKind::Inserter, Rotation::Right);
    let furnace = place(world, 4, y, StructureKind::Furnace, Rotation::Right);
    place(world, 5, y, StructureKind::Inserter, Rotation::Right);
    let chest = place(world, 6, y, StructureKind::Chest, Rotation::Right);
    fuel(world, mine, 1);
    fuel(world, furnace, 1);
    SmeltingLine { mine, furnace, chest }
}

/// Water well → boiler → steam engine → assembler along row `y`, with the
/// boiler fuelled. Returns the assembler's position.
pub fn power_plant(world: &mut World, y: i32) -> TilePos {
    place(world, 0, y, StructureKind::WaterWell, Rotation::Left);
    let boiler = place(world, 1, y, StructureKind::Boiler, Rotation::Left);
    place(world, 2, y, StructureKind::SteamEngine, Rotation::Left);
    let assembler = place(world, 3, y, StructureKind::Assembler, Rotation::Left);
    fuel(world, boiler, 1);
    assembler
}
