//! Integration tests for the Factorish simulation.
//!
//! These tests drive whole worlds through the public API: belts and
//! inserters moving items, furnaces and mines producing, the steam power
//! chain, player commands, listeners and save/load determinism.

use factorish_core::command::{Command, CommandError, CommandQueue};
use factorish_core::config::SimConfig;
use factorish_core::event::InventoryOwner;
use factorish_core::fixed::{Fixed64, ratio};
use factorish_core::grid::{OreKind, Rotation, TILE_SIZE, TilePos};
use factorish_core::id::{FluidType, ItemType, StructureKind};
use factorish_core::recipe::RecipeBook;
use factorish_core::structure::StructureState;
use factorish_core::test_utils::*;
use factorish_core::world::World;
use std::cell::RefCell;
use std::rc::Rc;

// ===========================================================================
// Test 1: Belt advances one unit per tick
// ===========================================================================
//
// An item dropped on the first tile of an east-facing belt moves x += 1 on
// every tick while the next position is on a belt and free.

#[test]
fn belt_advances_one_unit_per_tick() {
    let mut world = World::new(8);
    belt_line(&mut world, 0, 0, 4, Rotation::Right);
    assert!(world.drop_item(pos(0, 0), ItemType::IronOre));
    let start = world.items()[0].x;
    assert_eq!(start, TILE_SIZE / 2);

    for t in 1..=20 {
        world.tick();
        assert_eq!(world.items()[0].x, start + t);
        assert_eq!(world.items()[0].y, TILE_SIZE / 2);
    }
}

// ===========================================================================
// Test 2: Belt stops at the end of the line
// ===========================================================================

#[test]
fn belt_stops_where_the_line_ends() {
    let mut world = World::new(8);
    belt_line(&mut world, 0, 0, 2, Rotation::Right);
    assert!(world.drop_item(pos(1, 0), ItemType::Gear));

    run(&mut world, 100);
    let last = 2 * TILE_SIZE - 1;
    assert_eq!(world.items()[0].x, last);
    world.tick();
    assert_eq!(world.items()[0].x, last);
}

// ===========================================================================
// Test 3: An empty furnace never starts
// ===========================================================================

#[test]
fn empty_furnace_never_processes() {
    let mut world = World::new(4);
    let furnace = place(&mut world, 1, 1, StructureKind::Furnace, Rotation::Left);
    run(&mut world, 200);

    let factory = world.grid().structure(furnace).and_then(|s| s.factory()).unwrap();
    assert!(!factory.processing);
    assert!(factory.recipe.is_none());
    assert!(factory.inventory.is_empty());
}

// ===========================================================================
// Test 4: Inserter moves one item per cooldown window
// ===========================================================================
//
// Furnace (holding plates) -> Inserter -> Chest. The inserter must transfer
// exactly one plate every 10 ticks and never two within one window.

#[test]
fn inserter_moves_one_item_per_window() {
    let mut world = World::new(4);
    let furnace = place(&mut world, 0, 0, StructureKind::Furnace, Rotation::Left);
    place(&mut world, 1, 0, StructureKind::Inserter, Rotation::Right);
    let chest = place(&mut world, 2, 0, StructureKind::Chest, Rotation::Left);
    let inventory = world
        .grid_mut()
        .structure_mut(furnace)
        .and_then(|s| s.inventory_mut())
        .unwrap();
    assert_eq!(inventory.add(ItemType::IronPlate, 8), 8);

    let cooldown = world.config().inserter_cooldown as usize;
    let mut transfer_ticks = Vec::new();
    let mut last = 0;
    for t in 1..=50 {
        world.tick();
        let now = held(&world, chest, ItemType::IronPlate);
        assert!(now - last <= 1, "two transfers in one tick");
        if now > last {
            transfer_ticks.push(t);
        }
        last = now;
    }

    assert_eq!(transfer_ticks.len(), 5);
    for pair in transfer_ticks.windows(2) {
        assert_eq!(pair[1] - pair[0], cooldown);
    }
    assert_eq!(held(&world, furnace, ItemType::IronPlate), 3);
}

// ===========================================================================
// Test 5: Steam engine charges an assembler to its maximum
// ===========================================================================

#[test]
fn steam_engine_charges_assembler_in_radius() {
    let mut world = World::new(8);
    let engine = place(&mut world, 1, 1, StructureKind::SteamEngine, Rotation::Left);
    let assembler = place(&mut world, 4, 1, StructureKind::Assembler, Rotation::Left);
    if let Some(StructureState::SteamEngine(engine)) = world.grid_mut().structure_mut(engine).map(|s| &mut s.state) {
        engine.fluid.fill(FluidType::Steam, Fixed64::from_num(5));
    }

    world.tick();
    let buffer = world.grid().structure(assembler).and_then(|s| s.electricity()).unwrap();
    assert_eq!(buffer.electricity, ratio(1, 50));
    assert_eq!(buffer.electricity, world.config().assembler_max_electricity);

    let (power, _) = world.grid().structure(engine).and_then(|s| s.power_gauge()).unwrap();
    assert!(power > Fixed64::ZERO, "engine should not be exhausted");
}

// ===========================================================================
// Test 6: Ore mine drains its tile and forgets the recipe
// ===========================================================================

#[test]
fn ore_mine_drains_tile_then_forgets_recipe() {
    let mut world = World::new(8);
    let mine = place(&mut world, 0, 0, StructureKind::OreMine, Rotation::Right);
    set_ore(&mut world, mine, OreKind::Copper, 2);
    belt_line(&mut world, 1, 0, 6, Rotation::Right);
    fuel(&mut world, mine, 1);

    run(&mut world, 400);
    let tile = world.grid().tile(mine).unwrap();
    assert_eq!(tile.ore.copper, 0);
    assert_eq!(floating(&world, ItemType::CopperOre), 2);
    assert!(world.grid().structure(mine).unwrap().recipe().is_none());

    // Nothing left to mine: no more items, ever.
    run(&mut world, 200);
    assert_eq!(floating(&world, ItemType::CopperOre), 2);
}

// ===========================================================================
// Test 7: Mine -> belt -> furnace -> chest
// ===========================================================================

#[test]
fn smelting_line_fills_chest_with_plates() {
    let mut world = World::new(8);
    let line = smelting_line(&mut world, 2, 50);

    run(&mut world, 600);
    let plates = held(&world, line.chest, ItemType::IronPlate);
    assert!(plates >= 3, "expected plates in the chest, got {plates}");

    // Every plate came from a unit of mined ore.
    let mined = 50 - world.grid().tile(line.mine).unwrap().ore.iron;
    assert!(plates <= mined);
    // Fuel never leaves the furnace.
    assert_eq!(held(&world, line.chest, ItemType::CoalOre), 0);
}

// ===========================================================================
// Test 8: Water -> boiler -> steam engine -> assembler
// ===========================================================================

#[test]
fn power_plant_energizes_assembler() {
    let mut world = World::new(8);
    let assembler = power_plant(&mut world, 3);
    run(&mut world, 300);

    let buffer = world.grid().structure(assembler).and_then(|s| s.electricity()).unwrap();
    assert!(buffer.electricity > Fixed64::ZERO);
    assert_eq!(world.connection(pos(1, 3)), 0b0101);
}

// ===========================================================================
// Test 9: Assembler crafts gears once powered
// ===========================================================================

#[test]
fn powered_assembler_crafts_gears() {
    let mut world = World::new(8);
    let assembler = power_plant(&mut world, 3);
    world
        .apply(Command::SelectRecipe {
            pos: assembler,
            recipe: 0,
        })
        .unwrap();
    assert_eq!(world.player_mut().inventory.add(ItemType::IronPlate, 2), 2);

    for made in 1..=2 {
        world
            .apply(Command::GiveToStructure {
                pos: assembler,
                item: ItemType::IronPlate,
                count: 1,
            })
            .unwrap_or_else(|e| panic!("assembler refused plate: {e}"));
        run(&mut world, 300);
        assert_eq!(held(&world, assembler, ItemType::Gear), made);
    }
    assert_eq!(held(&world, assembler, ItemType::IronPlate), 0);
}

// ===========================================================================
// Test 10: Commands spend and refund the player's items
// ===========================================================================

#[test]
fn build_and_harvest_round_trip() {
    let mut world = World::new(8);
    let belts = world.player().inventory.count(ItemType::TransportBelt);

    world
        .apply(Command::Build {
            pos: pos(2, 2),
            kind: StructureKind::TransportBelt,
            rotation: Rotation::Bottom,
        })
        .unwrap();
    assert_eq!(world.player().inventory.count(ItemType::TransportBelt), belts - 1);

    let err = world
        .apply(Command::Build {
            pos: pos(9, 9),
            kind: StructureKind::TransportBelt,
            rotation: Rotation::Bottom,
        })
        .unwrap_err();
    assert_eq!(err, CommandError::OutOfBounds(pos(9, 9)));

    world.apply(Command::Harvest { pos: pos(2, 2) }).unwrap();
    assert_eq!(world.player().inventory.count(ItemType::TransportBelt), belts);
    assert!(world.grid().structure(pos(2, 2)).is_none());
}

// ===========================================================================
// Test 11: Command queue applies between ticks and keeps history
// ===========================================================================

#[test]
fn command_queue_drives_world() {
    let mut world = World::new(8);
    let mut queue = CommandQueue::with_max_history(16);
    queue.push_batch([
        Command::Build {
            pos: pos(0, 0),
            kind: StructureKind::Chest,
            rotation: Rotation::Left,
        },
        Command::GiveToStructure {
            pos: pos(0, 0),
            item: ItemType::CoalOre,
            count: 5,
        },
        Command::Rotate { pos: pos(7, 7) },
    ]);

    let results = queue.apply_all(&mut world);
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert_eq!(results[2], Err(CommandError::NoStructure(pos(7, 7))));
    assert_eq!(held(&world, pos(0, 0), ItemType::CoalOre), 5);
    assert!(queue.is_empty());
    assert_eq!(queue.history().len(), 3);
}

// ===========================================================================
// Test 12: Listeners see every changed inventory
// ===========================================================================

#[test]
fn listener_sees_chest_fill() {
    let mut world = World::new(4);
    place(&mut world, 0, 0, StructureKind::Chest, Rotation::Left);
    let seen: Rc<RefCell<Vec<(InventoryOwner, u32)>>> = Rc::default();
    let sink = Rc::clone(&seen);
    world.on_inventory_changed(Box::new(move |owner, inventory| {
        sink.borrow_mut().push((owner, inventory.volume()));
    }));

    world
        .apply(Command::GiveToStructure {
            pos: pos(0, 0),
            item: ItemType::Gear,
            count: 0,
        })
        .unwrap_err();
    world
        .apply(Command::GiveToStructure {
            pos: pos(0, 0),
            item: ItemType::CoalOre,
            count: 2,
        })
        .unwrap();

    let seen = seen.borrow();
    assert!(seen.contains(&(InventoryOwner::Structure(pos(0, 0)), 2)));
    assert!(seen.iter().any(|(owner, _)| *owner == InventoryOwner::Player));
}

// ===========================================================================
// Test 13: Save mid-run, load, and continue identically
// ===========================================================================

#[test]
fn save_load_continues_identically() {
    let mut world = World::new(8);
    smelting_line(&mut world, 1, 30);
    power_plant(&mut world, 4);
    place(&mut world, 0, 6, StructureKind::Splitter, Rotation::Right);
    run(&mut world, 250);

    let json = world.to_json().unwrap();
    let mut from_json = World::from_json(&json).unwrap();
    let bytes = world.serialize().unwrap();
    let mut from_bytes = World::deserialize(&bytes).unwrap();

    for _ in 0..300 {
        world.tick();
        from_json.tick();
        from_bytes.tick();
    }
    assert_eq!(from_json.state_hash(), world.state_hash());
    assert_eq!(from_bytes.state_hash(), world.state_hash());
}

// ===========================================================================
// Test 14: Independent worlds do not interfere
// ===========================================================================

#[test]
fn identical_worlds_stay_in_lockstep() {
    let mut a = World::new(8);
    let mut b = World::new(8);
    for world in [&mut a, &mut b] {
        smelting_line(world, 0, 20);
    }
    for _ in 0..200 {
        a.tick();
        b.tick();
        assert_eq!(a.state_hash(), b.state_hash());
    }
    // Diverge b only.
    b.apply(Command::Harvest { pos: pos(2, 0) }).unwrap();
    assert_ne!(a.state_hash(), b.state_hash());
}

// ===========================================================================
// Test 15: Pipes relax in raster order, in place
// ===========================================================================
//
// Three pipes in a row, all water in the first. Each pipe exchanges with its
// neighbors when its turn in the scan comes, so later pipes see amounts
// already moved this tick.

fn pipe_amounts(world: &World, tiles: &[TilePos]) -> Vec<Fixed64> {
    tiles
        .iter()
        .map(|&at| world.grid().structure(at).map_or(Fixed64::ZERO, |s| s.fluid_boxes()[0].amount))
        .collect()
}

#[test]
fn pipe_chain_diffuses_in_scan_order() {
    let config = SimConfig {
        diffusion_rate: ratio(1, 4),
        ..SimConfig::default()
    };
    let mut world = World::with_rules(4, config, RecipeBook::default());
    let pipes: Vec<TilePos> = (0..3)
        .map(|x| place(&mut world, x, 0, StructureKind::Pipe, Rotation::Left))
        .collect();
    let first = world.grid_mut().structure_mut(pipes[0]).unwrap();
    first.fluid_boxes_mut()[0].fill(FluidType::Water, fixed(8.0));

    world.tick();
    assert_eq!(pipe_amounts(&world, &pipes), vec![fixed(5.0), fixed(1.875), fixed(1.125)]);

    world.tick();
    assert_eq!(
        pipe_amounts(&world, &pipes),
        vec![fixed(3.828125), fixed(2.326171875), fixed(1.845703125)]
    );
    for &at in &pipes {
        let fluid_box = &world.grid().structure(at).unwrap().fluid_boxes()[0];
        assert_eq!(fluid_box.fluid, Some(FluidType::Water));
    }
}

// ===========================================================================
// Test 16: Well, pipes and boiler account for every drop
// ===========================================================================
//
// With no steam engine to burn steam, the only change in total fluid is
// what the well pumps in. The boiler turns water into the same amount of
// steam.

fn total_fluid(world: &World) -> Fixed64 {
    world
        .grid()
        .tiles()
        .iter()
        .filter_map(|tile| tile.structure.as_ref())
        .flat_map(|structure| structure.fluid_boxes().iter())
        .fold(Fixed64::ZERO, |total, fluid_box| total + fluid_box.amount)
}

#[test]
fn fluid_network_conserves_across_ticks() {
    let mut world = World::new(6);
    place(&mut world, 0, 0, StructureKind::WaterWell, Rotation::Left);
    place(&mut world, 1, 0, StructureKind::Pipe, Rotation::Left);
    place(&mut world, 2, 0, StructureKind::Pipe, Rotation::Left);
    let boiler = place(&mut world, 3, 0, StructureKind::Boiler, Rotation::Left);
    fuel(&mut world, boiler, 1);

    let pump = world.config().well_pump_rate;
    let mut expected = Fixed64::ZERO;
    for _ in 0..100 {
        world.tick();
        expected += pump;
        assert_eq!(total_fluid(&world), expected);
    }
    let steam = world.grid().structure(boiler).unwrap().fluid_boxes()[1];
    assert_eq!(steam.fluid, Some(FluidType::Steam));
    assert!(steam.amount > Fixed64::ZERO);
}
