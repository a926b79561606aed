//! Property-based tests for the Factorish core.
//!
//! Random layouts, inventories and fluid states are generated with
//! proptest and run through the public API to check invariants that must
//! hold for every input.

use factorish_core::factory::{Factory, FactoryTick};
use factorish_core::fixed::{Fixed64, ratio};
use factorish_core::fluid::{FluidBox, exchange};
use factorish_core::grid::{OreKind, Rotation};
use factorish_core::id::{FluidType, ItemType, StructureKind};
use factorish_core::item::Inventory;
use factorish_core::recipe::Recipe;
use factorish_core::test_utils::*;
use factorish_core::world::World;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_rotation() -> impl Strategy<Value = Rotation> {
    (0..4u32).prop_map(Rotation::from_index)
}

fn arb_item() -> impl Strategy<Value = ItemType> {
    (0..ItemType::ALL.len()).prop_map(|i| ItemType::ALL[i])
}

fn arb_transport() -> impl Strategy<Value = StructureKind> {
    prop_oneof![Just(StructureKind::TransportBelt), Just(StructureKind::Splitter)]
}

/// A small world covered in randomly oriented belts and splitters with a
/// few items scattered on it.
fn arb_transport_world() -> impl Strategy<Value = World> {
    let tiles = proptest::collection::vec((arb_transport(), arb_rotation()), 16);
    let drops = proptest::collection::vec((0..128i32, 0..128i32), 1..12);
    (tiles, drops).prop_map(|(tiles, drops)| {
        let mut world = World::new(4);
        for (i, (kind, rotation)) in tiles.into_iter().enumerate() {
            let at = pos(i as i32 % 4, i as i32 / 4);
            // Splitters overlapping an earlier structure are simply skipped.
            world.place(at, kind, rotation);
        }
        for (x, y) in drops {
            world.drop_item_at(x, y, ItemType::IronOre);
        }
        world
    })
}

#[derive(Debug, Clone, Copy)]
enum InvOp {
    Add(ItemType, u32),
    Remove(ItemType, u32),
}

fn arb_inv_ops() -> impl Strategy<Value = Vec<InvOp>> {
    proptest::collection::vec(
        prop_oneof![
            (arb_item(), 0..60u32).prop_map(|(i, n)| InvOp::Add(i, n)),
            (arb_item(), 0..60u32).prop_map(|(i, n)| InvOp::Remove(i, n)),
        ],
        1..40,
    )
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Items pushed by belts and splitters never leave the world.
    #[test]
    fn transported_items_stay_in_bounds(mut world in arb_transport_world(), ticks in 1..200u32) {
        let extent = world.grid().extent();
        for _ in 0..ticks {
            world.tick();
            for item in world.items() {
                prop_assert!((0..=extent).contains(&item.x), "x = {}", item.x);
                prop_assert!((0..=extent).contains(&item.y), "y = {}", item.y);
            }
        }
    }

    // Adding never overfills and never reports more than was asked for.
    #[test]
    fn inventory_respects_capacity(capacity in 0..120u32, ops in arb_inv_ops()) {
        let mut inventory = Inventory::new(capacity);
        for op in ops {
            match op {
                InvOp::Add(item, count) => {
                    let moved = inventory.add(item, count);
                    prop_assert!(moved <= count);
                }
                InvOp::Remove(item, count) => {
                    let held = inventory.count(item);
                    let removed = inventory.remove(item, count);
                    prop_assert_eq!(removed, count.min(held));
                }
            }
            prop_assert!(inventory.volume() <= inventory.capacity());
        }
    }

    // Whole ticks over a random pipe layout move water but never create or
    // destroy it.
    #[test]
    fn pipe_network_conserves_per_tick(
        layout in proptest::collection::vec(proptest::option::of(0..=40i32), 16),
        ticks in 1..20usize,
    ) {
        let mut world = World::new(4);
        for (i, amount) in layout.iter().enumerate() {
            let Some(amount) = *amount else { continue };
            let at = pos(i as i32 % 4, i as i32 / 4);
            prop_assert!(world.place(at, StructureKind::Pipe, Rotation::Left));
            if amount > 0 {
                let pipe = world.grid_mut().structure_mut(at).unwrap();
                pipe.fluid_boxes_mut()[0].fill(FluidType::Water, ratio(amount, 4));
            }
        }
        let total = |world: &World| {
            world
                .grid()
                .tiles()
                .iter()
                .filter_map(|tile| tile.structure.as_ref())
                .fold(Fixed64::ZERO, |sum, s| sum + s.fluid_boxes()[0].amount)
        };
        let before = total(&world);
        for _ in 0..ticks {
            world.tick();
            prop_assert_eq!(total(&world), before);
        }
    }

    // Two isolated boxes exchanging fluid keep the total constant.
    #[test]
    fn fluid_exchange_conserves(a in 0..=40i32, b in 0..=40i32, steps in 1..50usize) {
        let mut left = FluidBox::new(Fixed64::from_num(10));
        let mut right = FluidBox::new(Fixed64::from_num(10));
        left.fill(FluidType::Water, ratio(a, 4));
        if b > 0 {
            right.fill(FluidType::Water, ratio(b, 4));
        }
        let total = left.amount + right.amount;
        for _ in 0..steps {
            exchange(&mut left, &mut right, ratio(1, 10));
            exchange(&mut right, &mut left, ratio(1, 10));
            let drift = (left.amount + right.amount - total).abs();
            prop_assert!(drift <= Fixed64::from_bits(4), "drift {}", drift);
            prop_assert!(left.amount >= Fixed64::ZERO && right.amount >= Fixed64::ZERO);
        }
    }

    // A mine takes exactly one unit of stock per item produced and drops
    // its recipe when the tile runs dry.
    #[test]
    fn mine_decrements_stock_exactly(stock in 0..4u32, kind in 0..3usize) {
        let ore = OreKind::PRIORITY[kind];
        let mut world = World::new(10);
        let mine = place(&mut world, 0, 0, StructureKind::OreMine, Rotation::Right);
        set_ore(&mut world, mine, ore, stock);
        belt_line(&mut world, 1, 0, 9, Rotation::Right);
        fuel(&mut world, mine, 1);

        let mut previous = stock;
        for _ in 0..400 {
            world.tick();
            let left = world.grid().tile(mine).unwrap().ore.get(ore);
            prop_assert!(left <= previous && previous - left <= 1);
            previous = left;
        }
        prop_assert_eq!(previous, 0);
        prop_assert_eq!(floating(&world, ore.item()), stock as usize);
        prop_assert!(world.grid().structure(mine).unwrap().recipe().is_none());
    }

    // A factory only starts when every ingredient is present at once, and
    // a failed start leaves its inventory untouched.
    #[test]
    fn factory_start_is_atomic(plates in 0..4u32, gears in 0..4u32, need_plates in 1..4u32, need_gears in 1..4u32) {
        let mut factory = Factory::new(100, false);
        factory.set_recipe(Some(
            Recipe::new(10)
                .input(ItemType::IronPlate, need_plates)
                .input(ItemType::Gear, need_gears)
                .output(ItemType::TransportBelt, 1),
        ));
        let _ = factory.inventory.add(ItemType::IronPlate, plates);
        let _ = factory.inventory.add(ItemType::Gear, gears);
        let before = factory.inventory.clone();

        let outcome = factory.tick(Fixed64::from_num(100), |progress| progress);
        if plates >= need_plates && gears >= need_gears {
            prop_assert_eq!(outcome, FactoryTick::Started);
            prop_assert!(factory.processing);
            prop_assert_eq!(factory.inventory.count(ItemType::IronPlate), plates - need_plates);
            prop_assert_eq!(factory.inventory.count(ItemType::Gear), gears - need_gears);
        } else {
            prop_assert_eq!(outcome, FactoryTick::Idle);
            prop_assert!(!factory.processing);
            prop_assert_eq!(factory.inventory, before);
        }
    }
}
