//! Headless run: generate a world, build a small factory with player
//! commands, run it, and save it.
//!
//! Logs go through `tracing`; set `RUST_LOG=factorish_core=debug` to see
//! every command, or `trace` for every tick.
//!
//! Run with: `cargo run -p factorish-core --example headless`

use factorish_core::command::{Command, CommandQueue};
use factorish_core::config::SimConfig;
use factorish_core::grid::{OreKind, Rotation, TilePos};
use factorish_core::id::{ItemType, StructureKind};
use factorish_core::recipe::RecipeBook;
use factorish_core::world::World;
use factorish_core::worldgen::NoiseOreGenerator;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();

    let mut world = World::generate(24, &NoiseOreGenerator::new(42), SimConfig::default(), RecipeBook::default());

    // Find an iron tile with a free row of six tiles to its right.
    let Some(site) = world.grid().positions().find(|&pos| {
        pos.x + 6 < 24 && world.grid().tile(pos).is_some_and(|t| t.ore.get(OreKind::Iron) > 0)
    }) else {
        tracing::warn!("no iron on this map");
        return;
    };
    tracing::info!(?site, "building smelting line");

    let at = |dx: i32| TilePos::new(site.x + dx, site.y);
    let build = |dx: i32, kind: StructureKind| Command::Build {
        pos: at(dx),
        kind,
        rotation: Rotation::Right,
    };
    let mut queue = CommandQueue::with_max_history(64);
    queue.push_batch([
        build(0, StructureKind::OreMine),
        build(1, StructureKind::TransportBelt),
        build(2, StructureKind::TransportBelt),
        build(3, StructureKind::Inserter),
        build(4, StructureKind::Furnace),
        build(5, StructureKind::Inserter),
        build(6, StructureKind::Chest),
        Command::GiveToStructure {
            pos: at(0),
            item: ItemType::CoalOre,
            count: 1,
        },
        Command::GiveToStructure {
            pos: at(4),
            item: ItemType::CoalOre,
            count: 1,
        },
    ]);
    for result in queue.apply_all(&mut world) {
        if let Err(err) = result {
            tracing::warn!(%err, "command rejected");
        }
    }

    for _ in 0..1200 {
        world.tick();
    }

    let plates = world
        .grid()
        .structure(at(6))
        .and_then(|s| s.inventory())
        .map_or(0, |inv| inv.count(ItemType::IronPlate));
    tracing::info!(tick = world.tick_count(), plates, hash = world.state_hash(), "finished");

    match world.to_json() {
        Ok(json) => println!("{json}"),
        Err(err) => tracing::error!(%err, "save failed"),
    }
}
