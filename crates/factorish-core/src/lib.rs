//! Factorish Core -- a tile-grid factory simulation.
//!
//! A square [`world::World`] of tiles carries ore deposits and at most one
//! structure anchored per tile. Items float freely on top of the grid and
//! are pushed around by belts and splitters, moved between structures by
//! inserters, and turned into other items by furnaces and assemblers. Water
//! wells, pipes, boilers and steam engines form a fluid and power network.
//!
//! # Tick
//!
//! Each call to [`world::World::tick`] runs two passes:
//!
//! 1. **Items** -- every floating item standing on a belt or splitter asks
//!    that structure where to go next. Moves are checked against positions
//!    from the start of the pass plus destinations already claimed, and are
//!    committed together at the end.
//! 2. **Structures** -- every structure runs its frame in raster order
//!    (top row first, left to right). Fluid diffusion within this pass sees
//!    values already updated earlier in the same pass.
//!
//! Inventory listeners are notified after the tick, once per changed
//! inventory.
//!
//! # Commands
//!
//! The player builds, harvests, rotates and reconfigures structures through
//! [`command::Command`], applied between ticks. A rejected command leaves the
//! world unchanged and reports a [`command::CommandError`].
//!
//! # Key Types
//!
//! - [`world::World`] -- grid, floating items, player and tick counter.
//! - [`structure::Structure`] -- closed set of structure kinds.
//! - [`factory::Factory`] -- recipe state machine shared by furnaces,
//!   assemblers and boilers.
//! - [`fluid::FluidBox`] -- per-structure fluid storage and diffusion.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.
//! - [`serialize`] -- JSON save games and versioned binary snapshots.

pub mod command;
pub mod config;
pub mod drop_item;
pub mod event;
pub mod factory;
pub mod fixed;
pub mod fluid;
pub mod grid;
pub mod id;
pub mod inserter;
pub mod item;
pub mod mining;
pub mod player;
pub mod power;
pub mod production;
pub mod recipe;
pub mod replay;
pub mod rng;
pub mod serialize;
pub mod sim;
pub mod structure;
pub mod transport;
pub mod world;
pub mod worldgen;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
