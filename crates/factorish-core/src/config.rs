//! Tunable simulation constants.

use crate::fixed::{Fixed64, ratio};
use crate::grid::TILE_SIZE;
use crate::item::DEFAULT_CAPACITY;
use crate::player::PLAYER_CAPACITY;
use serde::{Deserialize, Serialize};

/// Every constant the tick loop reads. Defaults reproduce the stock game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Ticks an inserter waits after a successful transfer.
    pub inserter_cooldown: u32,
    /// Energy released by burning one unit of fuel.
    pub fuel_energy: Fixed64,
    /// Fraction of the pressure difference that moves per diffusion step.
    pub diffusion_rate: Fixed64,
    /// Water a well adds to its box each tick.
    pub well_pump_rate: Fixed64,
    /// Two floating items closer than this on both axes collide.
    pub item_hit_radius: Fixed64,
    /// Chebyshev radius, in tiles, a steam engine powers.
    pub power_radius: i32,
    pub steam_engine_max_power: Fixed64,
    /// Steam a steam engine can burn per tick.
    pub steam_per_tick: Fixed64,
    /// Power produced per unit of steam.
    pub power_per_steam: Fixed64,
    pub assembler_max_electricity: Fixed64,
    /// Water boiled (and steam produced) per unit of boiler progress.
    pub boiler_fluid_per_progress: Fixed64,
    pub fluid_box_capacity: Fixed64,
    pub chest_capacity: u32,
    pub player_capacity: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            inserter_cooldown: 10,
            fuel_energy: Fixed64::from_num(100),
            diffusion_rate: ratio(1, 10),
            well_pump_rate: ratio(1, 10),
            item_hit_radius: ratio(TILE_SIZE, 3),
            power_radius: 3,
            steam_engine_max_power: Fixed64::from_num(10),
            steam_per_tick: ratio(1, 10),
            power_per_steam: Fixed64::ONE,
            assembler_max_electricity: ratio(2, 100),
            boiler_fluid_per_progress: ratio(1, 10),
            fluid_box_capacity: Fixed64::from_num(10),
            chest_capacity: DEFAULT_CAPACITY,
            player_capacity: PLAYER_CAPACITY,
        }
    }
}
