//! Steam engines: burn steam into a power buffer and hand it out to
//! electricity consumers nearby.

use crate::config::SimConfig;
use crate::fixed::{Fixed64, checked_div_64};
use crate::fluid::{self, FluidBox};
use crate::grid::{Grid, Rotation, TilePos};
use crate::id::FluidType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteamEngine {
    pub fluid: FluidBox,
    pub power: Fixed64,
    pub max_power: Fixed64,
}

impl SteamEngine {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            fluid: FluidBox::new(config.fluid_box_capacity).with_filter(FluidType::Steam),
            power: Fixed64::ZERO,
            max_power: config.steam_engine_max_power,
        }
    }

    /// Convert up to one tick's worth of steam into buffered power.
    fn burn_steam(&mut self, config: &SimConfig) {
        if self.fluid.fluid != Some(FluidType::Steam) || self.fluid.amount <= Fixed64::ZERO {
            return;
        }
        let room = checked_div_64(self.max_power - self.power, config.power_per_steam).unwrap_or(Fixed64::ZERO);
        let spent = self
            .fluid
            .amount
            .min(room)
            .min(config.steam_per_tick)
            .max(Fixed64::ZERO);
        self.power += spent * config.power_per_steam;
        self.fluid.amount -= spent;
    }
}

/// Tiles within `radius` of `pos` that lie on the grid, in raster order.
fn power_area(grid: &Grid, pos: TilePos, radius: i32) -> impl Iterator<Item = TilePos> + use<> {
    let last = grid.size() as i32 - 1;
    let radius = radius.clamp(0, last.max(0));
    let (x0, x1) = (pos.x.saturating_sub(radius).max(0), pos.x.saturating_add(radius).min(last));
    let (y0, y1) = (pos.y.saturating_sub(radius).max(0), pos.y.saturating_add(radius).min(last));
    (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| TilePos::new(x, y)))
}

/// One tick of the engine anchored at `pos`, which the caller has taken out
/// of `grid`.
pub(crate) fn steam_engine_frame(
    engine: &mut SteamEngine,
    pos: TilePos,
    rotation: Rotation,
    grid: &mut Grid,
    config: &SimConfig,
) {
    fluid::diffuse(std::slice::from_mut(&mut engine.fluid), pos, rotation, grid, config.diffusion_rate);
    engine.burn_steam(config);

    if engine.power <= Fixed64::ZERO {
        return;
    }
    for target in power_area(grid, pos, config.power_radius) {
        let Some(buffer) = grid.structure_mut(target).and_then(|s| s.electricity_mut()) else {
            continue;
        };
        if buffer.max_electricity <= Fixed64::ZERO {
            continue;
        }
        engine.power -= buffer.charge(engine.power);
        if engine.power <= Fixed64::ZERO {
            break;
        }
    }
}
