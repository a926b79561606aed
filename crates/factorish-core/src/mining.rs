//! Ore mines: burner-driven extractors that drain the ore stock of the tile
//! they stand on.
//!
//! The recipe follows the ore present under the mine, checked iron first,
//! then copper, then coal. Every unit placed in front of the mine removes one
//! unit of stock from the tile, and the recipe is dropped once that stock is
//! gone so the next frame can pick up any other ore left on the tile.

use crate::factory::Burner;
use crate::fixed::Fixed64;
use crate::grid::{OreKind, Rotation, TilePos};
use crate::id::ItemType;
use crate::item::{Container, Inventory};
use crate::recipe::{Recipe, cycle_time};
use crate::world::World;

/// Inventory slots of a mine; it only ever holds one unit of fuel.
pub const MINE_CAPACITY: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OreMine {
    pub inventory: Inventory,
    pub recipe: Option<Recipe>,
    pub cooldown: Fixed64,
    pub burner: Burner,
}

impl Default for OreMine {
    fn default() -> Self {
        Self::new()
    }
}

impl OreMine {
    pub fn new() -> Self {
        Self {
            inventory: Inventory::new(MINE_CAPACITY),
            recipe: None,
            cooldown: Fixed64::ZERO,
            burner: Burner::default(),
        }
    }

    /// Mines burn coal and accept nothing else.
    pub fn input(&mut self, item: ItemType) -> bool {
        item.is_fuel() && self.inventory.add(item, 1) == 1
    }

    /// Ore produced by the current recipe.
    pub fn ore(&self) -> Option<OreKind> {
        self.recipe
            .as_ref()
            .and_then(|r| r.outputs.keys().next().copied())
            .and_then(OreKind::from_item)
    }

    /// Whether a finished cycle is waiting and fuel covers the next unit.
    fn ready(&self) -> bool {
        match &self.recipe {
            Some(recipe) => self.cooldown <= Fixed64::ZERO && self.burner.power >= recipe.power_cost,
            None => false,
        }
    }

    /// Fraction of the current cycle completed, for display.
    pub fn progress_ratio(&self) -> Fixed64 {
        match &self.recipe {
            Some(recipe) if recipe.time > 0 => {
                let time = cycle_time(recipe.time);
                (time - self.cooldown) / time
            }
            _ => Fixed64::ZERO,
        }
    }
}

impl Container for OreMine {
    fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }
}

/// One tick of the mine anchored at `pos`: derive a recipe, burn fuel,
/// advance the cycle, then try to place the ore in front.
pub(crate) fn frame(mine: &mut OreMine, pos: TilePos, rotation: Rotation, world: &mut World) {
    if mine.recipe.is_none() {
        let ore = world.grid().tile(pos).and_then(|t| t.ore.first_available());
        if let Some(ore) = ore {
            let recipe = world.recipes().mining_for(ore);
            mine.cooldown = cycle_time(recipe.time);
            mine.recipe = Some(recipe);
        }
    }

    if let Some(recipe) = &mine.recipe {
        let cost = recipe.power_cost;
        mine.burner.refuel(&mut mine.inventory, cost, world.config().fuel_energy);
        let progress = mine.burner.available_progress(cost);
        if mine.cooldown < progress {
            mine.cooldown = Fixed64::ZERO;
        } else {
            mine.cooldown -= progress;
            mine.burner.spend(progress, cost);
        }
    }

    output(mine, pos, pos.step(rotation), world);
}

/// Place one unit of ore on `dest`. Succeeds only once the cycle has
/// finished and fuel covers the next unit of progress.
pub(crate) fn output(mine: &mut OreMine, pos: TilePos, dest: TilePos, world: &mut World) -> bool {
    if !mine.ready() {
        return false;
    }
    let (Some(ore), Some(time)) = (mine.ore(), mine.recipe.as_ref().map(|r| r.time)) else {
        return false;
    };
    let stock = world.grid().tile(pos).map_or(0, |t| t.ore.get(ore));
    if stock == 0 {
        mine.recipe = None;
        return false;
    }
    if !world.new_object(dest, ore.item()) {
        return false;
    }
    mine.cooldown = cycle_time(time);
    if let Some(tile) = world.grid_mut().tile_mut(pos) {
        *tile.ore.get_mut(ore) -= 1;
    }
    true
}
