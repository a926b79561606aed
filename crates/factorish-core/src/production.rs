//! Per-kind frames of the factory structures: furnaces, assemblers and
//! boilers.
//!
//! All three run the shared [`Factory`] state machine. They differ in how a
//! recipe is chosen and in the secondary constraint applied to each tick's
//! progress.

use crate::config::SimConfig;
use crate::factory::{ElectricBuffer, Factory, FactoryTick};
use crate::fixed::{Fixed64, checked_div_64};
use crate::fluid::{self, FluidBox};
use crate::grid::{Grid, Rotation, TilePos};
use crate::id::{FluidType, ItemType};
use crate::recipe::{Recipe, RecipeBook};

/// Boilers only ever hold one unit of fuel.
pub const BOILER_CAPACITY: u32 = 1;

// ---------------------------------------------------------------------------
// Furnace
// ---------------------------------------------------------------------------

/// Offer `item` to a furnace. Ore switches the smelting recipe unless a
/// cycle is already running.
pub(crate) fn furnace_input(furnace: &mut Factory, item: ItemType, recipes: &RecipeBook) -> bool {
    if !furnace.processing
        && let Some(recipe) = recipes.smelting_for(item)
        && furnace.recipe.as_ref() != Some(recipe)
    {
        furnace.recipe = Some(recipe.clone());
    }
    furnace.input(item)
}

pub(crate) fn furnace_frame(furnace: &mut Factory, config: &SimConfig) -> FactoryTick {
    // An idle recipe whose ingredients ran out is forgotten so the next ore
    // fed in can pick its own.
    let stale = !furnace.processing
        && furnace
            .recipe
            .as_ref()
            .is_some_and(|r| r.inputs.keys().any(|&item| !furnace.inventory.contains(item)));
    if stale {
        furnace.recipe = None;
    }
    furnace.tick(config.fuel_energy, |progress| progress)
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// An electric factory running a player-selected recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembler {
    pub factory: Factory,
    pub power: ElectricBuffer,
}

impl Assembler {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            factory: Factory::new(config.chest_capacity, false),
            power: ElectricBuffer::new(config.assembler_max_electricity),
        }
    }

    /// Switch to `recipe`, abandoning the cycle in progress. Ingredients
    /// already consumed are not refunded.
    pub fn select_recipe(&mut self, recipe: Recipe) {
        self.factory.set_recipe(Some(recipe));
    }
}

pub(crate) fn assembler_frame(assembler: &mut Assembler, config: &SimConfig) -> FactoryTick {
    let power = &mut assembler.power;
    assembler
        .factory
        .tick(config.fuel_energy, |progress| power.draw(progress))
}

// ---------------------------------------------------------------------------
// Boiler
// ---------------------------------------------------------------------------

/// Index of the water inlet box.
pub const BOILER_WATER: usize = 0;
/// Index of the steam outlet box.
pub const BOILER_STEAM: usize = 1;

/// A burner that turns water from its inlet box into steam in its outlet
/// box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boiler {
    pub factory: Factory,
    pub boxes: [FluidBox; 2],
}

impl Boiler {
    pub fn new(config: &SimConfig) -> Self {
        let capacity = config.fluid_box_capacity;
        Self {
            factory: Factory::new(BOILER_CAPACITY, true),
            boxes: [
                FluidBox::new(capacity)
                    .with_valves(true, false)
                    .with_filter(FluidType::Water),
                FluidBox::new(capacity).with_valves(false, true),
            ],
        }
    }
}

pub(crate) fn boiler_frame(
    boiler: &mut Boiler,
    pos: TilePos,
    rotation: Rotation,
    grid: &mut Grid,
    config: &SimConfig,
    recipes: &RecipeBook,
) -> FactoryTick {
    if boiler.factory.recipe.as_ref() != Some(&recipes.boiling) {
        boiler.factory.recipe = Some(recipes.boiling.clone());
    }
    fluid::diffuse(&mut boiler.boxes, pos, rotation, grid, config.diffusion_rate);

    let per_progress = config.boiler_fluid_per_progress;
    let [water, steam] = &mut boiler.boxes;
    boiler.factory.tick(config.fuel_energy, |progress| {
        let by_room = checked_div_64(steam.free_capacity(), per_progress).unwrap_or(Fixed64::ZERO);
        let by_water = checked_div_64(water.amount, per_progress).unwrap_or(Fixed64::ZERO);
        let progress = progress.min(by_room).min(by_water).max(Fixed64::ZERO);
        let converted = progress * per_progress;
        water.amount = (water.amount - converted).max(Fixed64::ZERO);
        steam.fluid = Some(FluidType::Steam);
        steam.amount = (steam.amount + converted).min(steam.max_amount);
        progress
    })
}
