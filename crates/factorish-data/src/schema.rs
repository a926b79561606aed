//! Serde data file structs for simulation rules.
//!
//! These structs define the on-disk format of the tunable constants and the
//! recipe catalog. Every field is optional: whatever a file leaves out keeps
//! the stock value. Items are referred to by display name (`"Iron Plate"`)
//! and resolved by the loader.

use serde::Deserialize;

// ===========================================================================
// Config
// ===========================================================================

/// Overrides for `SimConfig`. Fractional values are plain numbers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigData {
    pub inserter_cooldown: Option<u32>,
    pub fuel_energy: Option<f64>,
    pub diffusion_rate: Option<f64>,
    pub well_pump_rate: Option<f64>,
    pub item_hit_radius: Option<f64>,
    pub power_radius: Option<i32>,
    pub steam_engine_max_power: Option<f64>,
    pub steam_per_tick: Option<f64>,
    pub power_per_steam: Option<f64>,
    pub assembler_max_electricity: Option<f64>,
    pub boiler_fluid_per_progress: Option<f64>,
    pub fluid_box_capacity: Option<f64>,
    pub chest_capacity: Option<u32>,
    pub player_capacity: Option<u32>,
}

// ===========================================================================
// Recipes
// ===========================================================================

/// An item amount, either as a `("Iron Plate", 2)` pair or spelled out.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ItemAmountData {
    Short(String, u32),
    Full { item: String, count: u32 },
}

impl ItemAmountData {
    pub fn item(&self) -> &str {
        match self {
            ItemAmountData::Short(item, _) | ItemAmountData::Full { item, .. } => item,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            ItemAmountData::Short(_, count) | ItemAmountData::Full { count, .. } => *count,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecipeData {
    pub inputs: Vec<ItemAmountData>,
    pub outputs: Vec<ItemAmountData>,
    pub time: u32,
    pub power_cost: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MiningData {
    pub time: Option<u32>,
    pub power_cost: Option<f64>,
}

/// Overrides for `RecipeBook`. A list given here replaces the stock list
/// entirely; an absent list keeps it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecipeBookData {
    pub smelting: Option<Vec<RecipeData>>,
    pub assembly: Option<Vec<RecipeData>>,
    pub mining: Option<MiningData>,
    pub boiling: Option<RecipeData>,
}
