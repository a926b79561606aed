//! Recipes and the catalog of recipes each factory kind can run.

use crate::fixed::{Fixed64, ratio};
use crate::grid::OreKind;
use crate::id::ItemType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest cycle a recipe may take. The integer part of `Fixed64` tops out
/// at `i32::MAX`.
pub const MAX_RECIPE_TIME: u32 = i32::MAX as u32;

/// `time` as progress units, capped at [`MAX_RECIPE_TIME`].
pub fn cycle_time(time: u32) -> Fixed64 {
    Fixed64::from_num(time.min(MAX_RECIPE_TIME))
}

/// An input/output/time/power specification run by factory structures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub inputs: BTreeMap<ItemType, u32>,
    pub outputs: BTreeMap<ItemType, u32>,
    /// Units of progress needed to finish one cycle.
    pub time: u32,
    /// Energy a burner spends per unit of progress. Zero means ungated.
    pub power_cost: Fixed64,
}

impl Recipe {
    pub fn new(time: u32) -> Self {
        Self {
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            time,
            power_cost: Fixed64::ZERO,
        }
    }

    pub fn input(mut self, item: ItemType, count: u32) -> Self {
        self.inputs.insert(item, count);
        self
    }

    pub fn output(mut self, item: ItemType, count: u32) -> Self {
        self.outputs.insert(item, count);
        self
    }

    pub fn power_cost(mut self, cost: Fixed64) -> Self {
        self.power_cost = cost;
        self
    }

    pub fn duration(&self) -> Fixed64 {
        cycle_time(self.time)
    }

    pub fn consumes(&self, item: ItemType) -> bool {
        self.inputs.contains_key(&item)
    }
}

/// Time and energy of an ore mine cycle. The output follows the ore under
/// the mine, so it is not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningRecipe {
    pub time: u32,
    pub power_cost: Fixed64,
}

/// Every recipe the structures can run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeBook {
    /// Furnace recipes, chosen by the ore fed in.
    pub smelting: Vec<Recipe>,
    /// Assembler recipes, chosen by the player.
    pub assembly: Vec<Recipe>,
    pub mining: MiningRecipe,
    /// The boiler's fixed cycle. It has no item inputs or outputs; its
    /// progress converts water into steam.
    pub boiling: Recipe,
}

impl RecipeBook {
    /// First smelting recipe that consumes `item`.
    pub fn smelting_for(&self, item: ItemType) -> Option<&Recipe> {
        self.smelting.iter().find(|r| r.consumes(item))
    }

    pub fn assembly(&self, index: usize) -> Option<&Recipe> {
        self.assembly.get(index)
    }

    /// Mining recipe yielding one unit of `ore`.
    pub fn mining_for(&self, ore: OreKind) -> Recipe {
        Recipe::new(self.mining.time)
            .output(ore.item(), 1)
            .power_cost(self.mining.power_cost)
    }
}

impl Default for RecipeBook {
    fn default() -> Self {
        use ItemType::*;

        let smelt_cost = ratio(1, 2);
        let smelting = vec![
            Recipe::new(20).input(IronOre, 1).output(IronPlate, 1).power_cost(smelt_cost),
            Recipe::new(20).input(CopperOre, 1).output(CopperPlate, 1).power_cost(smelt_cost),
        ];

        let assembly = vec![
            Recipe::new(20).input(IronPlate, 1).output(Gear, 1),
            Recipe::new(20).input(IronPlate, 1).input(Gear, 1).output(TransportBelt, 1),
            Recipe::new(40).input(TransportBelt, 2).input(Gear, 2).output(Splitter, 1),
            Recipe::new(30).input(IronPlate, 5).output(SteelPlate, 1),
            Recipe::new(60).input(IronPlate, 5).output(Chest, 1),
            Recipe::new(100).input(IronPlate, 1).input(Gear, 1).input(Circuit, 1).output(Inserter, 1),
            Recipe::new(100).input(IronPlate, 10).input(Gear, 5).input(Circuit, 3).output(OreMine, 1),
            Recipe::new(20).input(CopperPlate, 1).output(CopperWire, 2),
            Recipe::new(20).input(IronPlate, 1).input(CopperWire, 3).output(Circuit, 1),
            Recipe::new(120).input(IronPlate, 5).input(Gear, 5).input(Circuit, 3).output(Assembler, 1),
            Recipe::new(20).input(IronPlate, 2).output(Pipe, 1),
            Recipe::new(20).input(IronPlate, 5).input(CopperPlate, 5).output(Boiler, 1),
            Recipe::new(20).input(IronPlate, 5).input(Gear, 5).input(CopperPlate, 5).output(SteamEngine, 1),
        ];

        Self {
            smelting,
            assembly,
            mining: MiningRecipe {
                time: 80,
                power_cost: ratio(1, 10),
            },
            boiling: Recipe::new(20).power_cost(ratio(1, 10)),
        }
    }
}
