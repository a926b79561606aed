//! The factory state machine shared by furnaces, assemblers and boilers,
//! plus the burner and electric energy buffers that gate it.
//!
//! A factory is Idle until every recipe input is present, consumes them in
//! one step and becomes Processing with `cooldown = recipe.time`. Each tick
//! it makes up to one unit of progress, scaled down by available fuel energy
//! and by an optional per-structure constraint. Once the remaining cooldown
//! is below the tick's progress, outputs are added and it returns to Idle.

use crate::fixed::{Fixed64, checked_div_64};
use crate::id::ItemType;
use crate::item::{Container, Inventory};
use crate::recipe::Recipe;

// ---------------------------------------------------------------------------
// Energy buffers
// ---------------------------------------------------------------------------

/// Fuel energy buffer of a burner structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Burner {
    pub power: Fixed64,
    /// Power right after the most recent refuel. Only a gauge reference.
    pub max_power: Fixed64,
}

impl Burner {
    /// Burn one fuel unit from `inventory` if the buffer cannot pay for one
    /// unit of progress at `cost`.
    pub fn refuel(&mut self, inventory: &mut Inventory, cost: Fixed64, fuel_energy: Fixed64) -> bool {
        if self.power >= cost || inventory.remove(ItemType::CoalOre, 1) == 0 {
            return false;
        }
        self.power += fuel_energy;
        self.max_power = self.power;
        true
    }

    /// Progress the buffer can pay for this tick, at most one unit.
    pub fn available_progress(&self, cost: Fixed64) -> Fixed64 {
        if cost <= Fixed64::ZERO {
            return Fixed64::ONE;
        }
        checked_div_64(self.power, cost)
            .unwrap_or(Fixed64::ONE)
            .clamp(Fixed64::ZERO, Fixed64::ONE)
    }

    /// Pay for `progress` units at `cost`.
    pub fn spend(&mut self, progress: Fixed64, cost: Fixed64) {
        self.power = (self.power - progress * cost).max(Fixed64::ZERO);
    }
}

/// Electricity buffer charged by nearby steam engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElectricBuffer {
    pub electricity: Fixed64,
    pub max_electricity: Fixed64,
}

impl ElectricBuffer {
    pub fn new(max_electricity: Fixed64) -> Self {
        Self {
            electricity: Fixed64::ZERO,
            max_electricity,
        }
    }

    pub fn free_capacity(&self) -> Fixed64 {
        (self.max_electricity - self.electricity).max(Fixed64::ZERO)
    }

    /// Accept up to `offered`; returns the amount taken.
    pub fn charge(&mut self, offered: Fixed64) -> Fixed64 {
        let taken = offered.min(self.free_capacity()).max(Fixed64::ZERO);
        self.electricity += taken;
        taken
    }

    /// Limit `progress` to what the buffer holds (a full buffer pays for one
    /// unit) and drain the matching share.
    pub fn draw(&mut self, progress: Fixed64) -> Fixed64 {
        if self.max_electricity <= Fixed64::ZERO {
            return Fixed64::ZERO;
        }
        let affordable = checked_div_64(self.electricity, self.max_electricity).unwrap_or(Fixed64::ZERO);
        let progress = progress.min(affordable).max(Fixed64::ZERO);
        self.electricity = (self.electricity - progress * self.max_electricity).max(Fixed64::ZERO);
        progress
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// What a factory did during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryTick {
    /// No recipe, or inputs missing.
    Idle,
    /// Inputs consumed, processing began.
    Started,
    /// Cooldown advanced.
    Progressed,
    /// A cycle finished and outputs were added.
    Completed,
    /// Processing but no progress was possible (no energy, no room).
    Stalled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factory {
    pub inventory: Inventory,
    pub recipe: Option<Recipe>,
    /// Progress still needed to finish the current cycle.
    pub cooldown: Fixed64,
    pub processing: bool,
    /// Present on fuel-burning factories.
    pub burner: Option<Burner>,
}

impl Factory {
    pub fn new(capacity: u32, burns_fuel: bool) -> Self {
        Self {
            inventory: Inventory::new(capacity),
            recipe: None,
            cooldown: Fixed64::ZERO,
            processing: false,
            burner: burns_fuel.then(Burner::default),
        }
    }

    /// Replace the recipe, abandoning any cycle in progress.
    pub fn set_recipe(&mut self, recipe: Option<Recipe>) {
        self.recipe = recipe;
        self.cooldown = Fixed64::ZERO;
        self.processing = false;
    }

    /// Advance one tick. `constraint` may lower the progress computed from
    /// fuel energy and pay for it from structure-specific resources; it is
    /// only called while processing.
    pub fn tick(&mut self, fuel_energy: Fixed64, constraint: impl FnOnce(Fixed64) -> Fixed64) -> FactoryTick {
        let Some(recipe) = &self.recipe else {
            return FactoryTick::Idle;
        };
        let cost = recipe.power_cost;

        if let Some(burner) = &mut self.burner
            && cost > Fixed64::ZERO
        {
            burner.refuel(&mut self.inventory, cost, fuel_energy);
        }

        if !self.processing {
            if self.inventory.remove_all(&recipe.inputs) {
                self.processing = true;
                self.cooldown = recipe.duration();
                return FactoryTick::Started;
            }
            return FactoryTick::Idle;
        }

        // Finishing needs room for every output.
        if self.cooldown < Fixed64::ONE {
            let produced = recipe.outputs.values().fold(0u32, |total, &count| total.saturating_add(count));
            if produced > self.inventory.free_space() {
                return FactoryTick::Stalled;
            }
        }

        let fuel_progress = match &self.burner {
            Some(burner) => burner.available_progress(cost),
            None => Fixed64::ONE,
        };
        let progress = constraint(fuel_progress);

        if self.cooldown < progress {
            for (&item, &count) in &recipe.outputs {
                let _ = self.inventory.add(item, count);
            }
            self.processing = false;
            self.cooldown = Fixed64::ZERO;
            FactoryTick::Completed
        } else if progress > Fixed64::ZERO {
            self.cooldown -= progress;
            if let Some(burner) = &mut self.burner {
                burner.spend(progress, cost);
            }
            FactoryTick::Progressed
        } else {
            FactoryTick::Stalled
        }
    }

    /// Whether `item` would be accepted by [`Factory::input`].
    pub fn accepts(&self, item: ItemType) -> bool {
        if self.inventory.free_space() == 0 {
            return false;
        }
        if self.burner.is_some() && item.is_fuel() && !self.inventory.contains(item) {
            return true;
        }
        match &self.recipe {
            Some(recipe) => recipe.consumes(item) && self.cooldown == Fixed64::ZERO,
            None => false,
        }
    }

    /// Take one unit of `item` if it is fuel this burner lacks, or an
    /// ingredient of the current recipe while not cooling down.
    pub fn input(&mut self, item: ItemType) -> bool {
        self.accepts(item) && self.inventory.add(item, 1) == 1
    }

    /// Held items that are neither ingredients nor needed fuel, in catalog
    /// order.
    pub fn output_candidates(&self) -> impl Iterator<Item = ItemType> + '_ {
        self.inventory.iter().map(|(item, _)| item).filter(|&item| {
            let ingredient = self.recipe.as_ref().is_some_and(|r| r.consumes(item));
            let fuel = self.burner.is_some() && item.is_fuel();
            !ingredient && !fuel
        })
    }

    pub fn output_candidate(&self) -> Option<ItemType> {
        self.output_candidates().next()
    }

    /// Fraction of the current cycle completed, for display.
    pub fn progress_ratio(&self) -> Fixed64 {
        match &self.recipe {
            Some(recipe) if recipe.time > 0 && self.processing => {
                let time = recipe.duration();
                (time - self.cooldown) / time
            }
            _ => Fixed64::ZERO,
        }
    }
}

impl Container for Factory {
    fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }
}
