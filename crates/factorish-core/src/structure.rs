//! The closed set of structure kinds and the capabilities each exposes.
//!
//! Structures are one tagged variant type. Capabilities (inventory, fluid
//! boxes, electricity, item motion) are exposed through accessors that
//! return `None` or an empty slice for kinds lacking them, so callers match
//! on capabilities instead of kinds wherever they can.

use crate::config::SimConfig;
use crate::drop_item::DropItem;
use crate::factory::{ElectricBuffer, Factory};
use crate::fixed::Fixed64;
use crate::fluid::FluidBox;
use crate::grid::{Rotation, TilePos};
use crate::id::{ItemType, StructureKind};
use crate::inserter::Inserter;
use crate::item::Inventory;
use crate::mining::OreMine;
use crate::power::SteamEngine;
use crate::production::{self, Assembler, Boiler};
use crate::recipe::{Recipe, RecipeBook};
use crate::transport::{self, Motion, MotionContext, Splitter};

/// Per-kind state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureState {
    TransportBelt,
    Splitter(Splitter),
    Inserter(Inserter),
    Chest(Inventory),
    OreMine(OreMine),
    Furnace(Factory),
    Assembler(Assembler),
    WaterWell(FluidBox),
    Boiler(Boiler),
    Pipe(FluidBox),
    SteamEngine(SteamEngine),
}

/// A built machine anchored on one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    pub rotation: Rotation,
    pub state: StructureState,
}

impl Structure {
    /// A freshly built structure of `kind`.
    pub fn new(kind: StructureKind, rotation: Rotation, config: &SimConfig) -> Self {
        let fluid_box = || FluidBox::new(config.fluid_box_capacity);
        let state = match kind {
            StructureKind::TransportBelt => StructureState::TransportBelt,
            StructureKind::Splitter => StructureState::Splitter(Splitter::default()),
            StructureKind::Inserter => StructureState::Inserter(Inserter::default()),
            StructureKind::Chest => StructureState::Chest(Inventory::new(config.chest_capacity)),
            StructureKind::OreMine => StructureState::OreMine(OreMine::new()),
            StructureKind::Furnace => StructureState::Furnace(Factory::new(config.chest_capacity, true)),
            StructureKind::Assembler => StructureState::Assembler(Assembler::new(config)),
            StructureKind::WaterWell => StructureState::WaterWell(fluid_box()),
            StructureKind::Boiler => StructureState::Boiler(Boiler::new(config)),
            StructureKind::Pipe => StructureState::Pipe(fluid_box()),
            StructureKind::SteamEngine => StructureState::SteamEngine(SteamEngine::new(config)),
        };
        Self { rotation, state }
    }

    pub fn kind(&self) -> StructureKind {
        match &self.state {
            StructureState::TransportBelt => StructureKind::TransportBelt,
            StructureState::Splitter(_) => StructureKind::Splitter,
            StructureState::Inserter(_) => StructureKind::Inserter,
            StructureState::Chest(_) => StructureKind::Chest,
            StructureState::OreMine(_) => StructureKind::OreMine,
            StructureState::Furnace(_) => StructureKind::Furnace,
            StructureState::Assembler(_) => StructureKind::Assembler,
            StructureState::WaterWell(_) => StructureKind::WaterWell,
            StructureState::Boiler(_) => StructureKind::Boiler,
            StructureState::Pipe(_) => StructureKind::Pipe,
            StructureState::SteamEngine(_) => StructureKind::SteamEngine,
        }
    }

    /// Whether floating items may rest on this structure.
    pub fn movable(&self) -> bool {
        matches!(self.state, StructureState::TransportBelt | StructureState::Splitter(_))
    }

    /// Width and height in tiles.
    pub fn footprint(&self) -> (u32, u32) {
        Self::footprint_of(self.kind(), self.rotation)
    }

    pub fn footprint_of(kind: StructureKind, rotation: Rotation) -> (u32, u32) {
        match kind {
            // Lanes are stacked across the transport axis.
            StructureKind::Splitter if rotation.is_horizontal() => (1, 2),
            StructureKind::Splitter => (2, 1),
            _ => (1, 1),
        }
    }

    /// Turn the structure. Splitters turn around instead so their footprint
    /// keeps its shape.
    pub fn rotate(&mut self) {
        self.rotation = match self.state {
            StructureState::Splitter(_) => self.rotation.opposite(),
            _ => self.rotation.next(),
        };
    }

    // -----------------------------------------------------------------------
    // Capabilities
    // -----------------------------------------------------------------------

    pub fn inventory(&self) -> Option<&Inventory> {
        match &self.state {
            StructureState::Chest(inv) => Some(inv),
            StructureState::OreMine(mine) => Some(&mine.inventory),
            StructureState::Furnace(f) => Some(&f.inventory),
            StructureState::Assembler(a) => Some(&a.factory.inventory),
            StructureState::Boiler(b) => Some(&b.factory.inventory),
            _ => None,
        }
    }

    pub fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        match &mut self.state {
            StructureState::Chest(inv) => Some(inv),
            StructureState::OreMine(mine) => Some(&mut mine.inventory),
            StructureState::Furnace(f) => Some(&mut f.inventory),
            StructureState::Assembler(a) => Some(&mut a.factory.inventory),
            StructureState::Boiler(b) => Some(&mut b.factory.inventory),
            _ => None,
        }
    }

    pub fn factory(&self) -> Option<&Factory> {
        match &self.state {
            StructureState::Furnace(f) => Some(f),
            StructureState::Assembler(a) => Some(&a.factory),
            StructureState::Boiler(b) => Some(&b.factory),
            _ => None,
        }
    }

    pub fn factory_mut(&mut self) -> Option<&mut Factory> {
        match &mut self.state {
            StructureState::Furnace(f) => Some(f),
            StructureState::Assembler(a) => Some(&mut a.factory),
            StructureState::Boiler(b) => Some(&mut b.factory),
            _ => None,
        }
    }

    /// Recipe currently loaded, for display.
    pub fn recipe(&self) -> Option<&Recipe> {
        match &self.state {
            StructureState::OreMine(mine) => mine.recipe.as_ref(),
            _ => self.factory().and_then(|f| f.recipe.as_ref()),
        }
    }

    pub fn fluid_boxes(&self) -> &[FluidBox] {
        match &self.state {
            StructureState::WaterWell(b) | StructureState::Pipe(b) => std::slice::from_ref(b),
            StructureState::Boiler(boiler) => &boiler.boxes,
            StructureState::SteamEngine(engine) => std::slice::from_ref(&engine.fluid),
            _ => &[],
        }
    }

    pub fn fluid_boxes_mut(&mut self) -> &mut [FluidBox] {
        match &mut self.state {
            StructureState::WaterWell(b) | StructureState::Pipe(b) => std::slice::from_mut(b),
            StructureState::Boiler(boiler) => &mut boiler.boxes,
            StructureState::SteamEngine(engine) => std::slice::from_mut(&mut engine.fluid),
            _ => &mut [],
        }
    }

    /// Electricity buffer of structures powered by steam engines.
    pub fn electricity(&self) -> Option<&ElectricBuffer> {
        match &self.state {
            StructureState::Assembler(a) => Some(&a.power),
            _ => None,
        }
    }

    pub fn electricity_mut(&mut self) -> Option<&mut ElectricBuffer> {
        match &mut self.state {
            StructureState::Assembler(a) => Some(&mut a.power),
            _ => None,
        }
    }

    /// Burner energy gauge `(power, max_power)`, for display.
    pub fn power_gauge(&self) -> Option<(Fixed64, Fixed64)> {
        match &self.state {
            StructureState::OreMine(mine) => Some((mine.burner.power, mine.burner.max_power)),
            StructureState::SteamEngine(engine) => Some((engine.power, engine.max_power)),
            _ => self
                .factory()
                .and_then(|f| f.burner)
                .map(|burner| (burner.power, burner.max_power)),
        }
    }

    // -----------------------------------------------------------------------
    // Item exchange
    // -----------------------------------------------------------------------

    /// Offer one unit of `item`. Returns whether it was taken.
    pub fn input(&mut self, item: ItemType, recipes: &RecipeBook) -> bool {
        match &mut self.state {
            StructureState::Chest(inv) => inv.add(item, 1) == 1,
            StructureState::OreMine(mine) => mine.input(item),
            StructureState::Furnace(f) => production::furnace_input(f, item, recipes),
            StructureState::Assembler(a) => a.factory.input(item),
            StructureState::Boiler(b) => b.factory.input(item),
            StructureState::TransportBelt
            | StructureState::Splitter(_)
            | StructureState::Inserter(_)
            | StructureState::WaterWell(_)
            | StructureState::Pipe(_)
            | StructureState::SteamEngine(_) => false,
        }
    }

    /// Items this structure would hand out through `output`, in the order
    /// they are tried.
    pub fn output_candidates(&self) -> Vec<ItemType> {
        if let StructureState::Chest(inv) = &self.state {
            return inv.first_item().into_iter().collect();
        }
        self.factory()
            .map(|f| f.output_candidates().collect())
            .unwrap_or_default()
    }

    /// Motion of a floating item on this structure's footprint.
    pub(crate) fn object_response(&self, anchor: TilePos, item: &DropItem, ctx: &MotionContext<'_>) -> Motion {
        match &self.state {
            StructureState::TransportBelt => Motion {
                destination: transport::belt_motion(self.rotation, item, ctx),
                toggle_lane: false,
            },
            StructureState::Splitter(splitter) => {
                transport::splitter_motion(splitter, self.rotation, anchor, item, ctx)
            }
            _ => Motion::default(),
        }
    }
}
