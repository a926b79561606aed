//! The world aggregate: grid, floating items, player and tick loop.
//!
//! One tick runs two passes:
//!
//! 1. **Items.** Every floating item resolves the structure covering its
//!    tile and asks it for a move. Moves are computed against the positions
//!    committed by the previous tick and committed together at the end of
//!    the pass.
//! 2. **Structures.** Every tile is visited in raster order and its
//!    structure runs one frame. Frames take effect immediately, so later
//!    tiles see what earlier tiles did this tick.
//!
//! Because items move strictly before any structure runs, an item a belt
//! delivers this tick can only be picked up on the next one.

use crate::config::SimConfig;
use crate::drop_item::DropItem;
use crate::event::{InventoryEvents, InventoryListener, InventoryOwner};
use crate::fixed::Ticks;
use crate::fluid;
use crate::grid::{Grid, Rotation, TilePos};
use crate::id::{DropItemId, FluidType, ItemType, StructureKind};
use crate::inserter;
use crate::item::Inventory;
use crate::mining;
use crate::player::Player;
use crate::power;
use crate::production;
use crate::recipe::RecipeBook;
use crate::sim::{AdvanceResult, SimState, SimulationStrategy, StateHash};
use crate::structure::{Structure, StructureState};
use crate::transport::MotionContext;
use crate::worldgen::OreGenerator;

#[derive(Debug)]
pub struct World {
    pub(crate) grid: Grid,
    pub(crate) items: Vec<DropItem>,
    pub(crate) next_item_id: u64,
    pub(crate) sim: SimState,
    pub(crate) player: Player,
    pub(crate) config: SimConfig,
    pub(crate) recipes: RecipeBook,
    pub(crate) events: InventoryEvents,
}

impl World {
    /// An empty `size × size` world with stock rules and a starter kit.
    pub fn new(size: u32) -> Self {
        Self::with_rules(size, SimConfig::default(), RecipeBook::default())
    }

    pub fn with_rules(size: u32, config: SimConfig, recipes: RecipeBook) -> Self {
        tracing::info!(size, "creating world");
        Self {
            grid: Grid::new(size),
            items: Vec::new(),
            next_item_id: 0,
            sim: SimState::new(),
            player: Player::with_starter_kit(config.player_capacity),
            config,
            recipes,
            events: InventoryEvents::default(),
        }
    }

    /// A world whose tiles are endowed with ore by `generator`.
    pub fn generate(size: u32, generator: &impl OreGenerator, config: SimConfig, recipes: RecipeBook) -> Self {
        let mut world = Self::with_rules(size, config, recipes);
        for pos in world.grid.positions() {
            let stock = generator.ore_at(pos);
            if let Some(tile) = world.grid.tile_mut(pos) {
                tile.ore = stock;
            }
        }
        world
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn items(&self) -> &[DropItem] {
        &self.items
    }

    /// Floating items whose position lies on `tile`.
    pub fn items_on(&self, tile: TilePos) -> impl Iterator<Item = &DropItem> + '_ {
        self.items.iter().filter(move |item| item.tile() == tile)
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    pub fn tick_count(&self) -> Ticks {
        self.sim.tick
    }

    pub fn set_strategy(&mut self, strategy: SimulationStrategy) {
        self.sim.strategy = strategy;
        self.sim.accumulator = 0;
    }

    /// Register a listener for inventory changes. Notifications are
    /// delivered after every tick and every command.
    pub fn on_inventory_changed(&mut self, listener: InventoryListener) {
        self.events.subscribe(listener);
    }

    /// Fluid neighbor mask of the tile at `pos`, one bit per [`Rotation`]
    /// index.
    pub fn connection(&self, pos: TilePos) -> u8 {
        fluid::connection_mask(&self.grid, pos)
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Put a fresh structure on the grid without touching the player's
    /// inventory. Fails if the footprint is out of bounds or occupied.
    pub fn place(&mut self, pos: TilePos, kind: StructureKind, rotation: Rotation) -> bool {
        let footprint = Structure::footprint_of(kind, rotation);
        if !self.grid.footprint_free(pos, footprint, None) {
            return false;
        }
        let structure = Structure::new(kind, rotation, &self.config);
        match self.grid.tile_mut(pos) {
            Some(tile) => {
                tile.structure = Some(structure);
                true
            }
            None => false,
        }
    }

    /// Drop `item` on `tile` the way a structure output would.
    pub fn drop_item(&mut self, tile: TilePos, item: ItemType) -> bool {
        self.new_object(tile, item)
    }

    /// Drop `item` at a world-space point, unless another item is in the way.
    pub fn drop_item_at(&mut self, x: i32, y: i32, item: ItemType) -> bool {
        if !self.grid.contains(TilePos::containing(x, y)) || self.hit_check(x, y) {
            return false;
        }
        self.items.push(DropItem {
            id: DropItemId(self.next_item_id),
            item,
            x,
            y,
        });
        self.next_item_id += 1;
        true
    }

    fn hit_check(&self, x: i32, y: i32) -> bool {
        let radius = self.config.item_hit_radius;
        self.items.iter().any(|other| other.overlaps(x, y, radius))
    }

    // -----------------------------------------------------------------------
    // Item exchange between structures
    // -----------------------------------------------------------------------

    /// Run `f` on the structure anchored at `pos` with the structure taken
    /// out of the grid, so `f` may freely borrow the rest of the world.
    /// A changed inventory is queued for notification.
    pub(crate) fn with_structure<R>(
        &mut self,
        pos: TilePos,
        f: impl FnOnce(&mut Structure, &mut World) -> R,
    ) -> Option<R> {
        let mut structure = self.grid.tile_mut(pos)?.structure.take()?;
        let before = structure.inventory().map(Inventory::revision);
        let result = f(&mut structure, self);
        if structure.inventory().map(Inventory::revision) != before {
            self.events.mark(InventoryOwner::Structure(pos));
        }
        if let Some(tile) = self.grid.tile_mut(pos) {
            tile.structure = Some(structure);
        }
        Some(result)
    }

    /// Offer one unit of `item` to the structure anchored at `anchor`.
    pub fn structure_input(&mut self, anchor: TilePos, item: ItemType) -> bool {
        self.with_structure(anchor, |structure, world| structure.input(item, &world.recipes))
            .unwrap_or(false)
    }

    /// Place one unit of `item` on `dest`. A non-movable structure there
    /// receives it as input; otherwise it is dropped at the tile center
    /// unless another item is in the way.
    pub fn new_object(&mut self, dest: TilePos, item: ItemType) -> bool {
        if !self.grid.contains(dest) {
            return false;
        }
        if let Some(anchor) = self.grid.find_structure(dest)
            && self.grid.structure(anchor).is_some_and(|s| !s.movable())
        {
            return self.structure_input(anchor, item);
        }
        let (x, y) = dest.center();
        self.drop_item_at(x, y, item)
    }

    /// Ask the structure covering `source` to output one item onto `dest`.
    pub fn output_at(&mut self, source: TilePos, dest: TilePos) -> bool {
        let Some(anchor) = self.grid.find_structure(source) else {
            return false;
        };
        self.with_structure(anchor, |structure, world| world.output_from(anchor, structure, dest))
            .unwrap_or(false)
    }

    fn output_from(&mut self, anchor: TilePos, structure: &mut Structure, dest: TilePos) -> bool {
        if let StructureState::OreMine(mine) = &mut structure.state {
            return mining::output(mine, anchor, dest, self);
        }
        for item in structure.output_candidates() {
            if self.new_object(dest, item) {
                if let Some(inventory) = structure.inventory_mut() {
                    let removed = inventory.remove(item, 1);
                    debug_assert_eq!(removed, 1, "output candidate {item} not held");
                }
                return true;
            }
        }
        false
    }

    /// Move the first floating item on `source` that the structure covering
    /// `dest` accepts into that structure.
    pub(crate) fn pick_up_into(&mut self, source: TilePos, dest: TilePos) -> bool {
        let Some(anchor) = self.grid.find_structure(dest) else {
            return false;
        };
        for index in 0..self.items.len() {
            let candidate = self.items[index];
            if candidate.tile() != source {
                continue;
            }
            if self.structure_input(anchor, candidate.item) {
                self.items.remove(index);
                return true;
            }
        }
        false
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance the world by one tick.
    pub fn tick(&mut self) {
        let moved = self.move_items();
        self.run_structures();
        self.sim.tick += 1;
        tracing::trace!(tick = self.sim.tick, moved, items = self.items.len(), "tick");
        self.flush_events();
    }

    /// Advance by `elapsed` time units according to the simulation strategy.
    pub fn advance(&mut self, elapsed: Ticks) -> AdvanceResult {
        let steps = self.sim.steps_for(elapsed);
        for _ in 0..steps {
            self.tick();
        }
        AdvanceResult { steps_run: steps }
    }

    /// Item pass. Returns the number of items that moved.
    fn move_items(&mut self) -> usize {
        let hit_radius = self.config.item_hit_radius;
        let mut moved: Vec<Option<(i32, i32)>> = vec![None; self.items.len()];

        for index in 0..self.items.len() {
            let item = self.items[index];
            let Some(anchor) = self.grid.find_structure(item.tile()) else {
                continue;
            };
            let Some(structure) = self.grid.structure(anchor) else {
                continue;
            };
            let ctx = MotionContext {
                grid: &self.grid,
                items: &self.items,
                moved: &moved,
                index,
                hit_radius,
            };
            let motion = structure.object_response(anchor, &item, &ctx);

            if motion.toggle_lane
                && let Some(Structure {
                    state: StructureState::Splitter(splitter),
                    ..
                }) = self.grid.structure_mut(anchor)
            {
                splitter.toggle();
            }
            moved[index] = motion.destination;
        }

        let mut count = 0;
        for (item, destination) in self.items.iter_mut().zip(moved) {
            if let Some((x, y)) = destination
                && (x, y) != (item.x, item.y)
            {
                item.x = x;
                item.y = y;
                count += 1;
            }
        }
        count
    }

    /// Structure pass, in raster order.
    fn run_structures(&mut self) {
        for pos in self.grid.positions() {
            self.with_structure(pos, |structure, world| world.frame(pos, structure));
        }
    }

    fn frame(&mut self, pos: TilePos, structure: &mut Structure) {
        let rotation = structure.rotation;
        let rate = self.config.diffusion_rate;
        match &mut structure.state {
            StructureState::TransportBelt | StructureState::Splitter(_) | StructureState::Chest(_) => {}
            StructureState::Inserter(ins) => inserter::frame(ins, pos, rotation, self),
            StructureState::OreMine(mine) => mining::frame(mine, pos, rotation, self),
            StructureState::Furnace(furnace) => {
                production::furnace_frame(furnace, &self.config);
            }
            StructureState::Assembler(assembler) => {
                production::assembler_frame(assembler, &self.config);
            }
            StructureState::WaterWell(well) => {
                well.fill(FluidType::Water, self.config.well_pump_rate);
                fluid::diffuse(std::slice::from_mut(well), pos, rotation, &mut self.grid, rate);
            }
            StructureState::Boiler(boiler) => {
                production::boiler_frame(boiler, pos, rotation, &mut self.grid, &self.config, &self.recipes);
            }
            StructureState::Pipe(pipe) => {
                fluid::diffuse(std::slice::from_mut(pipe), pos, rotation, &mut self.grid, rate);
            }
            StructureState::SteamEngine(engine) => {
                power::steam_engine_frame(engine, pos, rotation, &mut self.grid, &self.config);
            }
        }
    }

    /// Deliver queued inventory notifications.
    pub(crate) fn flush_events(&mut self) {
        if !self.events.has_pending() {
            return;
        }
        let grid = &self.grid;
        let player = &self.player;
        self.events.deliver(|owner| match owner {
            InventoryOwner::Player => Some(&player.inventory),
            InventoryOwner::Structure(pos) => grid.structure(pos).and_then(|s| s.inventory()),
        });
    }

    // -----------------------------------------------------------------------
    // State hash
    // -----------------------------------------------------------------------

    /// Hash of every piece of state that influences future ticks.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHash::new();
        h.write_u64(self.sim.tick);
        h.write_u32(self.grid.size());
        for tile in self.grid.tiles() {
            h.write_u32(tile.ore.iron);
            h.write_u32(tile.ore.copper);
            h.write_u32(tile.ore.coal);
            match &tile.structure {
                Some(structure) => hash_structure(&mut h, structure),
                None => h.write_u32(u32::MAX),
            }
        }
        h.write_u64(self.next_item_id);
        for item in &self.items {
            h.write_u64(item.id.0);
            h.write_u32(item.item.index());
            h.write_i32(item.x);
            h.write_i32(item.y);
        }
        hash_inventory(&mut h, &self.player.inventory);
        h.finish()
    }
}

fn hash_inventory(h: &mut StateHash, inventory: &Inventory) {
    h.write_u32(inventory.capacity());
    for (item, count) in inventory.iter() {
        h.write_u32(item.index());
        h.write_u32(count);
    }
}

fn hash_structure(h: &mut StateHash, structure: &Structure) {
    h.write_u32(structure.kind() as u32);
    h.write_u32(structure.rotation.index());
    if let Some(inventory) = structure.inventory() {
        hash_inventory(h, inventory);
    }
    for fluid_box in structure.fluid_boxes() {
        h.write_u32(fluid_box.fluid.map_or(0, |f| f as u32 + 1));
        h.write_fixed64(fluid_box.amount);
    }
    if let Some(factory) = structure.factory() {
        h.write_fixed64(factory.cooldown);
        h.write_bool(factory.processing);
    }
    if let Some(recipe) = structure.recipe() {
        for (item, count) in recipe.inputs.iter().chain(&recipe.outputs) {
            h.write_u32(item.index());
            h.write_u32(*count);
        }
    }
    if let Some((power, max_power)) = structure.power_gauge() {
        h.write_fixed64(power);
        h.write_fixed64(max_power);
    }
    if let Some(buffer) = structure.electricity() {
        h.write_fixed64(buffer.electricity);
    }
    match &structure.state {
        StructureState::Splitter(splitter) => h.write(&[splitter.lane]),
        StructureState::Inserter(inserter) => h.write_u32(inserter.cooldown),
        StructureState::OreMine(mine) => h.write_fixed64(mine.cooldown),
        _ => {}
    }
}
