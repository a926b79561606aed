//! Save games and binary snapshots.
//!
//! [`WorldSave`] is the flat, name-keyed save model: every structure carries
//! a string `type` tag, inventories and recipes are keyed by item display
//! name, and fractional values are plain numbers. Every field defaults when
//! missing so hand-edited or older saves still load. An unknown structure
//! tag degrades to an empty tile instead of failing the load.
//!
//! The JSON form is the save game. The binary form wraps the same model,
//! together with the rules and tick bookkeeping, in a versioned `bitcode`
//! envelope used for snapshots and replays.

use crate::config::SimConfig;
use crate::drop_item::DropItem;
use crate::event::InventoryEvents;
use crate::fixed::{Fixed64, f64_to_fixed64_saturating, f64_to_u32_saturating, fixed64_to_f64};
use crate::fluid::FluidBox;
use crate::grid::{Grid, MAX_WORLD_SIZE, OreStock, Rotation, TilePos};
use crate::id::{DropItemId, FluidType, ItemType, StructureKind};
use crate::item::Inventory;
use crate::player::Player;
use crate::recipe::{MAX_RECIPE_TIME, Recipe, RecipeBook};
use crate::sim::SimState;
use crate::structure::{Structure, StructureState};
use crate::world::World;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a binary world snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0xFAC7_1501;

/// Current binary format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("JSON encoding failed: {0}")]
    Json(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("data too short for snapshot header")]
    TooShort,
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("JSON decoding failed: {0}")]
    Json(String),
    #[error("world size {0} exceeds the maximum of {MAX_WORLD_SIZE}")]
    WorldTooLarge(u32),
    #[error("save lists {actual} tiles, more than a {size}x{size} world holds")]
    TooManyTiles { size: u32, actual: usize },
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Header prepended to every binary snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Tick count at the time the snapshot was taken.
    pub tick: u64,
}

impl SnapshotHeader {
    pub fn new(tick: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// Binary envelope: the save model plus everything a save game leaves to
/// the host (rules and tick bookkeeping).
#[derive(Debug, Serialize, Deserialize)]
struct WorldSnapshot {
    header: SnapshotHeader,
    world: WorldSave,
    sim: SimState,
    config: SimConfig,
    recipes: RecipeBook,
}

// ---------------------------------------------------------------------------
// Save model
// ---------------------------------------------------------------------------

/// Item display name to count.
pub type InventorySave = BTreeMap<String, u32>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldSave {
    pub sim_tick: u64,
    pub size: u32,
    /// Row-major, `size × size` entries.
    pub tiles: Vec<TileSave>,
    pub items: Vec<ItemSave>,
    pub next_item_id: u64,
    pub player: InventorySave,
}

impl WorldSave {
    /// Reject saves whose dimensions cannot describe a world. Missing tiles
    /// are fine and restore as empty ground.
    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.size > MAX_WORLD_SIZE {
            return Err(DeserializeError::WorldTooLarge(self.size));
        }
        let capacity = self.size as usize * self.size as usize;
        if self.tiles.len() > capacity {
            return Err(DeserializeError::TooManyTiles {
                size: self.size,
                actual: self.tiles.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TileSave {
    pub iron_ore: u32,
    pub copper_ore: u32,
    pub coal_ore: u32,
    pub structure: Option<StructureSave>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StructureSave {
    #[serde(rename = "type")]
    pub kind: String,
    pub rotation: u32,
    pub inventory: InventorySave,
    pub recipe: Option<RecipeSave>,
    pub cooldown: f64,
    pub processing: bool,
    pub power: f64,
    pub max_power: f64,
    pub electricity: f64,
    pub max_electricity: Option<f64>,
    /// Active splitter lane.
    pub lane: u8,
    pub fluid_box: Vec<FluidBoxSave>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeSave {
    pub input: InventorySave,
    pub output: InventorySave,
    pub time: u32,
    pub power_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FluidBoxSave {
    /// Fluid name, empty when the box never held anything.
    #[serde(rename = "type")]
    pub fluid: String,
    pub amount: f64,
    pub max_amount: Option<f64>,
    pub input_enable: bool,
    pub output_enable: bool,
    /// Connected directions as rotation indices.
    pub connect_to: Vec<u32>,
    pub filter: String,
}

impl Default for FluidBoxSave {
    fn default() -> Self {
        Self {
            fluid: String::new(),
            amount: 0.0,
            max_amount: None,
            input_enable: true,
            output_enable: true,
            connect_to: vec![0, 1, 2, 3],
            filter: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemSave {
    pub id: u64,
    #[serde(rename = "type")]
    pub item: String,
    pub x: i32,
    pub y: i32,
}

// ---------------------------------------------------------------------------
// World -> save
// ---------------------------------------------------------------------------

fn inventory_save(inventory: &Inventory) -> InventorySave {
    inventory.iter().map(|(item, count)| (item.name().to_string(), count)).collect()
}

fn counts_save(counts: &BTreeMap<ItemType, u32>) -> InventorySave {
    counts.iter().map(|(item, &count)| (item.name().to_string(), count)).collect()
}

fn recipe_save(recipe: &Recipe) -> RecipeSave {
    RecipeSave {
        input: counts_save(&recipe.inputs),
        output: counts_save(&recipe.outputs),
        time: recipe.time,
        power_cost: fixed64_to_f64(recipe.power_cost),
    }
}

fn fluid_box_save(fluid_box: &FluidBox) -> FluidBoxSave {
    FluidBoxSave {
        fluid: fluid_box.fluid.map(|f| f.name().to_string()).unwrap_or_default(),
        amount: fixed64_to_f64(fluid_box.amount),
        max_amount: Some(fixed64_to_f64(fluid_box.max_amount)),
        input_enable: fluid_box.input_enable,
        output_enable: fluid_box.output_enable,
        connect_to: Rotation::ALL
            .into_iter()
            .filter(|r| fluid_box.connect_to & r.bit() != 0)
            .map(Rotation::index)
            .collect(),
        filter: fluid_box.filter.map(|f| f.name().to_string()).unwrap_or_default(),
    }
}

fn structure_save(structure: &Structure) -> StructureSave {
    let mut save = StructureSave {
        kind: structure.kind().name().to_string(),
        rotation: structure.rotation.index(),
        inventory: structure.inventory().map(inventory_save).unwrap_or_default(),
        recipe: structure.recipe().map(recipe_save),
        fluid_box: structure.fluid_boxes().iter().map(fluid_box_save).collect(),
        ..StructureSave::default()
    };
    if let Some(factory) = structure.factory() {
        save.cooldown = fixed64_to_f64(factory.cooldown);
        save.processing = factory.processing;
    }
    if let Some((power, max_power)) = structure.power_gauge() {
        save.power = fixed64_to_f64(power);
        save.max_power = fixed64_to_f64(max_power);
    }
    if let Some(buffer) = structure.electricity() {
        save.electricity = fixed64_to_f64(buffer.electricity);
        save.max_electricity = Some(fixed64_to_f64(buffer.max_electricity));
    }
    match &structure.state {
        StructureState::Splitter(splitter) => save.lane = splitter.lane,
        StructureState::Inserter(inserter) => save.cooldown = f64::from(inserter.cooldown),
        StructureState::OreMine(mine) => save.cooldown = fixed64_to_f64(mine.cooldown),
        _ => {}
    }
    save
}

impl World {
    /// The save-game form of this world.
    pub fn snapshot(&self) -> WorldSave {
        let tiles = self
            .grid
            .tiles()
            .iter()
            .map(|tile| TileSave {
                iron_ore: tile.ore.iron,
                copper_ore: tile.ore.copper,
                coal_ore: tile.ore.coal,
                structure: tile.structure.as_ref().map(structure_save),
            })
            .collect();
        let items = self
            .items
            .iter()
            .map(|item| ItemSave {
                id: item.id.0,
                item: item.item.name().to_string(),
                x: item.x,
                y: item.y,
            })
            .collect();
        WorldSave {
            sim_tick: self.sim.tick,
            size: self.grid.size(),
            tiles,
            items,
            next_item_id: self.next_item_id,
            player: inventory_save(&self.player.inventory),
        }
    }

    pub fn to_json(&self) -> Result<String, SerializeError> {
        serde_json::to_string(&self.snapshot()).map_err(|e| SerializeError::Json(e.to_string()))
    }

    /// Versioned binary snapshot including rules and tick bookkeeping.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        let snapshot = WorldSnapshot {
            header: SnapshotHeader::new(self.sim.tick),
            world: self.snapshot(),
            sim: self.sim.clone(),
            config: self.config.clone(),
            recipes: self.recipes.clone(),
        };
        bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Save -> world
// ---------------------------------------------------------------------------

fn parse_item(name: &str) -> Option<ItemType> {
    let item = ItemType::from_name(name);
    if item.is_none() {
        tracing::warn!(name, "unknown item in save, dropped");
    }
    item
}

fn parse_fluid(name: &str) -> Option<FluidType> {
    if name.is_empty() {
        return None;
    }
    let fluid = FluidType::from_name(name);
    if fluid.is_none() {
        tracing::warn!(name, "unknown fluid in save, treated as empty");
    }
    fluid
}

fn counts_from_save(save: &InventorySave) -> BTreeMap<ItemType, u32> {
    save.iter()
        .filter_map(|(name, &count)| parse_item(name).map(|item| (item, count)))
        .filter(|&(_, count)| count > 0)
        .collect()
}

/// Refill `inventory` from a save. Counts past the inventory's capacity are
/// dropped.
fn restore_inventory(inventory: &mut Inventory, save: &InventorySave) {
    for (item, count) in counts_from_save(save) {
        let kept = inventory.add(item, count);
        if kept < count {
            tracing::warn!(%item, count, kept, "saved inventory over capacity, excess dropped");
        }
    }
}

fn recipe_from_save(save: &RecipeSave) -> Recipe {
    Recipe {
        inputs: counts_from_save(&save.input),
        outputs: counts_from_save(&save.output),
        time: save.time.min(MAX_RECIPE_TIME),
        power_cost: f64_to_fixed64_saturating(save.power_cost),
    }
}

fn restore_fluid_box(fluid_box: &mut FluidBox, save: &FluidBoxSave) {
    fluid_box.fluid = parse_fluid(&save.fluid);
    if let Some(max) = save.max_amount {
        fluid_box.max_amount = f64_to_fixed64_saturating(max).max(Fixed64::ZERO);
    }
    fluid_box.amount = f64_to_fixed64_saturating(save.amount).clamp(Fixed64::ZERO, fluid_box.max_amount);
    fluid_box.input_enable = save.input_enable;
    fluid_box.output_enable = save.output_enable;
    fluid_box.connect_to = save
        .connect_to
        .iter()
        .fold(0, |mask, &index| mask | Rotation::from_index(index).bit());
    fluid_box.filter = parse_fluid(&save.filter);
}

/// Rebuild a structure, or `None` when its tag names no known kind.
fn structure_from_save(save: &StructureSave, config: &SimConfig) -> Option<Structure> {
    let Some(kind) = StructureKind::from_name(&save.kind) else {
        tracing::warn!(tag = %save.kind, "unknown structure type in save, tile left empty");
        return None;
    };
    let mut structure = Structure::new(kind, Rotation::from_index(save.rotation), config);
    let cooldown = f64_to_fixed64_saturating(save.cooldown).max(Fixed64::ZERO);
    let power = f64_to_fixed64_saturating(save.power).max(Fixed64::ZERO);
    let max_power = f64_to_fixed64_saturating(save.max_power).max(Fixed64::ZERO);

    if let Some(inventory) = structure.inventory_mut() {
        restore_inventory(inventory, &save.inventory);
    }
    for (fluid_box, fluid_save) in structure.fluid_boxes_mut().iter_mut().zip(&save.fluid_box) {
        restore_fluid_box(fluid_box, fluid_save);
    }
    if let Some(buffer) = structure.electricity_mut() {
        if let Some(max) = save.max_electricity {
            buffer.max_electricity = f64_to_fixed64_saturating(max).max(Fixed64::ZERO);
        }
        buffer.electricity = f64_to_fixed64_saturating(save.electricity).clamp(Fixed64::ZERO, buffer.max_electricity);
    }
    if let Some(factory) = structure.factory_mut() {
        factory.recipe = save.recipe.as_ref().map(recipe_from_save);
        factory.cooldown = cooldown;
        factory.processing = save.processing;
        if let Some(burner) = &mut factory.burner {
            burner.power = power;
            burner.max_power = max_power;
        }
    }
    match &mut structure.state {
        StructureState::Splitter(splitter) => splitter.lane = save.lane % 2,
        StructureState::Inserter(inserter) => inserter.cooldown = f64_to_u32_saturating(save.cooldown),
        StructureState::OreMine(mine) => {
            mine.recipe = save.recipe.as_ref().map(recipe_from_save);
            mine.cooldown = cooldown;
            mine.burner.power = power;
            mine.burner.max_power = max_power;
        }
        StructureState::SteamEngine(engine) => {
            engine.power = power;
            if save.max_power > 0.0 {
                engine.max_power = max_power;
            }
        }
        _ => {}
    }
    Some(structure)
}

impl World {
    /// Rebuild a world from its save form with stock rules.
    pub fn restore(save: &WorldSave) -> Self {
        Self::restore_with_rules(save, SimConfig::default(), RecipeBook::default())
    }

    /// Rebuild a world from its save form. Missing tiles are empty; tiles
    /// past `size × size` are ignored and the size is capped at
    /// [`MAX_WORLD_SIZE`]. Use [`WorldSave::validate`] first to reject such
    /// saves instead.
    pub fn restore_with_rules(save: &WorldSave, config: SimConfig, recipes: RecipeBook) -> Self {
        let mut grid = Grid::new(save.size.min(MAX_WORLD_SIZE));
        let positions: Vec<TilePos> = grid.positions().collect();
        for (pos, tile_save) in positions.into_iter().zip(&save.tiles) {
            let structure = tile_save
                .structure
                .as_ref()
                .and_then(|s| structure_from_save(s, &config));
            if let Some(tile) = grid.tile_mut(pos) {
                tile.ore = OreStock {
                    iron: tile_save.iron_ore,
                    copper: tile_save.copper_ore,
                    coal: tile_save.coal_ore,
                };
                tile.structure = structure;
            }
        }

        let items: Vec<DropItem> = save
            .items
            .iter()
            .filter_map(|item| {
                parse_item(&item.item).map(|kind| DropItem {
                    id: DropItemId(item.id),
                    item: kind,
                    x: item.x,
                    y: item.y,
                })
            })
            .collect();
        let next_item_id = items
            .iter()
            .map(|item| item.id.0 + 1)
            .max()
            .unwrap_or(0)
            .max(save.next_item_id);

        let mut player = Player::new(config.player_capacity);
        restore_inventory(&mut player.inventory, &save.player);

        tracing::info!(size = save.size, tick = save.sim_tick, items = items.len(), "restored world");
        World {
            grid,
            items,
            next_item_id,
            sim: SimState {
                tick: save.sim_tick,
                ..SimState::default()
            },
            player,
            config,
            recipes,
            events: InventoryEvents::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DeserializeError> {
        let save: WorldSave = serde_json::from_str(json).map_err(|e| DeserializeError::Json(e.to_string()))?;
        save.validate()?;
        Ok(Self::restore(&save))
    }

    /// Decode a binary snapshot. Listeners are not part of the snapshot and
    /// must be registered again.
    pub fn deserialize(data: &[u8]) -> Result<Self, DeserializeError> {
        if data.is_empty() {
            return Err(DeserializeError::TooShort);
        }
        let snapshot: WorldSnapshot =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        snapshot.world.validate()?;
        let mut world = Self::restore_with_rules(&snapshot.world, snapshot.config, snapshot.recipes);
        world.sim = snapshot.sim;
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::OreKind;

    fn busy_world() -> World {
        let mut world = World::new(6);
        *world.grid_mut().tile_mut(TilePos::new(0, 0)).unwrap().ore.get_mut(OreKind::Iron) = 50;
        world.place(TilePos::new(0, 0), StructureKind::OreMine, Rotation::Right);
        world.place(TilePos::new(1, 0), StructureKind::TransportBelt, Rotation::Right);
        world.place(TilePos::new(2, 0), StructureKind::TransportBelt, Rotation::Right);
        world.place(TilePos::new(3, 0), StructureKind::Inserter, Rotation::Right);
        world.place(TilePos::new(4, 0), StructureKind::Furnace, Rotation::Left);
        world.place(TilePos::new(0, 2), StructureKind::WaterWell, Rotation::Left);
        world.place(TilePos::new(1, 2), StructureKind::Boiler, Rotation::Left);
        world.place(TilePos::new(2, 2), StructureKind::SteamEngine, Rotation::Left);
        world.place(TilePos::new(3, 2), StructureKind::Assembler, Rotation::Left);
        world.place(TilePos::new(0, 4), StructureKind::Splitter, Rotation::Right);
        assert!(world.structure_input(TilePos::new(0, 0), ItemType::CoalOre));
        assert!(world.structure_input(TilePos::new(4, 0), ItemType::CoalOre));
        assert!(world.structure_input(TilePos::new(1, 2), ItemType::CoalOre));
        for _ in 0..120 {
            world.tick();
        }
        world
    }

    #[test]
    fn json_round_trip_preserves_future() {
        let mut original = busy_world();
        let json = original.to_json().unwrap();
        let mut restored = World::from_json(&json).unwrap();
        assert_eq!(restored.state_hash(), original.state_hash());
        for _ in 0..60 {
            original.tick();
            restored.tick();
        }
        assert_eq!(restored.state_hash(), original.state_hash());
    }

    #[test]
    fn binary_round_trip_preserves_future() {
        let mut original = busy_world();
        let bytes = original.serialize().unwrap();
        let mut restored = World::deserialize(&bytes).unwrap();
        assert_eq!(restored.state_hash(), original.state_hash());
        for _ in 0..60 {
            original.tick();
            restored.tick();
        }
        assert_eq!(restored.state_hash(), original.state_hash());
    }

    #[test]
    fn unknown_structure_tag_leaves_tile_empty() {
        let json = r#"{
            "size": 2,
            "tiles": [
                {"ironOre": 7, "structure": {"type": "Teleporter"}},
                {"structure": {"type": "Chest", "inventory": {"Gear": 3, "Unobtainium": 1}}}
            ]
        }"#;
        let world = World::from_json(json).unwrap();
        let first = world.grid().tile(TilePos::new(0, 0)).unwrap();
        assert!(first.structure.is_none());
        assert_eq!(first.ore.iron, 7);
        let chest = world.grid().structure(TilePos::new(1, 0)).unwrap();
        assert_eq!(chest.inventory().unwrap().count(ItemType::Gear), 3);
        assert!(world.grid().tile(TilePos::new(1, 1)).unwrap().structure.is_none());
    }

    #[test]
    fn missing_fields_default() {
        let world = World::from_json("{}").unwrap();
        assert_eq!(world.grid().size(), 0);
        assert_eq!(world.tick_count(), 0);
        assert!(world.player().inventory.is_empty());

        let json = r#"{"size": 1, "tiles": [{"structure": {"type": "Pipe", "fluidBox": [{"type": "Water", "amount": 2.5}]}}]}"#;
        let world = World::from_json(json).unwrap();
        let pipe = world.grid().structure(TilePos::new(0, 0)).unwrap();
        let fluid_box = &pipe.fluid_boxes()[0];
        assert_eq!(fluid_box.fluid, Some(FluidType::Water));
        assert_eq!(fluid_box.amount, Fixed64::from_num(2.5));
        assert_eq!(fluid_box.max_amount, Fixed64::from_num(10));
        assert!(fluid_box.input_enable && fluid_box.output_enable);
    }

    #[test]
    fn next_item_id_never_reuses() {
        let json = r#"{"size": 2, "items": [{"id": 41, "type": "Gear", "x": 4, "y": 4}]}"#;
        let mut world = World::from_json(json).unwrap();
        assert!(world.drop_item_at(40, 40, ItemType::Gear));
        assert_eq!(world.items()[1].id, DropItemId(42));
    }

    #[test]
    fn header_validation() {
        assert!(SnapshotHeader::new(0).validate().is_ok());
        let bad_magic = SnapshotHeader {
            magic: 0xDEAD_BEEF,
            ..SnapshotHeader::new(0)
        };
        assert!(matches!(bad_magic.validate(), Err(DeserializeError::InvalidMagic(0xDEAD_BEEF))));
        let future = SnapshotHeader {
            version: FORMAT_VERSION + 1,
            ..SnapshotHeader::new(0)
        };
        assert!(matches!(future.validate(), Err(DeserializeError::FutureVersion(_))));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(matches!(World::deserialize(&[]), Err(DeserializeError::TooShort)));
        assert!(World::deserialize(&[1, 2, 3]).is_err());
    }

    #[test]
    fn oversized_world_is_rejected() {
        assert!(matches!(
            World::from_json(r#"{"size": 4000000000}"#),
            Err(DeserializeError::WorldTooLarge(4_000_000_000))
        ));
        let json = r#"{"size": 1, "tiles": [{}, {}]}"#;
        assert!(matches!(
            World::from_json(json),
            Err(DeserializeError::TooManyTiles { size: 1, actual: 2 })
        ));
        let save = WorldSave {
            size: MAX_WORLD_SIZE,
            ..WorldSave::default()
        };
        assert!(save.validate().is_ok());
    }

    #[test]
    fn over_capacity_inventory_is_truncated() {
        let json = r#"{
            "size": 2,
            "tiles": [{"structure": {"type": "Chest", "inventory": {"Iron Plate": 4000000000}}}],
            "player": {"Gear": 4000000000, "Chest": 4000000000}
        }"#;
        let mut world = World::from_json(json).unwrap();
        let inventory = &world.player().inventory;
        assert_eq!(inventory.volume(), inventory.capacity());
        assert_eq!(inventory.free_space(), 0);
        // Catalog order: gears are restored before chests.
        assert_eq!(inventory.count(ItemType::Gear), 500);
        assert_eq!(inventory.count(ItemType::Chest), 0);
        assert_eq!(
            world.grid().structure(TilePos::new(0, 0)).and_then(|s| s.inventory()).map(|i| i.volume()),
            Some(100)
        );

        assert_eq!(
            world.apply(crate::command::Command::Harvest { pos: TilePos::new(0, 0) }),
            Err(crate::command::CommandError::InventoryFull)
        );
        world.tick();
        assert_eq!(world.player().inventory.count(ItemType::Gear), 500);
    }

    #[test]
    fn saved_recipe_time_is_capped() {
        let json = r#"{"size": 1, "tiles": [{"structure": {
            "type": "Furnace",
            "inventory": {"Coal Ore": 1},
            "recipe": {"input": {"Iron Ore": 1}, "output": {"Iron Plate": 1}, "time": 4294967295},
            "processing": true,
            "cooldown": 1e30
        }}]}"#;
        let mut world = World::from_json(json).unwrap();
        for _ in 0..3 {
            world.tick();
        }
        let factory = world.grid().structure(TilePos::new(0, 0)).and_then(|s| s.factory()).unwrap();
        assert_eq!(factory.recipe.as_ref().map(|r| r.time), Some(MAX_RECIPE_TIME));
        assert!(factory.processing);
    }

    #[test]
    fn saved_inserter_cooldown_saturates() {
        let json = r#"{"size": 1, "tiles": [{"structure": {"type": "Inserter", "cooldown": -4.5}}]}"#;
        let world = World::from_json(json).unwrap();
        let snapshot = world.snapshot();
        assert_eq!(snapshot.tiles[0].structure.as_ref().map(|s| s.cooldown), Some(0.0));
    }
}
