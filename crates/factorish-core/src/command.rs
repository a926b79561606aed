//! Player commands and the queue that holds them until the next tick
//! boundary.
//!
//! Commands run synchronously between ticks. Each either succeeds or
//! returns a [`CommandError`] and leaves the world untouched.

use crate::event::InventoryOwner;
use crate::grid::{Rotation, TilePos};
use crate::id::{ItemType, StructureKind};
use crate::item::Inventory;
use crate::structure::{Structure, StructureState};
use crate::world::World;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Place a structure from the player's inventory. Building over the same
    /// kind only changes its rotation.
    Build {
        pos: TilePos,
        kind: StructureKind,
        rotation: Rotation,
    },
    /// Pick up the structure covering `pos` with its contents, or the
    /// floating items on that tile when there is none.
    Harvest { pos: TilePos },
    Rotate { pos: TilePos },
    /// Select an assembler recipe by catalog index.
    SelectRecipe { pos: TilePos, recipe: usize },
    /// Move items from the player into a structure.
    GiveToStructure { pos: TilePos, item: ItemType, count: u32 },
    /// Move items from a structure into the player.
    TakeFromStructure { pos: TilePos, item: ItemType, count: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("tile {0:?} is outside the world")]
    OutOfBounds(TilePos),
    #[error("player has no {0}")]
    MissingItem(ItemType),
    #[error("footprint at {0:?} is blocked")]
    Occupied(TilePos),
    #[error("nothing to harvest at {0:?}")]
    NothingToHarvest(TilePos),
    #[error("no structure at {0:?}")]
    NoStructure(TilePos),
    #[error("{kind} at {pos:?} does not support this command")]
    WrongKind { pos: TilePos, kind: StructureKind },
    #[error("no recipe with index {0}")]
    UnknownRecipe(usize),
    #[error("inventory cannot hold the items")]
    InventoryFull,
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

impl World {
    /// Run one command now. Inventory listeners are notified before this
    /// returns.
    pub fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        let player_before = self.player.inventory.revision();
        let result = match &command {
            Command::Build { pos, kind, rotation } => self.build(*pos, *kind, *rotation),
            Command::Harvest { pos } => self.harvest(*pos),
            Command::Rotate { pos } => self.rotate(*pos),
            Command::SelectRecipe { pos, recipe } => self.select_recipe(*pos, *recipe),
            Command::GiveToStructure { pos, item, count } => self.give_to_structure(*pos, *item, *count),
            Command::TakeFromStructure { pos, item, count } => self.take_from_structure(*pos, *item, *count),
        };
        match &result {
            Ok(()) => tracing::debug!(?command, "command applied"),
            Err(error) => tracing::debug!(?command, %error, "command rejected"),
        }
        if self.player.inventory.revision() != player_before {
            self.events.mark(InventoryOwner::Player);
        }
        self.flush_events();
        result
    }

    fn in_bounds(&self, pos: TilePos) -> Result<(), CommandError> {
        if self.grid.contains(pos) {
            Ok(())
        } else {
            Err(CommandError::OutOfBounds(pos))
        }
    }

    fn anchor_of(&self, pos: TilePos) -> Result<TilePos, CommandError> {
        self.in_bounds(pos)?;
        self.grid.find_structure(pos).ok_or(CommandError::NoStructure(pos))
    }

    /// Build `kind` at `pos` from the player's inventory. The same kind
    /// already covering `pos` is only turned to `rotation`; any other
    /// occupant is harvested first.
    fn build(&mut self, pos: TilePos, kind: StructureKind, rotation: Rotation) -> Result<(), CommandError> {
        self.in_bounds(pos)?;
        let occupant = self.grid.find_structure(pos);

        if let Some(anchor) = occupant
            && self.grid.structure(anchor).is_some_and(|s| s.kind() == kind)
        {
            let footprint = Structure::footprint_of(kind, rotation);
            if !self.grid.footprint_free(anchor, footprint, Some(anchor)) {
                return Err(CommandError::Occupied(anchor));
            }
            if let Some(structure) = self.grid.structure_mut(anchor) {
                structure.rotation = rotation;
            }
            return Ok(());
        }

        let item = kind.item();
        if !self.player.inventory.contains(item) {
            return Err(CommandError::MissingItem(item));
        }
        if !self
            .grid
            .footprint_free(pos, Structure::footprint_of(kind, rotation), occupant)
        {
            return Err(CommandError::Occupied(pos));
        }
        if let Some(anchor) = occupant {
            self.harvest_structure(anchor)?;
        }
        let _ = self.player.inventory.remove(item, 1);
        self.place(pos, kind, rotation);
        Ok(())
    }

    fn harvest(&mut self, pos: TilePos) -> Result<(), CommandError> {
        self.in_bounds(pos)?;
        if let Some(anchor) = self.grid.find_structure(pos) {
            return self.harvest_structure(anchor);
        }

        let picked: Vec<usize> = (0..self.items.len()).filter(|&i| self.items[i].tile() == pos).collect();
        if picked.is_empty() {
            return Err(CommandError::NothingToHarvest(pos));
        }
        if self.player.inventory.free_space() < picked.len() as u32 {
            return Err(CommandError::InventoryFull);
        }
        for &index in picked.iter().rev() {
            let dropped = self.items.remove(index);
            let _ = self.player.inventory.add(dropped.item, 1);
        }
        Ok(())
    }

    /// Move the structure anchored at `anchor` and its contents into the
    /// player's inventory.
    fn harvest_structure(&mut self, anchor: TilePos) -> Result<(), CommandError> {
        let Some(structure) = self.grid.structure(anchor) else {
            return Err(CommandError::NoStructure(anchor));
        };
        let contents: Vec<(ItemType, u32)> = structure.inventory().map(|inv| inv.iter().collect()).unwrap_or_default();
        let needed = contents.iter().fold(1u32, |total, &(_, count)| total.saturating_add(count));
        if self.player.inventory.free_space() < needed {
            return Err(CommandError::InventoryFull);
        }
        let item = structure.kind().item();
        if let Some(tile) = self.grid.tile_mut(anchor) {
            tile.structure = None;
        }
        let _ = self.player.inventory.add(item, 1);
        for (content, count) in contents {
            let _ = self.player.inventory.add(content, count);
        }
        Ok(())
    }

    fn rotate(&mut self, pos: TilePos) -> Result<(), CommandError> {
        let anchor = self.anchor_of(pos)?;
        let Some(structure) = self.grid.structure(anchor) else {
            return Err(CommandError::NoStructure(pos));
        };
        let mut turned = structure.clone();
        turned.rotate();
        if !self.grid.footprint_free(anchor, turned.footprint(), Some(anchor)) {
            return Err(CommandError::Occupied(anchor));
        }
        if let Some(structure) = self.grid.structure_mut(anchor) {
            structure.rotation = turned.rotation;
        }
        Ok(())
    }

    fn select_recipe(&mut self, pos: TilePos, index: usize) -> Result<(), CommandError> {
        let anchor = self.anchor_of(pos)?;
        let recipe = self
            .recipes
            .assembly(index)
            .cloned()
            .ok_or(CommandError::UnknownRecipe(index))?;
        match self.grid.structure_mut(anchor) {
            Some(Structure {
                state: StructureState::Assembler(assembler),
                ..
            }) => {
                assembler.select_recipe(recipe);
                Ok(())
            }
            Some(other) => Err(CommandError::WrongKind {
                pos: anchor,
                kind: other.kind(),
            }),
            None => Err(CommandError::NoStructure(pos)),
        }
    }

    /// Offer up to `count` units one at a time, as an inserter would.
    fn give_to_structure(&mut self, pos: TilePos, item: ItemType, count: u32) -> Result<(), CommandError> {
        let anchor = self.anchor_of(pos)?;
        self.require_inventory(anchor)?;
        if !self.player.inventory.contains(item) {
            return Err(CommandError::MissingItem(item));
        }
        let mut given = 0;
        while given < count && self.player.inventory.contains(item) {
            if !self.structure_input(anchor, item) {
                break;
            }
            let _ = self.player.inventory.remove(item, 1);
            given += 1;
        }
        if given == 0 {
            return Err(CommandError::InventoryFull);
        }
        Ok(())
    }

    fn take_from_structure(&mut self, pos: TilePos, item: ItemType, count: u32) -> Result<(), CommandError> {
        let anchor = self.anchor_of(pos)?;
        let held = self.require_inventory(anchor)?.count(item);
        if held == 0 {
            return Err(CommandError::MissingItem(item));
        }
        let amount = count.min(held).min(self.player.inventory.free_space());
        if amount == 0 {
            return Err(CommandError::InventoryFull);
        }
        let taken = self
            .with_structure(anchor, |structure, _| {
                structure.inventory_mut().map_or(0, |inv| inv.remove(item, amount))
            })
            .unwrap_or(0);
        let _ = self.player.inventory.add(item, taken);
        Ok(())
    }

    fn require_inventory(&self, anchor: TilePos) -> Result<&Inventory, CommandError> {
        let structure = self.grid.structure(anchor).ok_or(CommandError::NoStructure(anchor))?;
        structure.inventory().ok_or(CommandError::WrongKind {
            pos: anchor,
            kind: structure.kind(),
        })
    }
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// Commands waiting for the next tick boundary, with optional history of
/// the ones already applied.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Vec<Command>,
    /// Applied commands with the tick they ran before.
    history: Vec<(u64, Command)>,
    /// Zero disables history.
    max_history: usize,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            max_history,
            ..Self::default()
        }
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    pub fn push_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.pending.extend(commands);
    }

    /// Take every pending command in submission order, recording them in
    /// history under `tick`.
    pub fn drain(&mut self, tick: u64) -> Vec<Command> {
        let commands: Vec<Command> = self.pending.drain(..).collect();
        if self.max_history > 0 {
            self.history.extend(commands.iter().map(|c| (tick, c.clone())));
            let excess = self.history.len().saturating_sub(self.max_history);
            self.history.drain(..excess);
        }
        commands
    }

    /// Apply every pending command to `world`, returning each outcome in
    /// submission order.
    pub fn apply_all(&mut self, world: &mut World) -> Vec<Result<(), CommandError>> {
        let tick = world.tick_count();
        self.drain(tick).into_iter().map(|c| world.apply(c)).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn history(&self) -> &[(u64, Command)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
