use crate::fixed::Fixed64;
use crate::grid::TilePos;
use crate::id::{DropItemId, ItemType};
use serde::{Deserialize, Serialize};

/// An item resting on the ground (or riding a belt), outside any inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropItem {
    pub id: DropItemId,
    pub item: ItemType,
    /// World-space position in units of `TILE_SIZE` per tile.
    pub x: i32,
    pub y: i32,
}

impl DropItem {
    /// The tile whose area contains this item.
    pub fn tile(&self) -> TilePos {
        TilePos::containing(self.x, self.y)
    }

    /// Whether an item at `(x, y)` would overlap this one.
    pub fn overlaps(&self, x: i32, y: i32, radius: Fixed64) -> bool {
        within(self.x, self.y, x, y, radius)
    }
}

/// Axis-aligned box test shared by all item collision checks.
pub(crate) fn within(ax: i32, ay: i32, bx: i32, by: i32, radius: Fixed64) -> bool {
    let dx = Fixed64::from_num((ax - bx).unsigned_abs());
    let dy = Fixed64::from_num((ay - by).unsigned_abs());
    dx < radius && dy < radius
}
