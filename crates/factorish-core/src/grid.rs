//! The tile store: a square array of tiles, each with an ore endowment and
//! at most one anchored structure.

use crate::id::ItemType;
use crate::structure::Structure;
use serde::{Deserialize, Serialize};

/// Side length of one tile in world units.
pub const TILE_SIZE: i32 = 32;

/// Largest world side accepted from saves and rule files.
pub const MAX_WORLD_SIZE: u32 = 512;

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

/// One of the four cardinal directions. The discriminant is the rotation
/// index used by saves and fluid-port bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Left = 0,
    Top = 1,
    Right = 2,
    Bottom = 3,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::Left, Rotation::Top, Rotation::Right, Rotation::Bottom];

    /// Rotation for an arbitrary index, wrapping modulo 4.
    pub fn from_index(index: u32) -> Rotation {
        Self::ALL[(index % 4) as usize]
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    /// Unit vector in tile coordinates (y grows downwards).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Rotation::Left => (-1, 0),
            Rotation::Top => (0, -1),
            Rotation::Right => (1, 0),
            Rotation::Bottom => (0, 1),
        }
    }

    /// Quarter turn clockwise.
    pub fn next(self) -> Rotation {
        Self::from_index(self.index() + 1)
    }

    pub fn opposite(self) -> Rotation {
        Self::from_index(self.index() + 2)
    }

    /// Compose a structure-local direction with the owner's rotation.
    pub fn rotated_by(self, by: Rotation) -> Rotation {
        Self::from_index(self.index() + by.index())
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Rotation::Left | Rotation::Right)
    }

    /// Bit in a 4-bit neighbor mask.
    pub fn bit(self) -> u8 {
        1 << self.index()
    }
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// Integer tile coordinates. May lie outside the grid; lookups check bounds.
///
/// Ordered in raster order (row first), matching the structure pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl Ord for TilePos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for TilePos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> TilePos {
        TilePos::new(self.x + dx, self.y + dy)
    }

    pub fn step(self, direction: Rotation) -> TilePos {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Tile containing a world-space point.
    pub fn containing(x: i32, y: i32) -> TilePos {
        TilePos::new(x.div_euclid(TILE_SIZE), y.div_euclid(TILE_SIZE))
    }

    /// World-space center of the tile.
    pub fn center(self) -> (i32, i32) {
        (self.x * TILE_SIZE + TILE_SIZE / 2, self.y * TILE_SIZE + TILE_SIZE / 2)
    }
}

// ---------------------------------------------------------------------------
// Ore
// ---------------------------------------------------------------------------

/// Ore channels, declared in mining priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OreKind {
    Iron,
    Copper,
    Coal,
}

impl OreKind {
    /// Priority order an ore mine uses when several ores are present.
    pub const PRIORITY: [OreKind; 3] = [OreKind::Iron, OreKind::Copper, OreKind::Coal];

    pub fn item(self) -> ItemType {
        match self {
            OreKind::Iron => ItemType::IronOre,
            OreKind::Copper => ItemType::CopperOre,
            OreKind::Coal => ItemType::CoalOre,
        }
    }

    pub fn from_item(item: ItemType) -> Option<OreKind> {
        Self::PRIORITY.into_iter().find(|kind| kind.item() == item)
    }
}

/// Remaining ore under one tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OreStock {
    pub iron: u32,
    pub copper: u32,
    pub coal: u32,
}

impl OreStock {
    pub fn get(&self, kind: OreKind) -> u32 {
        match kind {
            OreKind::Iron => self.iron,
            OreKind::Copper => self.copper,
            OreKind::Coal => self.coal,
        }
    }

    pub fn get_mut(&mut self, kind: OreKind) -> &mut u32 {
        match kind {
            OreKind::Iron => &mut self.iron,
            OreKind::Copper => &mut self.copper,
            OreKind::Coal => &mut self.coal,
        }
    }

    /// Highest-priority ore with stock left.
    pub fn first_available(&self) -> Option<OreKind> {
        OreKind::PRIORITY.into_iter().find(|&kind| self.get(kind) > 0)
    }

    pub fn is_empty(&self) -> bool {
        self.first_available().is_none()
    }
}

// ---------------------------------------------------------------------------
// Tiles and grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Tile {
    pub ore: OreStock,
    /// Structure anchored on this tile. Multi-cell structures are owned by
    /// their top-left tile only.
    pub structure: Option<Structure>,
}

#[derive(Debug, Clone)]
pub struct Grid {
    size: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// An empty `size × size` grid without ore.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            tiles: vec![Tile::default(); (size as usize) * (size as usize)],
        }
    }

    /// Tiles per side.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// World-space extent of either axis.
    pub fn extent(&self) -> i32 {
        self.size as i32 * TILE_SIZE
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.size && (pos.y as u32) < self.size
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.size as usize + pos.x as usize)
    }

    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, pos: TilePos) -> Option<&mut Tile> {
        self.index(pos).map(|i| &mut self.tiles[i])
    }

    /// Structure anchored exactly on `pos`.
    pub fn structure(&self, pos: TilePos) -> Option<&Structure> {
        self.tile(pos).and_then(|t| t.structure.as_ref())
    }

    pub fn structure_mut(&mut self, pos: TilePos) -> Option<&mut Structure> {
        self.tile_mut(pos).and_then(|t| t.structure.as_mut())
    }

    /// Anchor of the structure whose footprint covers `pos`, if any.
    ///
    /// Footprints are at most 2×2, so only the tile itself and its up/left
    /// neighbors can own it.
    pub fn find_structure(&self, pos: TilePos) -> Option<TilePos> {
        for dx in [-1, 0] {
            for dy in [-1, 0] {
                let anchor = pos.offset(dx, dy);
                let Some(structure) = self.structure(anchor) else {
                    continue;
                };
                let (w, h) = structure.footprint();
                if -dx < w as i32 && -dy < h as i32 {
                    return Some(anchor);
                }
            }
        }
        None
    }

    /// Whether a floating item may occupy the world-space point `(x, y)`.
    pub fn movable_at(&self, x: i32, y: i32) -> bool {
        self.find_structure(TilePos::containing(x, y))
            .and_then(|anchor| self.structure(anchor))
            .is_some_and(|s| s.movable())
    }

    /// Whether every cell of a `w × h` footprint anchored at `pos` is in
    /// bounds and free, ignoring a structure anchored at `ignore`.
    pub fn footprint_free(&self, pos: TilePos, (w, h): (u32, u32), ignore: Option<TilePos>) -> bool {
        (0..w as i32).all(|dx| {
            (0..h as i32).all(|dy| {
                let cell = pos.offset(dx, dy);
                self.contains(cell)
                    && self.find_structure(cell).is_none_or(|anchor| Some(anchor) == ignore)
            })
        })
    }

    /// Every tile position in raster order (rows top to bottom).
    pub fn positions(&self) -> impl Iterator<Item = TilePos> + use<> {
        let size = self.size as i32;
        (0..size).flat_map(move |y| (0..size).map(move |x| TilePos::new(x, y)))
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}
