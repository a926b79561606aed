//! Belt and splitter motion for floating items.
//!
//! Motion is computed against a read-only view of the grid and of the item
//! positions committed at the end of the previous tick. Destinations chosen
//! earlier in the same pass are also treated as occupied so two items can
//! never be moved on top of each other.

use crate::drop_item::{DropItem, within};
use crate::fixed::Fixed64;
use crate::grid::{Grid, Rotation, TILE_SIZE, TilePos};
use serde::{Deserialize, Serialize};

const HALF_TILE: i32 = TILE_SIZE / 2;

// ---------------------------------------------------------------------------
// Splitter state
// ---------------------------------------------------------------------------

/// A two-lane belt that alternates its output lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Splitter {
    /// Lane (0 or 1, counted from the anchor tile) the next item crossing
    /// the midline is steered into.
    pub lane: u8,
}

impl Splitter {
    pub fn toggle(&mut self) {
        self.lane = (self.lane + 1) % 2;
    }
}

// ---------------------------------------------------------------------------
// Motion context
// ---------------------------------------------------------------------------

/// Everything an item-motion rule may look at.
pub(crate) struct MotionContext<'a> {
    pub grid: &'a Grid,
    /// Positions committed at the end of the previous tick.
    pub items: &'a [DropItem],
    /// Destinations already chosen this pass, parallel to `items`.
    pub moved: &'a [Option<(i32, i32)>],
    /// Index of the item being moved.
    pub index: usize,
    pub hit_radius: Fixed64,
}

impl MotionContext<'_> {
    fn collides(&self, x: i32, y: i32) -> bool {
        self.items
            .iter()
            .zip(self.moved)
            .enumerate()
            .filter(|&(j, _)| j != self.index)
            .any(|(_, (item, moved))| {
                item.overlaps(x, y, self.hit_radius)
                    || moved.is_some_and(|(mx, my)| within(mx, my, x, y, self.hit_radius))
            })
    }

    /// One unit step from `(ax, ay)`, clamped to the world, if the
    /// destination is on a movable structure and unoccupied.
    fn try_step(&self, ax: i32, ay: i32, (vx, vy): (i32, i32)) -> Option<(i32, i32)> {
        let extent = self.grid.extent();
        let nx = (ax + vx).clamp(0, extent);
        let ny = (ay + vy).clamp(0, extent);
        (self.grid.movable_at(nx, ny) && !self.collides(nx, ny)).then_some((nx, ny))
    }
}

/// Result of asking a structure to move one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Motion {
    pub destination: Option<(i32, i32)>,
    /// The item crossed a splitter midline and the splitter should switch
    /// lanes.
    pub toggle_lane: bool,
}

/// Center line of the tile row/column containing `v`.
fn snap(v: i32) -> i32 {
    v.div_euclid(TILE_SIZE) * TILE_SIZE + HALF_TILE
}

/// The item position with its cross-axis coordinate snapped to the center
/// line of its tile.
fn aligned(rotation: Rotation, item: &DropItem) -> (i32, i32) {
    if rotation.is_horizontal() {
        (item.x, snap(item.y))
    } else {
        (snap(item.x), item.y)
    }
}

// ---------------------------------------------------------------------------
// Belt
// ---------------------------------------------------------------------------

pub(crate) fn belt_motion(rotation: Rotation, item: &DropItem, ctx: &MotionContext<'_>) -> Option<(i32, i32)> {
    let (ax, ay) = aligned(rotation, item);
    ctx.try_step(ax, ay, rotation.delta())
}

// ---------------------------------------------------------------------------
// Splitter
// ---------------------------------------------------------------------------

pub(crate) fn splitter_motion(
    splitter: &Splitter,
    rotation: Rotation,
    anchor: TilePos,
    item: &DropItem,
    ctx: &MotionContext<'_>,
) -> Motion {
    let horizontal = rotation.is_horizontal();
    let step = rotation.delta();
    let (mut ax, mut ay) = aligned(rotation, item);
    // Lanes are stacked across the transport axis, starting at the anchor.
    let (along, v_along, lane_origin) = if horizontal {
        (ax, step.0, anchor.y)
    } else {
        (ay, step.1, anchor.x)
    };

    let crossing =
        (along + HALF_TILE).div_euclid(TILE_SIZE) != (along + v_along + HALF_TILE).div_euclid(TILE_SIZE);
    if crossing {
        let lane_center = (lane_origin + i32::from(splitter.lane)) * TILE_SIZE + HALF_TILE;
        if horizontal {
            ay = lane_center;
        } else {
            ax = lane_center;
        }
    }

    if let Some(destination) = ctx.try_step(ax, ay, step) {
        return Motion {
            destination: Some(destination),
            toggle_lane: crossing,
        };
    }

    // Preferred lane blocked: near the middle of a tile, try the other lane.
    let (along, across) = if horizontal { (ax, ay) } else { (ay, ax) };
    let offset = along.rem_euclid(TILE_SIZE);
    if TILE_SIZE / 4 < offset && offset < TILE_SIZE * 3 / 4 {
        let side = across.div_euclid(TILE_SIZE) - lane_origin;
        let other = if side == 0 { 1 } else { 0 };
        let lane_center = (lane_origin + other) * TILE_SIZE + HALF_TILE;
        let (fx, fy) = if horizontal { (ax, lane_center) } else { (lane_center, ay) };
        return Motion {
            destination: ctx.try_step(fx, fy, step),
            toggle_lane: false,
        };
    }
    Motion::default()
}
