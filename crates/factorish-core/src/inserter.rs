//! Inserters move single items between the tiles behind and in front of
//! them, then rest for a fixed cooldown.

use crate::grid::{Rotation, TilePos};
use crate::world::World;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inserter {
    /// Ticks left before the next transfer attempt. Zero means idle.
    pub cooldown: u32,
}

impl Inserter {
    pub fn is_idle(&self) -> bool {
        self.cooldown == 0
    }
}

/// One tick of an inserter anchored at `pos`.
///
/// The structure behind is asked to output straight into the tile in front.
/// Failing that, the first floating item resting on the tile behind that the
/// front structure accepts is picked up.
pub(crate) fn frame(inserter: &mut Inserter, pos: TilePos, rotation: Rotation, world: &mut World) {
    inserter.cooldown = inserter.cooldown.saturating_sub(1);
    if inserter.cooldown > 0 {
        return;
    }

    let source = pos.step(rotation.opposite());
    let dest = pos.step(rotation);

    if world.output_at(source, dest) || world.pick_up_into(source, dest) {
        inserter.cooldown = world.config().inserter_cooldown;
    }
}
