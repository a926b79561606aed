//! The acting player: an inventory that pays for builds and receives
//! harvested structures and items.

use crate::id::ItemType;
use crate::item::{Container, Inventory};

/// Capacity of the player's inventory.
pub const PLAYER_CAPACITY: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub inventory: Inventory,
}

impl Player {
    /// A player with an empty inventory.
    pub fn new(capacity: u32) -> Self {
        Self {
            inventory: Inventory::new(capacity),
        }
    }

    /// A player carrying the items a fresh world starts with.
    pub fn with_starter_kit(capacity: u32) -> Self {
        let mut player = Self::new(capacity);
        for (item, count) in STARTER_KIT {
            let _ = player.inventory.add(item, count);
        }
        player
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::with_starter_kit(PLAYER_CAPACITY)
    }
}

impl Container for Player {
    fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }
}

const STARTER_KIT: [(ItemType, u32); 12] = [
    (ItemType::TransportBelt, 20),
    (ItemType::Inserter, 10),
    (ItemType::Chest, 10),
    (ItemType::OreMine, 5),
    (ItemType::Furnace, 3),
    (ItemType::Assembler, 3),
    (ItemType::CoalOre, 20),
    (ItemType::WaterWell, 3),
    (ItemType::Boiler, 3),
    (ItemType::SteamEngine, 3),
    (ItemType::Pipe, 10),
    (ItemType::Splitter, 5),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_kit_fits() {
        let player = Player::default();
        assert_eq!(player.inventory_capacity(), 500);
        assert_eq!(player.inventory_volume(), 95);
        assert_eq!(player.inventory.count(ItemType::TransportBelt), 20);
        assert_eq!(player.inventory.count(ItemType::CoalOre), 20);
    }

    #[test]
    fn container_contract() {
        let mut player = Player::new(3);
        assert_eq!(player.add_item(ItemType::Gear, 5), 3);
        assert_eq!(player.remove_item(ItemType::Gear, 2), 2);
        assert_eq!(player.inventory_volume(), 1);
    }
}
