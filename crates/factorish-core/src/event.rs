//! Inventory-changed notifications for rendering and UI collaborators.
//!
//! Changes are collected while a tick or command runs and delivered in one
//! batch afterwards, one call per changed inventory, in a deterministic order
//! (player first, then structures in raster order).

use crate::grid::TilePos;
use crate::item::Inventory;
use std::collections::BTreeSet;

/// Whose inventory changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InventoryOwner {
    Player,
    /// The structure anchored at this tile.
    Structure(TilePos),
}

/// Read-only listener receiving the inventory's current contents.
pub type InventoryListener = Box<dyn FnMut(InventoryOwner, &Inventory)>;

#[derive(Default)]
pub struct InventoryEvents {
    listeners: Vec<InventoryListener>,
    pending: BTreeSet<InventoryOwner>,
}

impl InventoryEvents {
    pub fn subscribe(&mut self, listener: InventoryListener) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Record that `owner`'s inventory changed. Repeated marks before the
    /// next delivery collapse into one notification.
    pub fn mark(&mut self, owner: InventoryOwner) {
        self.pending.insert(owner);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Deliver every pending change. `lookup` resolves an owner to its
    /// inventory; owners that no longer have one are skipped.
    pub fn deliver<'a>(&mut self, mut lookup: impl FnMut(InventoryOwner) -> Option<&'a Inventory>) {
        let pending = std::mem::take(&mut self.pending);
        if self.listeners.is_empty() {
            return;
        }
        for owner in pending {
            let Some(inventory) = lookup(owner) else {
                continue;
            };
            for listener in &mut self.listeners {
                listener(owner, inventory);
            }
        }
    }
}

impl std::fmt::Debug for InventoryEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryEvents")
            .field("listeners", &self.listeners.len())
            .field("pending", &self.pending)
            .finish()
    }
}
