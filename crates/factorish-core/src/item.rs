use crate::id::ItemType;
use std::collections::BTreeMap;

/// Default capacity of chests and factory-family structures.
pub const DEFAULT_CAPACITY: u32 = 100;

/// Fungible item storage bounded by a total-volume capacity.
///
/// Counts are kept in a `BTreeMap` so iteration follows catalog order, which
/// makes every "first item" scan deterministic. Zero counts are never stored.
#[derive(Debug, Clone)]
pub struct Inventory {
    items: BTreeMap<ItemType, u32>,
    capacity: u32,
    /// Bumped on every mutation; lets the world detect changed inventories
    /// without diffing contents.
    revision: u64,
}

impl Inventory {
    pub fn new(capacity: u32) -> Self {
        Self {
            items: BTreeMap::new(),
            capacity,
            revision: 0,
        }
    }

    /// Add up to `count` items. Returns the amount actually moved in, which
    /// is limited by the remaining capacity.
    #[must_use = "returns the quantity actually added, which may be less than requested"]
    pub fn add(&mut self, item: ItemType, count: u32) -> u32 {
        let moved = count.min(self.free_space());
        if moved > 0 {
            *self.items.entry(item).or_insert(0) += moved;
            self.revision += 1;
        }
        moved
    }

    /// Remove up to `count` items. Returns the amount actually removed.
    #[must_use = "returns the quantity actually removed, which may be less than requested"]
    pub fn remove(&mut self, item: ItemType, count: u32) -> u32 {
        let Some(held) = self.items.get_mut(&item) else {
            return 0;
        };
        let removed = count.min(*held);
        *held -= removed;
        if *held == 0 {
            self.items.remove(&item);
        }
        if removed > 0 {
            self.revision += 1;
        }
        removed
    }

    pub fn count(&self, item: ItemType) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    pub fn contains(&self, item: ItemType) -> bool {
        self.count(item) > 0
    }

    /// Total items across all types.
    pub fn volume(&self) -> u32 {
        self.items.values().fold(0u32, |total, &count| total.saturating_add(count))
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn free_space(&self) -> u32 {
        self.capacity.saturating_sub(self.volume())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First held item in catalog order.
    pub fn first_item(&self) -> Option<ItemType> {
        self.items.keys().next().copied()
    }

    /// First held item in catalog order for which `pred` holds.
    pub fn first_item_where(&self, mut pred: impl FnMut(ItemType) -> bool) -> Option<ItemType> {
        self.items.keys().copied().find(|&item| pred(item))
    }

    /// Iterate `(item, count)` pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemType, u32)> + '_ {
        self.items.iter().map(|(&item, &count)| (item, count))
    }

    /// Whether every `(item, count)` requirement is held simultaneously.
    pub fn has_all(&self, requirements: &BTreeMap<ItemType, u32>) -> bool {
        requirements.iter().all(|(&item, &count)| self.count(item) >= count)
    }

    /// Remove every requirement, or nothing at all if any is short.
    pub fn remove_all(&mut self, requirements: &BTreeMap<ItemType, u32>) -> bool {
        if !self.has_all(requirements) {
            return false;
        }
        for (&item, &count) in requirements {
            let _ = self.remove(item, count);
        }
        true
    }

    /// Take every item out, leaving the inventory empty.
    pub fn drain(&mut self) -> BTreeMap<ItemType, u32> {
        if !self.items.is_empty() {
            self.revision += 1;
        }
        std::mem::take(&mut self.items)
    }

    /// Mutation counter used for change detection.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl PartialEq for Inventory {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items && self.capacity == other.capacity
    }
}

impl Eq for Inventory {}

/// Anything that owns an [`Inventory`] and exposes the container contract.
pub trait Container {
    fn inventory(&self) -> &Inventory;
    fn inventory_mut(&mut self) -> &mut Inventory;

    #[must_use = "returns the quantity actually added, which may be less than requested"]
    fn add_item(&mut self, item: ItemType, count: u32) -> u32 {
        self.inventory_mut().add(item, count)
    }

    #[must_use = "returns the quantity actually removed, which may be less than requested"]
    fn remove_item(&mut self, item: ItemType, count: u32) -> u32 {
        self.inventory_mut().remove(item, count)
    }

    fn inventory_volume(&self) -> u32 {
        self.inventory().volume()
    }

    fn inventory_capacity(&self) -> u32 {
        self.inventory().capacity()
    }
}

impl Container for Inventory {
    fn inventory(&self) -> &Inventory {
        self
    }

    fn inventory_mut(&mut self) -> &mut Inventory {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove() {
        let mut inv = Inventory::new(100);
        assert_eq!(inv.add(ItemType::IronOre, 50), 50);
        assert_eq!(inv.count(ItemType::IronOre), 50);
        assert_eq!(inv.remove(ItemType::IronOre, 30), 30);
        assert_eq!(inv.count(ItemType::IronOre), 20);
    }

    #[test]
    fn add_is_capped_by_capacity() {
        let mut inv = Inventory::new(10);
        assert_eq!(inv.add(ItemType::IronOre, 7), 7);
        assert_eq!(inv.add(ItemType::CoalOre, 7), 3);
        assert_eq!(inv.volume(), 10);
        assert_eq!(inv.add(ItemType::Gear, 1), 0);
        assert!(!inv.contains(ItemType::Gear));
    }

    #[test]
    fn remove_more_than_held() {
        let mut inv = Inventory::new(100);
        let _ = inv.add(ItemType::Gear, 5);
        assert_eq!(inv.remove(ItemType::Gear, 10), 5);
        assert!(inv.is_empty());
        assert_eq!(inv.remove(ItemType::Gear, 1), 0);
    }

    #[test]
    fn first_item_follows_catalog_order() {
        let mut inv = Inventory::new(100);
        let _ = inv.add(ItemType::Gear, 1);
        let _ = inv.add(ItemType::IronPlate, 1);
        assert_eq!(inv.first_item(), Some(ItemType::IronPlate));
        assert_eq!(inv.first_item_where(|i| i != ItemType::IronPlate), Some(ItemType::Gear));
    }

    #[test]
    fn remove_all_is_atomic() {
        let mut inv = Inventory::new(100);
        let _ = inv.add(ItemType::IronPlate, 1);
        let _ = inv.add(ItemType::CopperWire, 2);
        let needs = BTreeMap::from([(ItemType::IronPlate, 1), (ItemType::CopperWire, 3)]);
        let before = inv.clone();
        assert!(!inv.remove_all(&needs));
        assert_eq!(inv, before);

        let _ = inv.add(ItemType::CopperWire, 1);
        assert!(inv.remove_all(&needs));
        assert!(inv.is_empty());
    }

    #[test]
    fn revision_tracks_mutations_only() {
        let mut inv = Inventory::new(1);
        let r0 = inv.revision();
        assert_eq!(inv.remove(ItemType::Gear, 1), 0);
        assert_eq!(inv.revision(), r0);
        let _ = inv.add(ItemType::Gear, 1);
        assert!(inv.revision() > r0);
        let r1 = inv.revision();
        assert_eq!(inv.add(ItemType::Gear, 1), 0);
        assert_eq!(inv.revision(), r1);
    }

    #[test]
    fn drain_empties() {
        let mut inv = Inventory::new(100);
        let _ = inv.add(ItemType::CoalOre, 4);
        let taken = inv.drain();
        assert_eq!(taken.get(&ItemType::CoalOre), Some(&4));
        assert!(inv.is_empty());
    }

    #[test]
    fn full_inventory_at_max_capacity() {
        let mut inv = Inventory::new(u32::MAX);
        assert_eq!(inv.add(ItemType::Gear, u32::MAX), u32::MAX);
        assert_eq!(inv.add(ItemType::Chest, 1), 0);
        assert_eq!(inv.volume(), u32::MAX);
        assert_eq!(inv.free_space(), 0);
    }
}
