use serde::{Deserialize, Serialize};

/// The closed catalog of item types that can sit in an inventory or on the
/// ground. Ordering is the catalog order and drives every "first item" scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemType {
    IronOre,
    CopperOre,
    CoalOre,
    IronPlate,
    CopperPlate,
    SteelPlate,
    Gear,
    CopperWire,
    Circuit,
    TransportBelt,
    Splitter,
    Inserter,
    Chest,
    OreMine,
    Furnace,
    Assembler,
    WaterWell,
    Boiler,
    Pipe,
    SteamEngine,
}

impl ItemType {
    pub const ALL: [ItemType; 20] = [
        ItemType::IronOre,
        ItemType::CopperOre,
        ItemType::CoalOre,
        ItemType::IronPlate,
        ItemType::CopperPlate,
        ItemType::SteelPlate,
        ItemType::Gear,
        ItemType::CopperWire,
        ItemType::Circuit,
        ItemType::TransportBelt,
        ItemType::Splitter,
        ItemType::Inserter,
        ItemType::Chest,
        ItemType::OreMine,
        ItemType::Furnace,
        ItemType::Assembler,
        ItemType::WaterWell,
        ItemType::Boiler,
        ItemType::Pipe,
        ItemType::SteamEngine,
    ];

    /// Display name, also the key used in saves and data files.
    pub fn name(self) -> &'static str {
        match self {
            ItemType::IronOre => "Iron Ore",
            ItemType::CopperOre => "Copper Ore",
            ItemType::CoalOre => "Coal Ore",
            ItemType::IronPlate => "Iron Plate",
            ItemType::CopperPlate => "Copper Plate",
            ItemType::SteelPlate => "Steel Plate",
            ItemType::Gear => "Gear",
            ItemType::CopperWire => "Copper Wire",
            ItemType::Circuit => "Circuit",
            ItemType::TransportBelt => "Transport Belt",
            ItemType::Splitter => "Splitter",
            ItemType::Inserter => "Inserter",
            ItemType::Chest => "Chest",
            ItemType::OreMine => "Ore Mine",
            ItemType::Furnace => "Furnace",
            ItemType::Assembler => "Assembler",
            ItemType::WaterWell => "Water Well",
            ItemType::Boiler => "Boiler",
            ItemType::Pipe => "Pipe",
            ItemType::SteamEngine => "Steam Engine",
        }
    }

    pub fn from_name(name: &str) -> Option<ItemType> {
        Self::ALL.into_iter().find(|item| item.name() == name)
    }

    /// The structure this item builds, if it is a structure item.
    pub fn structure_kind(self) -> Option<StructureKind> {
        StructureKind::ALL.into_iter().find(|kind| kind.item() == self)
    }

    /// Solid fuel burned by burner structures.
    pub fn is_fuel(self) -> bool {
        self == ItemType::CoalOre
    }

    /// Stable index used when hashing state.
    pub fn index(self) -> u32 {
        self as u32
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The fixed set of buildable structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    TransportBelt,
    Splitter,
    Inserter,
    Chest,
    OreMine,
    Furnace,
    Assembler,
    WaterWell,
    Boiler,
    Pipe,
    SteamEngine,
}

impl StructureKind {
    pub const ALL: [StructureKind; 11] = [
        StructureKind::TransportBelt,
        StructureKind::Splitter,
        StructureKind::Inserter,
        StructureKind::Chest,
        StructureKind::OreMine,
        StructureKind::Furnace,
        StructureKind::Assembler,
        StructureKind::WaterWell,
        StructureKind::Boiler,
        StructureKind::Pipe,
        StructureKind::SteamEngine,
    ];

    /// The item consumed when building and returned when harvesting.
    pub fn item(self) -> ItemType {
        match self {
            StructureKind::TransportBelt => ItemType::TransportBelt,
            StructureKind::Splitter => ItemType::Splitter,
            StructureKind::Inserter => ItemType::Inserter,
            StructureKind::Chest => ItemType::Chest,
            StructureKind::OreMine => ItemType::OreMine,
            StructureKind::Furnace => ItemType::Furnace,
            StructureKind::Assembler => ItemType::Assembler,
            StructureKind::WaterWell => ItemType::WaterWell,
            StructureKind::Boiler => ItemType::Boiler,
            StructureKind::Pipe => ItemType::Pipe,
            StructureKind::SteamEngine => ItemType::SteamEngine,
        }
    }

    /// Type tag written into saves.
    pub fn name(self) -> &'static str {
        self.item().name()
    }

    pub fn from_name(name: &str) -> Option<StructureKind> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl std::fmt::Display for StructureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Fluids carried by fluid boxes. An empty box has no fluid type at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FluidType {
    Water,
    Steam,
}

impl FluidType {
    pub fn name(self) -> &'static str {
        match self {
            FluidType::Water => "Water",
            FluidType::Steam => "Steam",
        }
    }

    pub fn from_name(name: &str) -> Option<FluidType> {
        match name {
            "Water" => Some(FluidType::Water),
            "Steam" => Some(FluidType::Steam),
            _ => None,
        }
    }
}

/// Serial id of a floating item. Never reused within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DropItemId(pub u64);
