//! Core type definitions used throughout the engine

use serde::{Deserialize, Serialize};

/// Unique identifier for dominions.
///
/// Ordered so that pair locks can always be acquired in ascending-id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DominionId(pub u32);

/// Unique identifier for realms (alliances of dominions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RealmId(pub u32);

/// Unique identifier for rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundId(pub u32);

/// In-game hours, the tick unit
pub type Hours = u32;

/// Stockpiled resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Platinum,
    Food,
    Lumber,
    Mana,
    Ore,
    Gems,
    Tech,
    Boats,
}

/// Terrain types land is held in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum Terrain {
    Plain,
    Forest,
    Mountain,
    Hill,
    Swamp,
    Cavern,
    Water,
}

impl Terrain {
    pub const ALL: [Terrain; 7] = [
        Terrain::Plain,
        Terrain::Forest,
        Terrain::Mountain,
        Terrain::Hill,
        Terrain::Swamp,
        Terrain::Cavern,
        Terrain::Water,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Building kinds the conflict formulas read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingType {
    Home,
    Alchemy,
    Farm,
    School,
    Temple,
    DiamondMine,
    Dock,
    ForestHaven,
    WizardGuild,
    Tower,
}

impl BuildingType {
    pub const ALL: [BuildingType; 10] = [
        BuildingType::Home,
        BuildingType::Alchemy,
        BuildingType::Farm,
        BuildingType::School,
        BuildingType::Temple,
        BuildingType::DiamondMine,
        BuildingType::Dock,
        BuildingType::ForestHaven,
        BuildingType::WizardGuild,
        BuildingType::Tower,
    ];

    /// Terrain a building occupies; destroyed alongside that terrain
    pub fn terrain(self) -> Terrain {
        match self {
            BuildingType::Home | BuildingType::Alchemy | BuildingType::Farm => Terrain::Plain,
            BuildingType::School | BuildingType::WizardGuild => Terrain::Hill,
            BuildingType::Temple | BuildingType::Tower => Terrain::Swamp,
            BuildingType::DiamondMine => Terrain::Cavern,
            BuildingType::Dock => Terrain::Water,
            BuildingType::ForestHaven => Terrain::Forest,
        }
    }
}

/// Standard military unit slots in a race's roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum UnitSlot {
    One,
    Two,
    Three,
    Four,
}

impl UnitSlot {
    pub const ALL: [UnitSlot; 4] = [UnitSlot::One, UnitSlot::Two, UnitSlot::Three, UnitSlot::Four];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// War relationship between two realms, as seen from an ordered pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarFooting {
    None,
    /// One side has declared war on the other
    War,
    /// Both sides have declared; every war modifier escalates
    MutualWar,
}

impl WarFooting {
    /// Multiplier on the land-grab formula
    pub fn land_grab_ratio(self) -> f64 {
        match self {
            WarFooting::MutualWar => 1.2,
            WarFooting::War => 1.1,
            WarFooting::None => 1.0,
        }
    }

    /// Multiplier on hostile spell durations
    pub fn spell_duration_multiplier(self) -> f64 {
        match self {
            WarFooting::MutualWar => 2.0,
            WarFooting::War => 1.5,
            WarFooting::None => 1.0,
        }
    }

    /// Additive prestige-gain bonus for the attacker
    pub fn prestige_bonus(self) -> f64 {
        match self {
            WarFooting::MutualWar => 0.2,
            WarFooting::War => 0.1,
            WarFooting::None => 0.0,
        }
    }
}

/// Guard membership. Guards trade a power tax for a narrower interaction range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GuardStatus {
    #[default]
    None,
    Royal,
    Elite,
}

impl GuardStatus {
    /// Multiplicative tax on offensive power
    pub fn offense_tax(self) -> f64 {
        match self {
            GuardStatus::None => 1.0,
            GuardStatus::Royal => 0.98,
            GuardStatus::Elite => 0.95,
        }
    }

    /// Valid target range as (min, max) percent of own land
    pub fn range_bounds(self) -> (f64, f64) {
        match self {
            GuardStatus::None => (40.0, 250.0),
            GuardStatus::Royal => (60.0, 166.0),
            GuardStatus::Elite => (75.0, 133.0),
        }
    }
}
