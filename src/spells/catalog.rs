//! The spell catalog
//!
//! | Spell          | Category | Duration | Effect                              |
//! |----------------|----------|----------|-------------------------------------|
//! | Midas Touch    | self     | 12h      | platinum production aura            |
//! | Ares' Call     | self     | 12h      | +10% offensive power                |
//! | Gaia's Watch   | self     | 12h      | +10% defensive power                |
//! | Energy Mirror  | self     | 8h       | 20% chance to reflect hostile magic |
//! | Clear Sight    | info     | instant  | reveals the target's status screen  |
//! | Revelation     | info     | instant  | reveals the target's active spells  |
//! | Erosion        | self     | 12h      | 20% of conquered ground floods      |
//! | Verdant Bloom  | self     | 12h      | 35% of conquered ground overgrows   |
//! | Unholy Ghost   | self     | 12h      | enemy draftees refuse to fight you  |
//! | Plague         | war      | 12h      | halts the target's population growth|
//! | Insect Swarm   | war      | 12h      | devours the target's food production|
//! | Fireball       | black op | instant  | burns 2.65% of peasants             |
//! | Disband Spies  | black op | instant  | turns 1.5% of spies into draftees   |
//! | Great Flood    | black op | instant  | sinks 2.5% of docked boats          |

use serde::{Deserialize, Serialize};

use crate::core::types::{Hours, Resource};

/// Stable identifier for every castable spell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellKey {
    MidasTouch,
    AresCall,
    GaiasWatch,
    EnergyMirror,
    ClearSight,
    Revelation,
    Erosion,
    VerdantBloom,
    UnholyGhost,
    Plague,
    InsectSwarm,
    Fireball,
    DisbandSpies,
    GreatFlood,
}

impl SpellKey {
    pub const ALL: [SpellKey; 14] = [
        SpellKey::MidasTouch,
        SpellKey::AresCall,
        SpellKey::GaiasWatch,
        SpellKey::EnergyMirror,
        SpellKey::ClearSight,
        SpellKey::Revelation,
        SpellKey::Erosion,
        SpellKey::VerdantBloom,
        SpellKey::UnholyGhost,
        SpellKey::Plague,
        SpellKey::InsectSwarm,
        SpellKey::Fireball,
        SpellKey::DisbandSpies,
        SpellKey::GreatFlood,
    ];
}

/// How the resolver treats a cast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellCategory {
    /// Cast on self, always lands, applies an aura for the duration
    SelfBuff,
    /// Cast on a target, success-rolled, reveals information only
    Info,
    /// Cast on a target, success-rolled, instant damage; gated early-round
    BlackOp,
    /// Cast on a target, success-rolled, applies a hostile aura; gated
    /// early-round and duration-boosted under war
    WarSpell,
}

/// What an instant-damage effect destroys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageTarget {
    Peasants,
    Spies,
    Stock(Resource),
}

/// One component of a spell's instant payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpellEffect {
    /// Destroys `percent` of the target pool. When `scale_by_day` is set the
    /// percentage shrinks over the round so late-game ops do not snowball.
    Destroy {
        target: DamageTarget,
        percent: f64,
        scale_by_day: bool,
    },
}

/// A catalog entry
#[derive(Debug, Clone)]
pub struct Spell {
    pub key: SpellKey,
    pub name: &'static str,
    pub category: SpellCategory,
    /// Mana cost is this value times the caster's total land
    pub mana_cost_per_acre: f64,
    /// Wizard strength consumed by the cast
    pub strength_cost: f64,
    /// Aura duration in hours; zero for instant spells
    pub duration: Hours,
    pub effects: &'static [SpellEffect],
}

impl Spell {
    pub fn is_hostile(&self) -> bool {
        matches!(self.category, SpellCategory::BlackOp | SpellCategory::WarSpell)
    }
}

/// Look up a spell's catalog entry
pub fn spell(key: SpellKey) -> Spell {
    match key {
        SpellKey::MidasTouch => Spell {
            key,
            name: "Midas Touch",
            category: SpellCategory::SelfBuff,
            mana_cost_per_acre: 2.5,
            strength_cost: 5.0,
            duration: 12,
            effects: &[],
        },
        SpellKey::AresCall => Spell {
            key,
            name: "Ares' Call",
            category: SpellCategory::SelfBuff,
            mana_cost_per_acre: 2.5,
            strength_cost: 5.0,
            duration: 12,
            effects: &[],
        },
        SpellKey::GaiasWatch => Spell {
            key,
            name: "Gaia's Watch",
            category: SpellCategory::SelfBuff,
            mana_cost_per_acre: 2.5,
            strength_cost: 5.0,
            duration: 12,
            effects: &[],
        },
        SpellKey::EnergyMirror => Spell {
            key,
            name: "Energy Mirror",
            category: SpellCategory::SelfBuff,
            mana_cost_per_acre: 3.0,
            strength_cost: 5.0,
            duration: 8,
            effects: &[],
        },
        SpellKey::ClearSight => Spell {
            key,
            name: "Clear Sight",
            category: SpellCategory::Info,
            mana_cost_per_acre: 0.5,
            strength_cost: 2.0,
            duration: 0,
            effects: &[],
        },
        SpellKey::Revelation => Spell {
            key,
            name: "Revelation",
            category: SpellCategory::Info,
            mana_cost_per_acre: 1.2,
            strength_cost: 2.0,
            duration: 0,
            effects: &[],
        },
        SpellKey::Erosion => Spell {
            key,
            name: "Erosion",
            category: SpellCategory::SelfBuff,
            mana_cost_per_acre: 2.5,
            strength_cost: 5.0,
            duration: 12,
            effects: &[],
        },
        SpellKey::VerdantBloom => Spell {
            key,
            name: "Verdant Bloom",
            category: SpellCategory::SelfBuff,
            mana_cost_per_acre: 2.5,
            strength_cost: 5.0,
            duration: 12,
            effects: &[],
        },
        SpellKey::UnholyGhost => Spell {
            key,
            name: "Unholy Ghost",
            category: SpellCategory::SelfBuff,
            mana_cost_per_acre: 3.0,
            strength_cost: 5.0,
            duration: 12,
            effects: &[],
        },
        SpellKey::Plague => Spell {
            key,
            name: "Plague",
            category: SpellCategory::WarSpell,
            mana_cost_per_acre: 3.0,
            strength_cost: 5.0,
            duration: 12,
            effects: &[],
        },
        SpellKey::InsectSwarm => Spell {
            key,
            name: "Insect Swarm",
            category: SpellCategory::WarSpell,
            mana_cost_per_acre: 3.0,
            strength_cost: 5.0,
            duration: 12,
            effects: &[],
        },
        SpellKey::Fireball => Spell {
            key,
            name: "Fireball",
            category: SpellCategory::BlackOp,
            mana_cost_per_acre: 3.3,
            strength_cost: 5.0,
            duration: 0,
            effects: &[SpellEffect::Destroy {
                target: DamageTarget::Peasants,
                percent: 2.65,
                scale_by_day: true,
            }],
        },
        SpellKey::DisbandSpies => Spell {
            key,
            name: "Disband Spies",
            category: SpellCategory::BlackOp,
            mana_cost_per_acre: 4.3,
            strength_cost: 5.0,
            duration: 0,
            effects: &[SpellEffect::Destroy {
                target: DamageTarget::Spies,
                percent: 1.5,
                scale_by_day: false,
            }],
        },
        SpellKey::GreatFlood => Spell {
            key,
            name: "Great Flood",
            category: SpellCategory::BlackOp,
            mana_cost_per_acre: 3.0,
            strength_cost: 5.0,
            duration: 0,
            effects: &[SpellEffect::Destroy {
                target: DamageTarget::Stock(Resource::Boats),
                percent: 2.5,
                scale_by_day: false,
            }],
        },
    }
}
