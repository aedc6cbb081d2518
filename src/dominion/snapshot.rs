//! The Dominion snapshot: every combat-relevant field as an explicit value

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::types::{BuildingType, DominionId, GuardStatus, Hours, RealmId, RoundId, Terrain, UnitSlot};
use crate::dominion::race::Race;
use crate::spells::SpellKey;

/// Resource stocks. All non-negative integers except boats, which is
/// fractional because docks and sinking both produce fractional amounts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resources {
    pub platinum: i64,
    pub food: i64,
    pub lumber: i64,
    pub mana: i64,
    pub ore: i64,
    pub gems: i64,
    pub tech: i64,
    pub boats: f64,
}

/// Military holdings: four roster slots plus the specialist pools
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Military {
    pub units: [i64; 4],
    pub draftees: i64,
    pub spies: i64,
    pub wizards: i64,
    pub archmages: i64,
}

impl Military {
    pub fn slot(&self, slot: UnitSlot) -> i64 {
        self.units[slot.index()]
    }

    pub fn slot_mut(&mut self, slot: UnitSlot) -> &mut i64 {
        &mut self.units[slot.index()]
    }
}

/// A spell currently affecting a dominion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveSpell {
    pub key: SpellKey,
    pub remaining: Hours,
    pub cast_by: DominionId,
}

/// One entry in the trailing invaded-by log, aged by the hourly tick
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InvasionStamp {
    pub attacker: DominionId,
    pub hours_ago: Hours,
}

/// Passive multiplier sources (researched techs, wonders). Fractional
/// values; 0.1 = +10%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassivePerk {
    Offense,
    Defense,
    PrestigeGains,
    TechProduction,
    SpyLosses,
    SpellDuration,
    EnemySpellChance,
    EnemySpellDamage,
    EnemySpellDuration,
}

/// A dominion's full combat-relevant state at one instant.
///
/// Mutated exclusively by the conflict resolver; everything else receives
/// clones. Production and decay fields that only the hourly tick touches are
/// not modeled here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dominion {
    pub id: DominionId,
    pub realm: RealmId,
    pub round: RoundId,
    pub name: String,
    pub race: Race,

    pub resources: Resources,
    pub peasants: i64,
    pub military: Military,

    /// Acres held, indexed by terrain
    pub land: [i64; 7],
    /// Built structures
    pub buildings: AHashMap<BuildingType, i64>,
    /// Acres rebuildable at a discount after building destruction
    pub discounted_land: i64,

    /// 0-100
    pub morale: i64,
    /// 0-100, consumed by operations
    pub spy_strength: f64,
    pub wizard_strength: f64,

    pub prestige: i64,
    pub infamy: i64,
    pub spy_mastery: i64,
    pub wizard_mastery: i64,
    pub spy_resilience: i64,
    pub wizard_resilience: i64,

    pub active_spells: Vec<ActiveSpell>,
    pub tech_perks: AHashMap<PassivePerk, f64>,
    pub wonder_perks: AHashMap<PassivePerk, f64>,

    pub guard: GuardStatus,
    pub under_protection: bool,
    pub locked: bool,

    /// Trailing log of invasions received, newest first
    pub recent_invasions: Vec<InvasionStamp>,
    /// Hours-ago marks of this dominion's own outbound invasions
    #[serde(default)]
    pub recent_attacks: Vec<Hours>,
}

impl Dominion {
    /// A freshly seeded dominion with a uniform land spread and empty
    /// military, the state a new round hands out.
    pub fn seeded(id: DominionId, realm: RealmId, round: RoundId, name: &str, race: Race, acres: i64) -> Self {
        let per_terrain = acres / 7;
        let mut land = [per_terrain; 7];
        land[Terrain::Plain.index()] += acres - per_terrain * 7;
        Self {
            id,
            realm,
            round,
            name: name.into(),
            race,
            resources: Resources { platinum: 100_000, food: 15_000, mana: 20_000, boats: 40.0, ..Default::default() },
            peasants: 1_300,
            military: Military { draftees: 100, ..Default::default() },
            land,
            buildings: AHashMap::new(),
            discounted_land: 0,
            morale: 100,
            spy_strength: 100.0,
            wizard_strength: 100.0,
            prestige: 250,
            infamy: 0,
            spy_mastery: 0,
            wizard_mastery: 0,
            spy_resilience: 0,
            wizard_resilience: 0,
            active_spells: Vec::new(),
            tech_perks: AHashMap::new(),
            wonder_perks: AHashMap::new(),
            guard: GuardStatus::None,
            under_protection: false,
            locked: false,
            recent_invasions: Vec::new(),
            recent_attacks: Vec::new(),
        }
    }

    pub fn total_land(&self) -> i64 {
        self.land.iter().sum()
    }

    pub fn land_of(&self, terrain: Terrain) -> i64 {
        self.land[terrain.index()]
    }

    pub fn building_count(&self, building: BuildingType) -> i64 {
        self.buildings.get(&building).copied().unwrap_or(0)
    }

    pub fn spell_active(&self, key: SpellKey) -> bool {
        self.active_spells.iter().any(|s| s.key == key)
    }

    pub fn tech_perk(&self, perk: PassivePerk) -> f64 {
        self.tech_perks.get(&perk).copied().unwrap_or(0.0)
    }

    pub fn wonder_perk(&self, perk: PassivePerk) -> f64 {
        self.wonder_perks.get(&perk).copied().unwrap_or(0.0)
    }

    /// Times this dominion was invaded within the trailing window
    pub fn recently_invaded_count(&self, window: Hours) -> usize {
        self.recent_invasions.iter().filter(|s| s.hours_ago < window).count()
    }

    /// Times this dominion launched an invasion within the trailing window
    pub fn recent_attack_count(&self, window: Hours) -> usize {
        self.recent_attacks.iter().filter(|&&h| h < window).count()
    }

    /// Times a specific attacker hit this dominion within the window
    pub fn recently_invaded_by(&self, attacker: DominionId, window: Hours) -> usize {
        self.recent_invasions
            .iter()
            .filter(|s| s.attacker == attacker && s.hours_ago < window)
            .count()
    }

    /// Target's land as a percentage of this dominion's land
    pub fn range_to(&self, target: &Dominion) -> f64 {
        let own = self.total_land();
        if own == 0 {
            return 0.0;
        }
        target.total_land() as f64 / own as f64 * 100.0
    }

    /// Raw hourly platinum production; caps plunder
    pub fn platinum_production_raw(&self) -> f64 {
        self.peasants as f64 * 2.7 + self.building_count(BuildingType::Alchemy) as f64 * 45.0
    }

    /// Raw hourly gem production; caps plunder
    pub fn gem_production_raw(&self) -> f64 {
        self.building_count(BuildingType::DiamondMine) as f64 * 15.0
    }

    /// Reject any state the commit phase must never persist
    pub fn validate(&self) -> Result<()> {
        let negatives: &[(&str, i64)] = &[
            ("platinum", self.resources.platinum),
            ("food", self.resources.food),
            ("lumber", self.resources.lumber),
            ("mana", self.resources.mana),
            ("ore", self.resources.ore),
            ("gems", self.resources.gems),
            ("tech", self.resources.tech),
            ("peasants", self.peasants),
            ("draftees", self.military.draftees),
            ("spies", self.military.spies),
            ("wizards", self.military.wizards),
            ("archmages", self.military.archmages),
            ("prestige", self.prestige),
            ("infamy", self.infamy),
            ("discounted_land", self.discounted_land),
        ];
        for (field, value) in negatives {
            if *value < 0 {
                return Err(EngineError::invariant(format!(
                    "{} would be negative ({}) for dominion {:?}",
                    field, value, self.id
                )));
            }
        }
        if self.resources.boats < 0.0 {
            return Err(EngineError::invariant(format!(
                "boats would be negative ({}) for dominion {:?}",
                self.resources.boats, self.id
            )));
        }
        for slot in UnitSlot::ALL {
            if self.military.slot(slot) < 0 {
                return Err(EngineError::invariant(format!(
                    "unit slot {:?} would be negative for dominion {:?}",
                    slot, self.id
                )));
            }
        }
        for terrain in Terrain::ALL {
            if self.land_of(terrain) < 0 {
                return Err(EngineError::invariant(format!(
                    "{:?} acreage would be negative for dominion {:?}",
                    terrain, self.id
                )));
            }
        }
        for (building, count) in &self.buildings {
            if *count < 0 {
                return Err(EngineError::invariant(format!(
                    "{:?} count would be negative for dominion {:?}",
                    building, self.id
                )));
            }
        }
        Ok(())
    }
}
