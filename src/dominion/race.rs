//! Race rosters: unit stats and perks

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Hours, UnitSlot};

/// Race-level perk multipliers (fractional, e.g. 0.1 = +10%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RacePerk {
    Offense,
    Defense,
    PrestigeGains,
    TechProduction,
    SpyLosses,
    ImmortalWizards,
}

/// Named perks a unit slot can carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnitPerk {
    /// Converts a share of defensive casualties into new units of the listed
    /// slots, split evenly, returning with the army.
    Conversion { into: Vec<UnitSlot> },
    /// Flat casualty percentage of the slot's *sent* amount, overriding the
    /// units-to-break calculation entirely.
    FixedCasualties { percent: f64 },
    /// Contributes to sinking the defender's boats when attacking.
    SinkBoatsOffense,
    /// Contributes to sinking the attacker's boats when defending.
    SinkBoatsDefense,
    /// Steals resources on successful invasion, capped by the target's raw
    /// hourly production.
    Plunder { platinum: i64, gems: i64 },
    /// Counts toward wizard ratio on offense and shares wizard losses.
    CountsAsWizardOffense { factor: f64 },
    /// Offense grows with relative target size: `factor * land_ratio`,
    /// capped at `max` bonus points per unit.
    OpFromLandRatio { factor: f64, max: f64 },
}

/// An entry in a race's roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitStats {
    pub name: String,
    pub power_offense: f64,
    pub power_defense: f64,
    /// Whether this unit consumes boat capacity to invade
    pub needs_boat: bool,
    /// Transit hours for the return trip after an invasion
    pub return_hours: Hours,
    pub perks: Vec<UnitPerk>,
}

impl UnitStats {
    pub fn new(name: &str, op: f64, dp: f64) -> Self {
        Self {
            name: name.into(),
            power_offense: op,
            power_defense: dp,
            needs_boat: true,
            return_hours: 12,
            perks: Vec::new(),
        }
    }

    pub fn fixed_casualty_percent(&self) -> Option<f64> {
        self.perks.iter().find_map(|p| match p {
            UnitPerk::FixedCasualties { percent } => Some(*percent),
            _ => None,
        })
    }

    pub fn conversion_targets(&self) -> Option<&[UnitSlot]> {
        self.perks.iter().find_map(|p| match p {
            UnitPerk::Conversion { into } => Some(into.as_slice()),
            _ => None,
        })
    }

    pub fn plunder(&self) -> Option<(i64, i64)> {
        self.perks.iter().find_map(|p| match p {
            UnitPerk::Plunder { platinum, gems } => Some((*platinum, *gems)),
            _ => None,
        })
    }

    pub fn counts_as_wizard(&self) -> Option<f64> {
        self.perks.iter().find_map(|p| match p {
            UnitPerk::CountsAsWizardOffense { factor } => Some(*factor),
            _ => None,
        })
    }

    pub fn sinks_boats_on_offense(&self) -> bool {
        self.perks.iter().any(|p| matches!(p, UnitPerk::SinkBoatsOffense))
    }

    pub fn sinks_boats_on_defense(&self) -> bool {
        self.perks.iter().any(|p| matches!(p, UnitPerk::SinkBoatsDefense))
    }

    /// Effective offensive power per unit against a target of the given
    /// relative land ratio
    pub fn offense_vs(&self, land_ratio: Option<f64>) -> f64 {
        let mut op = self.power_offense;
        if let Some(ratio) = land_ratio {
            for perk in &self.perks {
                if let UnitPerk::OpFromLandRatio { factor, max } = perk {
                    op += (factor * ratio).min(*max);
                }
            }
        }
        op
    }
}

/// A race: four unit slots plus race-level perks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    pub name: String,
    pub units: [UnitStats; 4],
    pub perks: AHashMap<RacePerk, f64>,
}

impl Race {
    pub fn unit(&self, slot: UnitSlot) -> &UnitStats {
        &self.units[slot.index()]
    }

    /// Perk value, 0.0 when absent
    pub fn perk(&self, perk: RacePerk) -> f64 {
        self.perks.get(&perk).copied().unwrap_or(0.0)
    }

    pub fn has_perk(&self, perk: RacePerk) -> bool {
        self.perks.contains_key(&perk)
    }

    /// Baseline human roster: plain offensive/defensive specialists and
    /// elites, no perks. The reference point other rosters are balanced
    /// against.
    pub fn legion() -> Self {
        let mut slinger = UnitStats::new("Slinger", 0.0, 3.0);
        slinger.needs_boat = false;
        Self {
            name: "Legion".into(),
            units: [
                UnitStats::new("Berserker", 4.0, 0.0),
                slinger,
                UnitStats::new("Champion", 6.0, 2.0),
                UnitStats::new("Paladin", 2.0, 6.0),
            ],
            perks: AHashMap::new(),
        }
    }

    /// Conversion race: its elites raise fallen defenders as fresh troops.
    pub fn lycanthrope() -> Self {
        let mut wolf = UnitStats::new("Werewolf", 5.5, 1.0);
        wolf.perks.push(UnitPerk::Conversion { into: vec![UnitSlot::Three] });
        wolf.return_hours = 9;
        let mut ghoul = UnitStats::new("Ghoul", 3.0, 0.0);
        ghoul.perks.push(UnitPerk::FixedCasualties { percent: 10.0 });
        Self {
            name: "Lycanthrope".into(),
            units: [
                ghoul,
                UnitStats::new("Skeleton", 0.0, 3.0),
                wolf,
                UnitStats::new("Revenant", 2.0, 5.5),
            ],
            perks: AHashMap::new(),
        }
    }

    /// Naval race: boat sinkers and plundering raiders.
    pub fn buccaneer() -> Self {
        let mut raider = UnitStats::new("Raider", 4.5, 0.0);
        raider.perks.push(UnitPerk::Plunder { platinum: 20, gems: 5 });
        let mut corsair = UnitStats::new("Corsair", 5.5, 2.0);
        corsair.perks.push(UnitPerk::SinkBoatsOffense);
        let mut harpooner = UnitStats::new("Harpooner", 0.0, 5.0);
        harpooner.needs_boat = false;
        harpooner.perks.push(UnitPerk::SinkBoatsDefense);
        Self {
            name: "Buccaneer".into(),
            units: [
                raider,
                UnitStats::new("Deckhand", 0.0, 2.5),
                corsair,
                harpooner,
            ],
            perks: AHashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perk_lookup_defaults_to_zero() {
        let race = Race::legion();
        assert_eq!(race.perk(RacePerk::PrestigeGains), 0.0);
        assert!(!race.has_perk(RacePerk::ImmortalWizards));
    }

    #[test]
    fn test_fixed_casualties_perk_found() {
        let race = Race::lycanthrope();
        assert_eq!(race.unit(UnitSlot::One).fixed_casualty_percent(), Some(10.0));
        assert_eq!(race.unit(UnitSlot::Three).fixed_casualty_percent(), None);
    }

    #[test]
    fn test_op_from_land_ratio_capped() {
        let mut unit = UnitStats::new("Scaler", 3.0, 0.0);
        unit.perks.push(UnitPerk::OpFromLandRatio { factor: 2.0, max: 1.5 });
        assert_eq!(unit.offense_vs(None), 3.0);
        assert!((unit.offense_vs(Some(0.5)) - 4.0).abs() < 1e-9);
        // 2.0 * 1.0 = 2.0 exceeds the 1.5 cap
        assert!((unit.offense_vs(Some(1.0)) - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_boat_sinking_flags() {
        let race = Race::buccaneer();
        assert!(race.unit(UnitSlot::Three).sinks_boats_on_offense());
        assert!(race.unit(UnitSlot::Four).sinks_boats_on_defense());
        assert!(!race.unit(UnitSlot::One).sinks_boats_on_offense());
    }
}
