//! Offensive/defensive power and specialist ratios
//!
//! Pure functions of dominion snapshots: no mutation, no I/O. Multiplicative
//! modifiers are not all commutative with the clamping steps, so they apply
//! in one fixed order, documented on [`offensive_multiplier`] and
//! [`defensive_multiplier`].

use crate::core::types::{BuildingType, UnitSlot};
use crate::dominion::race::RacePerk;
use crate::dominion::snapshot::PassivePerk;
use crate::dominion::Dominion;
use crate::spells::SpellKey;

/// Which side of an espionage/magic exchange a ratio is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioSide {
    Offense,
    Defense,
}

/// Options for a defensive power query
#[derive(Debug, Clone, Copy, Default)]
pub struct DefenseOptions {
    /// Multiplier reduction from the attacker's temples, see [`temple_reduction`]
    pub multiplier_reduction: f64,
    /// Draftees contribute nothing (attacker has Unholy Ghost up)
    pub ignore_draftees: bool,
}

/// Aggregate offensive power for an attack.
///
/// `committed` restricts the calculation to a hypothetical unit allocation
/// (previewing an invasion); `None` counts the full army. `land_ratio` is
/// the target's land relative to the attacker's and feeds ratio-scaled unit
/// perks.
pub fn offensive_power(
    attacker: &Dominion,
    land_ratio: Option<f64>,
    committed: Option<&[i64; 4]>,
) -> f64 {
    let mut raw = 0.0;
    for slot in UnitSlot::ALL {
        let count = match committed {
            Some(units) => units[slot.index()],
            None => attacker.military.slot(slot),
        };
        raw += count as f64 * attacker.race.unit(slot).offense_vs(land_ratio);
    }
    (raw * offensive_multiplier(attacker)).max(0.0)
}

/// Aggregate defensive power of a dominion.
///
/// Always finite and non-negative; callers comparing against it must treat
/// zero as a special case rather than dividing by it.
pub fn defensive_power(defender: &Dominion, opts: &DefenseOptions) -> f64 {
    let mut raw = 0.0;
    for slot in UnitSlot::ALL {
        raw += defender.military.slot(slot) as f64 * defender.race.unit(slot).power_defense;
    }
    if !opts.ignore_draftees {
        raw += defender.military.draftees as f64;
    }
    (raw * defensive_multiplier(defender, opts.multiplier_reduction)).max(0.0)
}

/// Offensive multiplier, applied in fixed order:
///
/// 1. racial perk (additive)
/// 2. tech perks (additive)
/// 3. wonder perks (additive)
/// 4. active spells (additive; Ares' Call +10%)
/// 5. prestige bonus (multiplicative, offense only)
/// 6. guard membership tax (multiplicative)
/// 7. morale (multiplicative, offense only; 90% floor at zero morale)
fn offensive_multiplier(dominion: &Dominion) -> f64 {
    let mut additive = 1.0;
    additive += dominion.race.perk(RacePerk::Offense);
    additive += dominion.tech_perk(PassivePerk::Offense);
    additive += dominion.wonder_perk(PassivePerk::Offense);
    if dominion.spell_active(SpellKey::AresCall) {
        additive += 0.10;
    }

    let prestige = 1.0 + dominion.prestige as f64 / 10_000.0;
    let guard = dominion.guard.offense_tax();
    let morale = 0.90 + 0.10 * (dominion.morale.clamp(0, 100) as f64 / 100.0);

    additive * prestige * guard * morale
}

/// Defensive multiplier: race, techs, wonders, spells (Gaia's Watch +10%),
/// then the attacker's temple reduction, which can never push below zero.
fn defensive_multiplier(dominion: &Dominion, multiplier_reduction: f64) -> f64 {
    let mut additive = 1.0;
    additive += dominion.race.perk(RacePerk::Defense);
    additive += dominion.tech_perk(PassivePerk::Defense);
    additive += dominion.wonder_perk(PassivePerk::Defense);
    if dominion.spell_active(SpellKey::GaiasWatch) {
        additive += 0.10;
    }
    (additive - multiplier_reduction).max(0.0)
}

/// Reduction of the defender's DP multiplier from the attacker's temples:
/// 1.5% per 1% of land built as temples, capped at 25%.
pub fn temple_reduction(attacker: &Dominion) -> f64 {
    let land = attacker.total_land();
    if land == 0 {
        return 0.0;
    }
    let temple_share = attacker.building_count(BuildingType::Temple) as f64 / land as f64;
    (temple_share * 1.5).min(0.25)
}

/// Spy power per acre
pub fn spy_ratio(dominion: &Dominion, _side: RatioSide) -> f64 {
    let land = dominion.total_land();
    if land == 0 {
        return 0.0;
    }
    dominion.military.spies as f64 / land as f64
}

/// Wizard power per acre. Archmages count double; offensive ratios also
/// pick up units with the counts-as-wizard perk.
pub fn wizard_ratio(dominion: &Dominion, side: RatioSide) -> f64 {
    let land = dominion.total_land();
    if land == 0 {
        return 0.0;
    }
    let mut force = dominion.military.wizards as f64 + dominion.military.archmages as f64 * 2.0;
    if side == RatioSide::Offense {
        for slot in UnitSlot::ALL {
            if let Some(factor) = dominion.race.unit(slot).counts_as_wizard() {
                force += dominion.military.slot(slot) as f64 * factor;
            }
        }
    }
    force / land as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DominionId, GuardStatus, RealmId, RoundId};
    use crate::dominion::race::Race;

    fn dom() -> Dominion {
        let mut d = Dominion::seeded(DominionId(1), RealmId(1), RoundId(1), "T", Race::legion(), 700);
        d.military.units = [1000, 500, 200, 300];
        d.military.draftees = 400;
        d.prestige = 0;
        d
    }

    #[test]
    fn test_offensive_power_counts_committed_only() {
        let d = dom();
        let full = offensive_power(&d, None, None);
        let partial = offensive_power(&d, None, Some(&[100, 0, 0, 0]));
        assert!(full > partial);
        // Slot one carries 4 OP each; morale 100 gives the full multiplier
        assert!((partial - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_defensive_power_includes_draftees() {
        let d = dom();
        let with = defensive_power(&d, &DefenseOptions::default());
        let without = defensive_power(&d, &DefenseOptions { ignore_draftees: true, ..Default::default() });
        assert!((with - without - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_army_is_zero_not_nan() {
        let mut d = dom();
        d.military = Default::default();
        let dp = defensive_power(&d, &DefenseOptions::default());
        assert_eq!(dp, 0.0);
        assert!(dp.is_finite());
    }

    #[test]
    fn test_prestige_raises_offense() {
        let mut d = dom();
        let base = offensive_power(&d, None, None);
        d.prestige = 1000;
        assert!(offensive_power(&d, None, None) > base);
    }

    #[test]
    fn test_guard_tax_lowers_offense() {
        let mut d = dom();
        let base = offensive_power(&d, None, None);
        d.guard = GuardStatus::Elite;
        assert!((offensive_power(&d, None, None) - base * 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_morale_scales_offense_only() {
        let mut d = dom();
        let op_full = offensive_power(&d, None, None);
        let dp_full = defensive_power(&d, &DefenseOptions::default());
        d.morale = 0;
        assert!((offensive_power(&d, None, None) - op_full * 0.9).abs() < 1e-6);
        assert_eq!(defensive_power(&d, &DefenseOptions::default()), dp_full);
    }

    #[test]
    fn test_temple_reduction_caps_at_25_percent() {
        let mut d = dom();
        d.buildings.insert(crate::core::types::BuildingType::Temple, 700);
        assert_eq!(temple_reduction(&d), 0.25);
    }

    #[test]
    fn test_wizard_ratio_archmages_double() {
        let mut d = dom();
        d.military.wizards = 70;
        d.military.archmages = 70;
        // (70 + 140) / 700
        assert!((wizard_ratio(&d, RatioSide::Defense) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_ratios_zero_land_guarded() {
        let mut d = dom();
        d.land = [0; 7];
        assert_eq!(spy_ratio(&d, RatioSide::Offense), 0.0);
        assert_eq!(wizard_ratio(&d, RatioSide::Offense), 0.0);
    }
}
