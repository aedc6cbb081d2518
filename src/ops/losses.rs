//! Specialist attrition on failed operations
//!
//! Failing an op against a better-defended target costs a slice of the
//! specialist pool. Losses scale with the inverse of the caster's advantage,
//! are damped by the target-hiding buildings, and are capped against the
//! caster's land so one bad night cannot zero out a large academy.

use crate::core::types::{BuildingType, UnitSlot, WarFooting};
use crate::dominion::race::RacePerk;
use crate::dominion::Dominion;
use crate::power::{spy_ratio, wizard_ratio, RatioSide};

/// Operation class, which sets the attrition band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    Info,
    Theft,
    Hostile,
}

impl OpType {
    /// (base loss percent, multiplier floor, multiplier ceiling)
    fn loss_band(self) -> (f64, f64, f64) {
        match self {
            OpType::Info => (0.25, 0.25, 1.0),
            OpType::Theft | OpType::Hostile => (1.0, 0.5, 1.5),
        }
    }
}

/// Wizard-side casualties of a failed hostile spell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WizardLosses {
    pub wizards: i64,
    pub archmages: i64,
    /// Losses among units that count as wizards on offense
    pub units: [i64; 4],
}

impl WizardLosses {
    pub fn is_zero(&self) -> bool {
        self.wizards == 0 && self.archmages == 0 && self.units.iter().all(|&u| u == 0)
    }
}

/// Loss percentage for the caster's pool: base scaled by the target's
/// relative advantage, clamped to the op's band.
fn loss_percent(own_ratio: f64, target_ratio: f64, op: OpType) -> f64 {
    let (base, min, max) = op.loss_band();
    let multiplier = if own_ratio <= 0.0 {
        max
    } else {
        (target_ratio / own_ratio).clamp(min, max)
    };
    base * multiplier
}

/// Fractional reduction from loss-hiding buildings: 2.5% per 1% of land
/// built, capped at 25%.
fn building_reduction(dominion: &Dominion, building: BuildingType) -> f64 {
    let land = dominion.total_land();
    if land == 0 {
        return 0.0;
    }
    let share = dominion.building_count(building) as f64 / land as f64;
    (share * 2.5).min(0.25)
}

/// Spies lost by the caster of a failed spy op. Always at least one when
/// any spies remain; getting caught is never free.
pub fn spy_losses_on_failure(
    caster: &Dominion,
    target: &Dominion,
    op: OpType,
    footing: WarFooting,
) -> i64 {
    if caster.military.spies == 0 {
        return 0;
    }
    let percent = loss_percent(
        spy_ratio(caster, RatioSide::Offense),
        spy_ratio(target, RatioSide::Defense),
        op,
    );
    let mut fraction = percent / 100.0;
    fraction *= 1.0 - building_reduction(caster, BuildingType::ForestHaven);
    fraction *= 1.0 - caster.race.perk(RacePerk::SpyLosses);
    fraction *= 1.0 - caster.tech_perk(crate::dominion::PassivePerk::SpyLosses);
    if footing == WarFooting::MutualWar {
        fraction *= 0.8;
    }
    ((caster.military.spies as f64 * fraction).floor() as i64)
        .clamp(1, caster.military.spies)
}

/// Wizard-side losses of a failed hostile spell.
///
/// Wizard losses cap at 2% of the caster's land, archmages (one lost per
/// ten wizards) at 0.2%, and wizard-counting units at 1%. Races with
/// immortal wizards lose nothing.
pub fn wizard_losses_on_failure(
    caster: &Dominion,
    target: &Dominion,
    footing: WarFooting,
) -> WizardLosses {
    if caster.race.has_perk(RacePerk::ImmortalWizards) {
        return WizardLosses::default();
    }
    let percent = loss_percent(
        wizard_ratio(caster, RatioSide::Offense),
        wizard_ratio(target, RatioSide::Defense),
        OpType::Hostile,
    );
    let mut fraction = percent / 100.0;
    fraction *= 1.0 - building_reduction(caster, BuildingType::WizardGuild);
    if footing == WarFooting::MutualWar {
        fraction *= 0.8;
    }

    let land = caster.total_land() as f64;
    let wizards = ((caster.military.wizards as f64 * fraction).floor() as i64)
        .min((land * 0.02).floor() as i64)
        .min(caster.military.wizards)
        .max(0);
    let archmages = (wizards / 10)
        .min((land * 0.002).floor() as i64)
        .min(caster.military.archmages)
        .max(0);

    let mut units = [0i64; 4];
    for slot in UnitSlot::ALL {
        if caster.race.unit(slot).counts_as_wizard().is_some() {
            units[slot.index()] = ((caster.military.slot(slot) as f64 * fraction).floor() as i64)
                .min((land * 0.01).floor() as i64)
                .min(caster.military.slot(slot))
                .max(0);
        }
    }

    WizardLosses { wizards, archmages, units }
}
