//! Casualty calculation for both sides of an invasion
//!
//! Offensive casualties on success are charged against the slice of the army
//! actually needed to break the defense, so massive overcommitment does not
//! multiply the body count. Failures cost a flat share of everything sent,
//! doubled when overwhelmed. Defensive casualties scale with how hard the
//! attack pressed and fall off sharply for dominions already bled recently.

use crate::core::config::config;
use crate::core::types::UnitSlot;
use crate::dominion::Dominion;

/// Defender-side losses of one invasion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefensiveCasualties {
    pub units: [i64; 4],
    pub draftees: i64,
}

impl DefensiveCasualties {
    pub fn total(&self) -> i64 {
        self.units.iter().sum::<i64>() + self.draftees
    }
}

/// Attacker losses per slot.
///
/// On success the casualty rate is charged against the units that were
/// actually needed to break the target: `ceil((dp + 1) / average OP per
/// sent unit)`, spread pro rata over the slots. On failure the whole
/// committed force is exposed, twice over when overwhelmed. Units with a
/// fixed-casualty perk ignore all of that and always lose their fixed
/// share of the amount sent.
pub fn offensive_casualties(
    attacker: &Dominion,
    sent: &[i64; 4],
    op: f64,
    dp: f64,
    success: bool,
    overwhelmed: bool,
) -> [i64; 4] {
    let cfg = config();
    let total_sent: i64 = sent.iter().sum();
    let exposure = if success {
        if op > 0.0 && total_sent > 0 {
            let op_per_unit = op / total_sent as f64;
            let needed = ((dp + 1.0) / op_per_unit).ceil();
            (needed / total_sent as f64).min(1.0)
        } else {
            0.0
        }
    } else if overwhelmed {
        2.0
    } else {
        1.0
    };
    let mut losses = [0i64; 4];
    for slot in UnitSlot::ALL {
        let committed = sent[slot.index()];
        if committed == 0 {
            continue;
        }
        let fraction = match attacker.race.unit(slot).fixed_casualty_percent() {
            Some(percent) => percent / 100.0,
            None => cfg.offensive_casualty_rate * exposure,
        };
        losses[slot.index()] = ((committed as f64 * fraction).floor() as i64).min(committed);
    }
    losses
}

/// Recency damping on defensive casualties: each invasion already suffered
/// in the trailing day thins what is left to kill.
///
/// | prior invasions | multiplier |
/// |-----------------|------------|
/// | 0               | 1.00       |
/// | 1               | 0.80       |
/// | 2               | 0.60       |
/// | 3               | 0.55       |
/// | 4               | 0.45       |
/// | 5+              | 0.35       |
pub fn recency_damping(prior_invasions: usize) -> f64 {
    match prior_invasions {
        0 => 1.0,
        1 => 0.8,
        2 => 0.6,
        3 => 0.55,
        4 => 0.45,
        _ => 0.35,
    }
}

/// Defender losses, spread evenly over defending slots and draftees.
///
/// An overwhelmed attacker never reaches the defenders at all. Otherwise
/// the base rate scales with relative dominion size and attack pressure,
/// capped so even a crushing victory leaves most of the garrison standing.
/// `spare_draftees` keeps the draftee pool untouched, for attackers whose
/// aura already stripped draftees out of the defense.
pub fn defensive_casualties(
    defender: &Dominion,
    op: f64,
    dp: f64,
    land_ratio: f64,
    overwhelmed: bool,
    prior_invasions: usize,
    spare_draftees: bool,
) -> DefensiveCasualties {
    if overwhelmed || dp <= 0.0 {
        return DefensiveCasualties::default();
    }
    let cfg = config();
    let pressure = op / dp;
    let rate = (cfg.defensive_casualty_base * land_ratio.clamp(0.4, 1.0) * pressure)
        .min(cfg.defensive_casualty_max)
        * recency_damping(prior_invasions);

    let mut out = DefensiveCasualties::default();
    for slot in UnitSlot::ALL {
        if defender.race.unit(slot).power_defense > 0.0 {
            let held = defender.military.slot(slot);
            out.units[slot.index()] = ((held as f64 * rate).floor() as i64).min(held);
        }
    }
    if !spare_draftees {
        out.draftees = ((defender.military.draftees as f64 * rate).floor() as i64)
            .min(defender.military.draftees);
    }
    out
}
