//! The specialist ledger: infamy, mastery, and resilience
//!
//! Three slow-moving meters shape repeated espionage play. Infamy rewards
//! punching up and decays hourly toward a mastery-derived floor. Mastery is
//! a long-term skill score traded between caster and victim. Resilience
//! accumulates on the receiving end of hostile ops and blunts further damage
//! through a sigmoid, so sustained sieges hit diminishing returns.

use crate::core::config::config;

/// Which specialist track a ledger entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialistKind {
    Spy,
    Wizard,
}

/// Infamy awarded for a successful hostile op: a base of 5 for the deed
/// itself, a band from the relative specialist ratio, and a bonus for
/// working inside the prestige-qualifying range.
pub fn infamy_gain(own_ratio: f64, target_ratio: f64, range: f64) -> i64 {
    let r = if own_ratio <= 0.0 {
        0.0
    } else if target_ratio <= 0.0 {
        f64::MAX
    } else {
        target_ratio / own_ratio
    };
    let mut gain = 5;
    gain += if r >= 1.3 {
        50
    } else if r >= 1.1 {
        40
    } else if r >= 0.9 {
        30
    } else if r >= 0.7 {
        15
    } else {
        0
    };
    if range >= 75.0 {
        gain += 10;
    }
    gain
}

/// Apply an infamy delta, clamped to [0, 1000]
pub fn apply_infamy(current: i64, delta: i64) -> i64 {
    (current + delta).clamp(0, 1000)
}

/// Hourly infamy decay, floored by mastery: every 100 combined mastery
/// (each track counting at most 500) holds 50 infamy in place permanently.
pub fn infamy_after_decay(infamy: i64, spy_mastery: i64, wizard_mastery: i64) -> i64 {
    let combined = spy_mastery.clamp(0, 500) + wizard_mastery.clamp(0, 500);
    let floor = combined / 100 * 50;
    (infamy - config().infamy_decay).max(floor).min(infamy)
}

/// Mastery gained by the caster of a successful hostile op.
///
/// A tenth of the infamy award, plus one for beating a near-peer. Farming
/// far weaker specialists teaches nothing once 500 ahead.
pub fn mastery_gain(own_mastery: i64, target_mastery: i64, infamy_gain: i64) -> i64 {
    if own_mastery >= target_mastery + 500 {
        return 0;
    }
    let mut gain = infamy_gain / 10;
    if (own_mastery - target_mastery).abs() <= 100 {
        gain += 1;
    }
    gain
}

/// Mastery the victim forfeits: mirrors the caster's gain, but only targets
/// established above 100 can lose any, and never below zero.
pub fn mastery_loss(target_mastery: i64, caster_gain: i64) -> i64 {
    if target_mastery <= 100 {
        return 0;
    }
    caster_gain.min(target_mastery)
}

/// Resilience gained by the victim of a successful hostile op
pub fn resilience_gain(kind: SpecialistKind) -> i64 {
    match kind {
        SpecialistKind::Spy => config().spy_resilience_gain,
        SpecialistKind::Wizard => config().wizard_resilience_gain,
    }
}

/// Hourly resilience decay, never below zero
pub fn resilience_after_decay(resilience: i64) -> i64 {
    (resilience - config().resilience_decay).max(0)
}

/// Fraction of incoming op damage absorbed by resilience:
/// `(1 + erf(0.00226 * (resilience - 770))) / 2`.
///
/// Near zero below ~300 resilience, half at 770, saturating toward full
/// absorption past ~1200.
pub fn resilience_reduction(resilience: i64) -> f64 {
    (1.0 + erf(0.00226 * (resilience as f64 - 770.0))) / 2.0
}

/// Error function, Abramowitz & Stegun 7.1.26 (max abs error 1.5e-7)
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    sign * (1.0 - poly * (-x * x).exp())
}
