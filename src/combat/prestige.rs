//! Prestige swings and post-invasion research awards
//!
//! Prestige only moves meaningfully when the attacker hits inside the
//! qualifying range; farming small targets costs prestige instead. The
//! attacker's gain travels home with the army, the defender's loss is
//! immediate.

use crate::core::config::config;
use crate::core::types::{BuildingType, WarFooting};
use crate::dominion::race::RacePerk;
use crate::dominion::{Dominion, PassivePerk};

/// Prestige movement of one invasion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrestigeOutcome {
    /// Applied to the attacker immediately (penalties)
    pub attacker_immediate: i64,
    /// Queued to arrive when the slowest returning unit does
    pub attacker_queued: i64,
    /// Applied to the defender immediately
    pub defender_delta: i64,
}

/// Compute both sides' prestige movement.
///
/// `weekly_invasions` counts how often the defender was hit in the trailing
/// week; each prior hit devalues the target. `repeat_invasion` means this
/// attacker already hit this defender inside the short window, which zeroes
/// the gain outright.
pub fn prestige_changes(
    attacker: &Dominion,
    defender: &Dominion,
    range: f64,
    footing: WarFooting,
    success: bool,
    overwhelmed: bool,
    weekly_invasions: usize,
    repeat_invasion: bool,
) -> PrestigeOutcome {
    let cfg = config();
    let mut out = PrestigeOutcome::default();

    if success && range >= 75.0 {
        if !repeat_invasion {
            let base = (defender.prestige as f64 * range / 1000.0).min(cfg.prestige_cap)
                + cfg.prestige_add;
            let mut multiplier = 1.0
                + attacker.race.perk(RacePerk::PrestigeGains)
                + attacker.tech_perk(PassivePerk::PrestigeGains)
                + attacker.wonder_perk(PassivePerk::PrestigeGains)
                + footing.prestige_bonus();
            multiplier *= 1.0 - 0.10 * weekly_invasions.min(8) as f64;
            out.attacker_queued = ((base * multiplier).floor() as i64).max(20);
        }
        let loss_rate = (cfg.prestige_change_rate
            + cfg.prestige_loss_per_invasion * weekly_invasions as f64)
            .min(cfg.prestige_loss_cap);
        out.defender_delta = -((defender.prestige as f64 * loss_rate).floor() as i64);
    } else if overwhelmed || (success && range < 60.0) {
        // Crushed, or bullying far below range: the attacker pays
        out.attacker_immediate =
            -((attacker.prestige as f64 * cfg.prestige_change_rate).floor() as i64);
    }

    out
}

/// Research points awarded for a successful invasion. The base grows with
/// the round so late joiners can still catch up on the tech tree, and the
/// range gate keeps farming from paying out.
///
/// Schools add a flat bonus on top-range hits only, capped at 20% of the
/// attacker's land and thinned for attackers already out raiding hard this
/// trailing three days. Repeat invasions award nothing; everything else is
/// scaled by the attacker's tech-production perks.
pub fn research_points(
    attacker: &Dominion,
    round_day: u32,
    range: f64,
    success: bool,
    repeat_invasion: bool,
) -> i64 {
    if !success || repeat_invasion || range < 60.0 {
        return 0;
    }
    let mut gained = (round_day as f64 / 0.03).max(1000.0);
    if range < 75.0 {
        gained *= 0.5;
    } else {
        let raids = attacker.recent_attack_count(72);
        let penalty = 1.0 - (0.15 * raids.saturating_sub(2) as f64).min(0.75);
        let land = attacker.total_land().max(1);
        let share =
            (attacker.building_count(BuildingType::School) as f64 / land as f64).min(0.20);
        gained += 130.0 * share * 100.0 * penalty;
    }
    let multiplier = 1.0
        + attacker.race.perk(RacePerk::TechProduction)
        + attacker.wonder_perk(PassivePerk::TechProduction);
    (gained * multiplier).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DominionId, RealmId, RoundId};
    use crate::dominion::race::Race;

    fn dom(id: u32, prestige: i64) -> Dominion {
        let mut d = Dominion::seeded(DominionId(id), RealmId(id), RoundId(1), "T", Race::legion(), 1000);
        d.prestige = prestige;
        d
    }

    fn changes(range: f64, success: bool, overwhelmed: bool) -> PrestigeOutcome {
        prestige_changes(
            &dom(1, 500),
            &dom(2, 600),
            range,
            WarFooting::None,
            success,
            overwhelmed,
            0,
            false,
        )
    }

    #[test]
    fn test_qualifying_win_pays_both_ways() {
        let out = changes(80.0, true, false);
        // min(600 * 80 / 1000, 130) + 20 = 68
        assert_eq!(out.attacker_queued, 68);
        assert_eq!(out.defender_delta, -30);
        assert_eq!(out.attacker_immediate, 0);
    }

    #[test]
    fn test_gain_capped() {
        let out = prestige_changes(
            &dom(1, 500),
            &dom(2, 5000),
            100.0,
            WarFooting::None,
            true,
            false,
            0,
            false,
        );
        assert_eq!(out.attacker_queued, 150);
    }

    #[test]
    fn test_below_range_win_pays_nothing_or_penalizes() {
        let out = changes(70.0, true, false);
        assert_eq!(out.attacker_queued, 0);
        assert_eq!(out.defender_delta, 0);
        // 70 is above the bullying line, so no penalty either
        assert_eq!(out.attacker_immediate, 0);
        let bully = changes(50.0, true, false);
        assert_eq!(bully.attacker_immediate, -25);
    }

    #[test]
    fn test_overwhelmed_attacker_pays() {
        let out = changes(80.0, false, true);
        assert_eq!(out.attacker_immediate, -25);
        assert_eq!(out.attacker_queued, 0);
    }

    #[test]
    fn test_weekly_hits_devalue_target() {
        let fresh = prestige_changes(
            &dom(1, 500), &dom(2, 600), 80.0, WarFooting::None, true, false, 0, false,
        );
        let farmed = prestige_changes(
            &dom(1, 500), &dom(2, 600), 80.0, WarFooting::None, true, false, 3, false,
        );
        assert!(farmed.attacker_queued < fresh.attacker_queued);
        // Defender bleeds faster the more often it falls
        assert!(farmed.defender_delta < fresh.defender_delta);
    }

    #[test]
    fn test_repeat_invasion_zeroes_gain_not_loss() {
        let out = prestige_changes(
            &dom(1, 500), &dom(2, 600), 80.0, WarFooting::None, true, false, 0, true,
        );
        assert_eq!(out.attacker_queued, 0);
        assert!(out.defender_delta < 0);
    }

    #[test]
    fn test_gain_floor_of_20() {
        let out = prestige_changes(
            &dom(1, 500), &dom(2, 0), 80.0, WarFooting::None, true, false, 8, false,
        );
        assert_eq!(out.attacker_queued, 20);
    }

    #[test]
    fn test_research_points_range_gates() {
        let a = dom(1, 500);
        assert_eq!(research_points(&a, 10, 50.0, true, false), 0);
        assert_eq!(research_points(&a, 10, 80.0, false, false), 0);
        assert_eq!(research_points(&a, 10, 65.0, true, false), 500);
        assert_eq!(research_points(&a, 10, 80.0, true, false), 1000);
        // Day 60: base is day / 0.03 = 2000
        assert_eq!(research_points(&a, 60, 80.0, true, false), 2000);
    }

    #[test]
    fn test_research_points_zero_on_repeat() {
        let a = dom(1, 500);
        assert_eq!(research_points(&a, 60, 80.0, true, true), 0);
    }

    #[test]
    fn test_schools_pay_only_at_top_range() {
        let mut a = dom(1, 500);
        a.buildings.insert(BuildingType::School, 100);
        // 10% school share: 130 * 0.10 * 100 = 1300 on top of the base
        assert_eq!(research_points(&a, 10, 80.0, true, false), 2300);
        // Below 75% the schools are ignored and the base halves
        assert_eq!(research_points(&a, 10, 65.0, true, false), 500);
        // Share is capped at 20% of land
        a.buildings.insert(BuildingType::School, 500);
        assert_eq!(research_points(&a, 10, 80.0, true, false), 3600);
    }

    #[test]
    fn test_heavy_raiding_thins_the_school_bonus() {
        let mut a = dom(1, 500);
        a.buildings.insert(BuildingType::School, 100);
        a.recent_attacks = vec![1, 5, 20, 40];
        // Four raids in three days: 1 - 2 * 0.15 = 0.70 of the school bonus
        assert_eq!(research_points(&a, 10, 80.0, true, false), 1000 + 910);
    }

    #[test]
    fn test_tech_production_perks_multiply() {
        let mut a = dom(1, 500);
        a.race.perks.insert(RacePerk::TechProduction, 0.10);
        assert_eq!(research_points(&a, 10, 80.0, true, false), 1100);
    }
}
