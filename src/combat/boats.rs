//! Naval logistics: boat requirements and sinking
//!
//! Units that need sea transport consume boat capacity to invade: their
//! hulls leave the moored stock at launch and sail back with each returning
//! wave. Some rosters carry units that hole enemy hulls in passing; docks
//! shelter part of the fleet from that. Sunk boats come out of the queue
//! (boats still being built or in transit) before touching the moored
//! stock, which the resolver handles at commit time from the plan computed
//! here.

use crate::core::config::config;
use crate::core::types::{Hours, UnitSlot};
use crate::dominion::Dominion;

/// Boat movement of one invasion
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoatPlan {
    /// Boats the attacker must commit to carry the sent force
    pub boats_needed: f64,
    /// Attacker boats sunk by the defender's fleet-hunting units
    pub attacker_boats_sunk: f64,
    /// Defender boats sunk by the attacker's (successful invasions only)
    pub defender_boats_sunk: f64,
}

/// Whole hulls committed per return-trip length: seaborne headcount over
/// capacity, rounded up within each wave, sorted fastest wave first
pub fn boat_commitment(attacker: &Dominion, sent: &[i64; 4]) -> Vec<(Hours, i64)> {
    let capacity = config().boat_capacity as f64;
    let mut waves: Vec<(Hours, i64)> = Vec::new();
    for slot in UnitSlot::ALL {
        let unit = attacker.race.unit(slot);
        if unit.needs_boat && sent[slot.index()] > 0 {
            match waves.iter_mut().find(|(hours, _)| *hours == unit.return_hours) {
                Some((_, seaborne)) => *seaborne += sent[slot.index()],
                None => waves.push((unit.return_hours, sent[slot.index()])),
            }
        }
    }
    for (_, count) in &mut waves {
        *count = (*count as f64 / capacity).ceil() as i64;
    }
    waves.sort_by_key(|&(hours, _)| hours);
    waves
}

/// Total boats required to carry a force
pub fn boats_needed(attacker: &Dominion, sent: &[i64; 4]) -> f64 {
    boat_commitment(attacker, sent).iter().map(|&(_, hulls)| hulls).sum::<i64>() as f64
}

/// Boats beyond dock protection
fn unprotected(dominion: &Dominion) -> f64 {
    let sheltered = dominion.building_count(crate::core::types::BuildingType::Dock) as f64
        * config().boats_protected_per_dock;
    (dominion.resources.boats - sheltered).max(0.0)
}

/// Fraction of a force made of boat-sinking units
fn sinker_share(dominion: &Dominion, counts: &[i64; 4], offense: bool) -> f64 {
    let total: i64 = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let mut sinkers = 0i64;
    for slot in UnitSlot::ALL {
        let unit = dominion.race.unit(slot);
        let sinks = if offense { unit.sinks_boats_on_offense() } else { unit.sinks_boats_on_defense() };
        if sinks {
            sinkers += counts[slot.index()];
        }
    }
    sinkers as f64 / total as f64
}

/// Full boat outcome of one invasion
pub fn plan_boats(
    attacker: &Dominion,
    defender: &Dominion,
    sent: &[i64; 4],
    success: bool,
) -> BoatPlan {
    let cfg = config();

    let defender_sinker_share = sinker_share(defender, &defender.military.units, false);
    let attacker_boats_sunk = if defender_sinker_share > 0.0 {
        let exposed = unprotected(attacker);
        (exposed * cfg.boats_sunk_rate * defender_sinker_share).min(exposed)
    } else {
        0.0
    };

    let attacker_sinker_share = sinker_share(attacker, sent, true);
    let defender_boats_sunk = if success && attacker_sinker_share > 0.0 {
        let exposed = unprotected(defender);
        (exposed * cfg.boats_sunk_rate * attacker_sinker_share).min(exposed)
    } else {
        0.0
    };

    BoatPlan {
        boats_needed: boats_needed(attacker, sent),
        attacker_boats_sunk,
        defender_boats_sunk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{BuildingType, DominionId, RealmId, RoundId};
    use crate::dominion::race::Race;

    fn dom(id: u32, race: Race) -> Dominion {
        let mut d = Dominion::seeded(DominionId(id), RealmId(id), RoundId(1), "T", race, 1000);
        d.resources.boats = 100.0;
        d
    }

    #[test]
    fn test_boats_needed_rounds_up() {
        let a = dom(1, Race::legion());
        // Slinger (slot two) marches overland
        assert_eq!(boats_needed(&a, &[31, 100, 0, 0]), 2.0);
        assert_eq!(boats_needed(&a, &[30, 0, 0, 0]), 1.0);
        assert_eq!(boats_needed(&a, &[0, 500, 0, 0]), 0.0);
    }

    #[test]
    fn test_commitment_splits_by_return_trip() {
        let a = dom(1, Race::lycanthrope());
        // Werewolves (slot three) sail home in 9 hours, everyone else in 12
        let waves = boat_commitment(&a, &[31, 0, 31, 0]);
        assert_eq!(waves, vec![(9, 2), (12, 2)]);
        assert_eq!(boats_needed(&a, &[31, 0, 31, 0]), 4.0);
    }

    #[test]
    fn test_no_sinkers_no_sinking() {
        let a = dom(1, Race::legion());
        let d = dom(2, Race::legion());
        let plan = plan_boats(&a, &d, &[100, 0, 0, 0], true);
        assert_eq!(plan.attacker_boats_sunk, 0.0);
        assert_eq!(plan.defender_boats_sunk, 0.0);
    }

    #[test]
    fn test_harpooners_sink_attacker_boats() {
        let a = dom(1, Race::legion());
        let mut d = dom(2, Race::buccaneer());
        d.military.units = [0, 0, 0, 1000];
        let plan = plan_boats(&a, &d, &[100, 0, 0, 0], false);
        // Entire garrison sinks: full 5% of the unprotected fleet
        assert!((plan.attacker_boats_sunk - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_docks_shelter_boats() {
        let mut a = dom(1, Race::legion());
        a.buildings.insert(BuildingType::Dock, 30);
        let mut d = dom(2, Race::buccaneer());
        d.military.units = [0, 0, 0, 1000];
        let plan = plan_boats(&a, &d, &[100, 0, 0, 0], false);
        // 75 boats sheltered, 25 exposed
        assert!((plan.attacker_boats_sunk - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_corsairs_only_sink_on_success() {
        let a = dom(1, Race::buccaneer());
        let d = dom(2, Race::legion());
        let sent = [0, 0, 1000, 0];
        let won = plan_boats(&a, &d, &sent, true);
        let lost = plan_boats(&a, &d, &sent, false);
        assert!(won.defender_boats_sunk > 0.0);
        assert_eq!(lost.defender_boats_sunk, 0.0);
    }

    #[test]
    fn test_mixed_force_scales_by_share() {
        let a = dom(1, Race::buccaneer());
        let d = dom(2, Race::legion());
        let pure = plan_boats(&a, &d, &[0, 0, 1000, 0], true);
        let mixed = plan_boats(&a, &d, &[1000, 0, 1000, 0], true);
        assert!((mixed.defender_boats_sunk - pure.defender_boats_sunk / 2.0).abs() < 1e-9);
    }
}
