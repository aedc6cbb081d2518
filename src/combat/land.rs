//! Land conquest and transfer
//!
//! Conquered acreage is sized against the attacker's own holdings with a
//! piecewise curve over the relative-size ratio, then taken from the
//! defender's terrains proportionally. The per-terrain split uses a
//! largest-remainder distribution so the parts always sum exactly to the
//! acres the defender lost. Successful attackers additionally generate bonus
//! land out of nothing, unless they are farming the same target back-to-back.

use crate::core::config::config;
use crate::core::types::{BuildingType, Terrain, WarFooting};
use crate::dominion::Dominion;
use crate::spells::SpellKey;

/// Everything one successful invasion moves or creates, land-wise
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandTransfer {
    /// Acres removed from the defender in total
    pub acres_lost: i64,
    /// Defender's loss, by terrain; sums exactly to `acres_lost`
    pub taken: [i64; 7],
    /// What arrives for the attacker after transit, by terrain. Includes the
    /// generated bonus and any aura-driven terrain shifts.
    pub attacker_gains: [i64; 7],
    /// Newly created acres within `attacker_gains`
    pub generated: i64,
    /// Defender structures razed along with the ground under them
    pub buildings_destroyed: Vec<(BuildingType, i64)>,
    /// Acres the attacker may rebuild at a discount
    pub discounted: i64,
}

impl LandTransfer {
    pub fn total_gained(&self) -> i64 {
        self.attacker_gains.iter().sum()
    }
}

/// Base conquest size: a piecewise curve over the relative-size ratio,
/// applied to the attacker's own land. Hitting up pays progressively more.
fn base_acres(attacker_land: i64, ratio: f64) -> f64 {
    let curve = if ratio < 0.55 {
        0.304 * ratio * ratio - 0.227 * ratio + 0.048
    } else if ratio < 0.75 {
        0.154 * ratio - 0.069
    } else {
        0.129 * ratio - 0.048
    };
    attacker_land as f64 * curve.max(0.0)
}

/// Split `total` over the terrains proportionally to `held`, assigning
/// leftover acres by largest fractional remainder. The result sums to
/// `total` exactly and never exceeds what is held anywhere.
fn distribute(held: &[i64; 7], total: i64) -> [i64; 7] {
    let sum: i64 = held.iter().sum();
    let mut out = [0i64; 7];
    if sum == 0 || total == 0 {
        return out;
    }
    let mut remainders: Vec<(usize, f64)> = Vec::with_capacity(7);
    let mut assigned = 0;
    for (i, &acres) in held.iter().enumerate() {
        let quota = total as f64 * acres as f64 / sum as f64;
        out[i] = (quota.floor() as i64).min(acres);
        assigned += out[i];
        remainders.push((i, quota - out[i] as f64));
    }
    remainders.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut leftover = total - assigned;
    while leftover > 0 {
        let before = leftover;
        for &(i, _) in &remainders {
            if leftover == 0 {
                break;
            }
            if out[i] < held[i] {
                out[i] += 1;
                leftover -= 1;
            }
        }
        if leftover == before {
            break;
        }
    }
    out
}

/// Move `amount` acres within a gains array into `into`, draining the
/// other terrains largest-first
fn reassign(gains: &mut [i64; 7], into: Terrain, amount: i64) {
    let mut remaining = amount;
    while remaining > 0 {
        let donor = (0..7)
            .filter(|&i| i != into.index() && gains[i] > 0)
            .max_by_key(|&i| gains[i]);
        match donor {
            Some(i) => {
                let moved = gains[i].min(remaining);
                gains[i] -= moved;
                gains[into.index()] += moved;
                remaining -= moved;
            }
            None => break,
        }
    }
}

/// Compute the full land outcome of a successful invasion.
///
/// `repeat_invasion` suppresses the generated bonus: hitting the same
/// target again inside the trailing window takes ground but creates none.
pub fn land_grab(
    attacker: &Dominion,
    defender: &Dominion,
    footing: WarFooting,
    repeat_invasion: bool,
) -> LandTransfer {
    let cfg = config();
    let defender_land = defender.total_land();
    let ratio = defender_land as f64 / attacker.total_land().max(1) as f64;

    let acres = base_acres(attacker.total_land(), ratio) * footing.land_grab_ratio() * 0.90;
    let acres_lost = (acres.floor() as i64)
        .max(cfg.min_acres_conquered)
        .min(defender_land);

    let taken = distribute(&defender.land, acres_lost);

    let generated = if repeat_invasion {
        0
    } else {
        (acres_lost as f64 * (cfg.bonus_land_ratio - 1.0)).floor() as i64
    };

    // The attacker's own terraforming auras reshape everything that arrives,
    // conquered and generated alike
    let mut attacker_gains = taken;
    attacker_gains[Terrain::Plain.index()] += generated;
    if attacker.spell_active(SpellKey::Erosion) {
        let flooded = ((acres_lost + generated) as f64 * 0.20).ceil() as i64;
        reassign(&mut attacker_gains, Terrain::Water, flooded);
    }
    if attacker.spell_active(SpellKey::VerdantBloom) {
        let overgrown = ((acres_lost + generated) as f64 * 0.35).ceil() as i64;
        reassign(&mut attacker_gains, Terrain::Forest, overgrown);
    }

    let mut buildings_destroyed = Vec::new();
    if defender_land > 0 {
        let lost_share = acres_lost as f64 / defender_land as f64;
        for (&building, &count) in &defender.buildings {
            let razed = (count as f64 * lost_share).floor() as i64;
            if razed > 0 {
                buildings_destroyed.push((building, razed.min(count)));
            }
        }
        buildings_destroyed.sort_by_key(|(b, _)| *b as u8);
    }

    let range = attacker.range_to(defender);
    let discounted = if range >= 75.0 { acres_lost } else { 0 };

    LandTransfer { acres_lost, taken, attacker_gains, generated, buildings_destroyed, discounted }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DominionId, RealmId, RoundId};
    use crate::dominion::race::Race;

    fn dom(id: u32, acres: i64) -> Dominion {
        Dominion::seeded(DominionId(id), RealmId(id), RoundId(1), "T", Race::legion(), acres)
    }

    #[test]
    fn test_distribute_sums_exactly() {
        let held = [333, 167, 89, 41, 13, 7, 0];
        for total in [1, 10, 100, 650] {
            let parts = distribute(&held, total);
            assert_eq!(parts.iter().sum::<i64>(), total, "total {total}");
            for i in 0..7 {
                assert!(parts[i] <= held[i]);
            }
        }
    }

    #[test]
    fn test_distribute_empty_source() {
        assert_eq!(distribute(&[0; 7], 50), [0; 7]);
    }

    #[test]
    fn test_taken_matches_acres_lost() {
        let attacker = dom(1, 1000);
        let defender = dom(2, 800);
        let transfer = land_grab(&attacker, &defender, WarFooting::None, false);
        assert_eq!(transfer.taken.iter().sum::<i64>(), transfer.acres_lost);
    }

    #[test]
    fn test_minimum_grab_floor() {
        let attacker = dom(1, 100);
        let defender = dom(2, 41);
        // Near the curve's zero crossing the raw grab rounds to nothing
        let transfer = land_grab(&attacker, &defender, WarFooting::None, false);
        assert_eq!(transfer.acres_lost, 10);
    }

    #[test]
    fn test_war_takes_more() {
        let attacker = dom(1, 1000);
        let defender = dom(2, 1000);
        let peace = land_grab(&attacker, &defender, WarFooting::None, false);
        let war = land_grab(&attacker, &defender, WarFooting::War, false);
        let mutual = land_grab(&attacker, &defender, WarFooting::MutualWar, false);
        assert!(war.acres_lost > peace.acres_lost);
        assert!(mutual.acres_lost > war.acres_lost);
    }

    #[test]
    fn test_generated_bonus_and_repeat_suppression() {
        let attacker = dom(1, 1000);
        let defender = dom(2, 1000);
        let first = land_grab(&attacker, &defender, WarFooting::None, false);
        assert_eq!(first.generated, (first.acres_lost as f64 * 0.6667).floor() as i64);
        assert_eq!(first.total_gained(), first.acres_lost + first.generated);
        let repeat = land_grab(&attacker, &defender, WarFooting::None, true);
        assert_eq!(repeat.generated, 0);
        assert_eq!(repeat.total_gained(), repeat.acres_lost);
    }

    #[test]
    fn test_erosion_diverts_gains_to_water() {
        let mut attacker = dom(1, 1000);
        attacker.active_spells.push(crate::dominion::ActiveSpell {
            key: SpellKey::Erosion,
            remaining: 6,
            cast_by: DominionId(1),
        });
        let defender = dom(2, 1000);
        let plain = land_grab(&dom(1, 1000), &defender, WarFooting::None, false);
        let eroded = land_grab(&attacker, &defender, WarFooting::None, false);
        // The aura reshapes the gains without changing their total
        assert_eq!(eroded.total_gained(), plain.total_gained());
        let flooded = ((eroded.acres_lost + eroded.generated) as f64 * 0.20).ceil() as i64;
        assert!(eroded.attacker_gains[Terrain::Water.index()] >= flooded);
        // The defender's auras have no say in where the ground goes
        let mut warded = dom(2, 1000);
        warded.active_spells.push(crate::dominion::ActiveSpell {
            key: SpellKey::Erosion,
            remaining: 6,
            cast_by: DominionId(2),
        });
        let unmoved = land_grab(&dom(1, 1000), &warded, WarFooting::None, false);
        assert_eq!(unmoved.attacker_gains, plain.attacker_gains);
    }

    #[test]
    fn test_verdant_bloom_overgrows_generated_acres_too() {
        let mut attacker = dom(1, 1000);
        attacker.active_spells.push(crate::dominion::ActiveSpell {
            key: SpellKey::VerdantBloom,
            remaining: 6,
            cast_by: DominionId(1),
        });
        let bloomed = land_grab(&attacker, &dom(2, 1000), WarFooting::None, false);
        let overgrown =
            ((bloomed.acres_lost + bloomed.generated) as f64 * 0.35).ceil() as i64;
        assert!(bloomed.attacker_gains[Terrain::Forest.index()] >= overgrown);
    }

    #[test]
    fn test_buildings_razed_proportionally() {
        let attacker = dom(1, 1000);
        let mut defender = dom(2, 1000);
        defender.buildings.insert(BuildingType::Farm, 100);
        defender.buildings.insert(BuildingType::Home, 200);
        let transfer = land_grab(&attacker, &defender, WarFooting::None, false);
        let lost_share = transfer.acres_lost as f64 / 1000.0;
        for (building, razed) in &transfer.buildings_destroyed {
            let held = defender.building_count(*building);
            assert_eq!(*razed, (held as f64 * lost_share).floor() as i64);
        }
    }

    #[test]
    fn test_discount_only_in_prestige_range() {
        let attacker = dom(1, 1000);
        let close = dom(2, 800);
        let far = dom(3, 700);
        assert!(land_grab(&attacker, &close, WarFooting::None, false).discounted > 0);
        assert_eq!(land_grab(&attacker, &far, WarFooting::None, false).discounted, 0);
    }

    #[test]
    fn test_never_takes_more_than_defender_has() {
        let attacker = dom(1, 100_000);
        let defender = dom(2, 70);
        let transfer = land_grab(&attacker, &defender, WarFooting::MutualWar, false);
        assert!(transfer.acres_lost <= 70);
    }
}
