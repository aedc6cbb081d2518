//! The invasion pipeline
//!
//! Runs entirely on working copies of both snapshots plus a working copy of
//! the deferred-effects queue; the resolver validates and persists only
//! after the whole pipeline succeeds. Step order matters: casualties are
//! charged before conversions read them, land moves before plunder reads
//! the defender's remaining economy.

use tracing::debug;

use crate::combat::boats::{boat_commitment, plan_boats};
use crate::combat::casualties::{defensive_casualties, offensive_casualties};
use crate::combat::land::land_grab;
use crate::combat::prestige::{prestige_changes, research_points};
use crate::core::config::config;
use crate::core::error::Result;
use crate::core::types::{Hours, Resource, UnitSlot, WarFooting};
use crate::dominion::{Dominion, InvasionStamp};
use crate::external::RoundClock;
use crate::ops::success::{invasion_succeeds, is_overwhelmed};
use crate::power::{defensive_power, offensive_power, temple_reduction, DefenseOptions};
use crate::queue::{DeferredEffectsQueue, EffectKey, EffectOrigin};
use crate::resolve::guards;
use crate::resolve::result::InvasionResult;
use crate::spells::SpellKey;

/// A submitted invasion order
#[derive(Debug, Clone)]
pub struct InvasionOrder {
    pub attacker: crate::core::types::DominionId,
    pub defender: crate::core::types::DominionId,
    pub sent: [i64; 4],
}

/// Deduct boats, draining queued hulls before moored stock
fn sink_boats(dominion: &mut Dominion, queue: &mut DeferredEffectsQueue, amount: f64) {
    if amount <= 0.0 {
        return;
    }
    let whole = amount.floor() as i64;
    let dequeued = queue.dequeue_partial(dominion.id, EffectKey::Resource(Resource::Boats), whole);
    let rest = amount - dequeued as f64;
    dominion.resources.boats = (dominion.resources.boats - rest).max(0.0);
}

/// Slowest return trip among the slots actually sent
fn slowest_return(attacker: &Dominion, sent: &[i64; 4]) -> Hours {
    UnitSlot::ALL
        .iter()
        .filter(|slot| sent[slot.index()] > 0)
        .map(|slot| attacker.race.unit(*slot).return_hours)
        .max()
        .unwrap_or(config().land_return_hours)
}

/// Resolve one invasion against working copies.
///
/// Both snapshots and the queue are mutated freely; the caller owns
/// validation and persistence.
pub(crate) fn resolve_invasion_inner(
    attacker: &mut Dominion,
    defender: &mut Dominion,
    sent: &[i64; 4],
    footing: WarFooting,
    clock: &dyn RoundClock,
    queue: &mut DeferredEffectsQueue,
) -> Result<InvasionResult> {
    let cfg = config();
    guards::check_invasion(attacker, defender, sent, clock)?;

    let range = attacker.range_to(defender);
    let land_ratio = range / 100.0;

    // Unholy Ghost is the attacker's aura: it strips the defender's
    // draftees out of the line entirely
    let ghost = attacker.spell_active(SpellKey::UnholyGhost);
    let defense_opts = DefenseOptions {
        multiplier_reduction: temple_reduction(attacker),
        ignore_draftees: ghost,
    };
    let op = offensive_power(attacker, Some(land_ratio), Some(sent));
    let dp = defensive_power(defender, &defense_opts);

    let success = invasion_succeeds(op, dp);
    let overwhelmed = !success && is_overwhelmed(op, dp);

    let repeat_invasion = defender.recently_invaded_by(attacker.id, cfg.repeat_invasion_window) > 0;
    let weekly_invasions = defender.recently_invaded_count(cfg.weekly_window);
    let daily_invasions = defender.recently_invaded_count(24);

    debug!(
        attacker = attacker.id.0,
        defender = defender.id.0,
        op,
        dp,
        range,
        success,
        overwhelmed,
        "invasion rolled"
    );

    // Boats: the carried force's hulls leave the moored stock now and sail
    // back with each returning wave
    let boat_plan = plan_boats(attacker, defender, sent, success);
    attacker.resources.boats = (attacker.resources.boats - boat_plan.boats_needed).max(0.0);
    for (hours, hulls) in boat_commitment(attacker, sent) {
        queue.enqueue(
            attacker.id,
            EffectKey::Resource(Resource::Boats),
            hulls,
            hours,
            EffectOrigin::Invasion,
        )?;
    }
    sink_boats(attacker, queue, boat_plan.attacker_boats_sunk);
    sink_boats(defender, queue, boat_plan.defender_boats_sunk);

    // Prestige
    let prestige = prestige_changes(
        attacker,
        defender,
        range,
        footing,
        success,
        overwhelmed,
        weekly_invasions,
        repeat_invasion,
    );
    attacker.prestige = (attacker.prestige + prestige.attacker_immediate).max(0);
    defender.prestige = (defender.prestige + prestige.defender_delta).max(0);
    let return_hours = slowest_return(attacker, sent);
    if prestige.attacker_queued > 0 {
        queue.enqueue(
            attacker.id,
            EffectKey::Prestige,
            prestige.attacker_queued,
            return_hours,
            EffectOrigin::Invasion,
        )?;
    }

    // Attacker casualties; the whole sent force leaves home now
    let attacker_losses = offensive_casualties(attacker, sent, op, dp, success, overwhelmed);
    for slot in UnitSlot::ALL {
        *attacker.military.slot_mut(slot) -= sent[slot.index()];
    }

    // Defender casualties
    let defender_losses =
        defensive_casualties(defender, op, dp, land_ratio, overwhelmed, daily_invasions, ghost);
    for slot in UnitSlot::ALL {
        *defender.military.slot_mut(slot) -= defender_losses.units[slot.index()];
    }
    defender.military.draftees -= defender_losses.draftees;

    // Conversions: surviving converters raise a share of the fallen
    let mut converted = [0i64; 4];
    if success {
        let mut converting = 0i64;
        let mut targets: Vec<UnitSlot> = Vec::new();
        for slot in UnitSlot::ALL {
            if let Some(into) = attacker.race.unit(slot).conversion_targets() {
                converting += sent[slot.index()] - attacker_losses[slot.index()];
                for t in into {
                    if !targets.contains(t) {
                        targets.push(*t);
                    }
                }
            }
        }
        if converting > 0 && !targets.is_empty() {
            let raw = converting as f64 * cfg.conversion_rate * land_ratio.min(1.0);
            let cap = defender_losses.total() as f64 * 1.65;
            let total = raw.min(cap).floor() as i64;
            let share = total / targets.len() as i64;
            for t in &targets {
                converted[t.index()] = share;
            }
        }
    }

    // Land
    let (acres_conquered, acres_generated) = if success {
        let defender_land_before = defender.total_land();
        let transfer = land_grab(attacker, defender, footing, repeat_invasion);
        for i in 0..7 {
            defender.land[i] -= transfer.taken[i];
        }
        for (building, razed) in &transfer.buildings_destroyed {
            if let Some(count) = defender.buildings.get_mut(building) {
                *count -= razed;
            }
        }
        // Construction on the conquered ground is lost with it
        if defender_land_before > 0 {
            let lost_share = transfer.acres_lost as f64 / defender_land_before as f64;
            for building in crate::core::types::BuildingType::ALL {
                let in_progress = queue.total(defender.id, EffectKey::Building(building));
                let abandoned = (in_progress as f64 * lost_share).floor() as i64;
                if abandoned > 0 {
                    queue.dequeue_partial(defender.id, EffectKey::Building(building), abandoned);
                }
            }
        }
        for terrain in crate::core::types::Terrain::ALL {
            let gained = transfer.attacker_gains[terrain.index()];
            if gained > 0 {
                queue.enqueue(
                    attacker.id,
                    EffectKey::Land(terrain),
                    gained,
                    cfg.land_return_hours,
                    EffectOrigin::Invasion,
                )?;
            }
        }
        if transfer.discounted > 0 {
            queue.enqueue(
                attacker.id,
                EffectKey::DiscountedLand,
                transfer.discounted,
                cfg.land_return_hours,
                EffectOrigin::Invasion,
            )?;
        }
        (transfer.acres_lost, transfer.generated)
    } else {
        (0, 0)
    };

    // Plunder, capped by a day of the target's raw output
    let mut plunder_platinum = 0i64;
    let mut plunder_gems = 0i64;
    if success {
        for slot in UnitSlot::ALL {
            if let Some((plat, gems)) = attacker.race.unit(slot).plunder() {
                let survivors = sent[slot.index()] - attacker_losses[slot.index()];
                plunder_platinum += survivors * plat;
                plunder_gems += survivors * gems;
            }
        }
        plunder_platinum = plunder_platinum
            .min((defender.platinum_production_raw() * 24.0) as i64)
            .min(defender.resources.platinum);
        plunder_gems = plunder_gems
            .min((defender.gem_production_raw() * 24.0) as i64)
            .min(defender.resources.gems);
        defender.resources.platinum -= plunder_platinum;
        defender.resources.gems -= plunder_gems;
        if plunder_platinum > 0 {
            queue.enqueue(
                attacker.id,
                EffectKey::Resource(Resource::Platinum),
                plunder_platinum,
                return_hours,
                EffectOrigin::Invasion,
            )?;
        }
        if plunder_gems > 0 {
            queue.enqueue(
                attacker.id,
                EffectKey::Resource(Resource::Gems),
                plunder_gems,
                return_hours,
                EffectOrigin::Invasion,
            )?;
        }
    }

    // Research points travel home with the slowest returning unit
    let research = research_points(attacker, clock.round_day(), range, success, repeat_invasion);
    if research > 0 {
        queue.enqueue(
            attacker.id,
            EffectKey::Resource(Resource::Tech),
            research,
            return_hours,
            EffectOrigin::Invasion,
        )?;
    }

    // Morale: every launch costs, hitting down costs more
    attacker.morale -= 5;
    if range < 75.0 {
        attacker.morale -= 5;
    }
    attacker.morale = attacker.morale.max(0);

    // Returning survivors and converts
    for slot in UnitSlot::ALL {
        let survivors = sent[slot.index()] - attacker_losses[slot.index()];
        let incoming = survivors + converted[slot.index()];
        if incoming > 0 {
            queue.enqueue(
                attacker.id,
                EffectKey::Unit(slot),
                incoming,
                attacker.race.unit(slot).return_hours,
                EffectOrigin::Invasion,
            )?;
        }
    }

    defender
        .recent_invasions
        .insert(0, InvasionStamp { attacker: attacker.id, hours_ago: 0 });
    attacker.recent_attacks.insert(0, 0);

    Ok(InvasionResult {
        attacker: attacker.id,
        defender: defender.id,
        success,
        overwhelmed,
        op,
        dp,
        range,
        attacker_losses,
        defender_losses: defender_losses.units,
        defender_draftee_losses: defender_losses.draftees,
        converted,
        acres_conquered,
        acres_generated,
        prestige_attacker_immediate: prestige.attacker_immediate,
        prestige_attacker_queued: prestige.attacker_queued,
        prestige_defender: prestige.defender_delta,
        research_points: research,
        boats_committed: boat_plan.boats_needed,
        attacker_boats_sunk: boat_plan.attacker_boats_sunk,
        defender_boats_sunk: boat_plan.defender_boats_sunk,
        plunder_platinum,
        plunder_gems,
    })
}
