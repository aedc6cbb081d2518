//! Precondition guards
//!
//! Every check that must pass before an operation mutates anything. Checks
//! run in a fixed order and the first failure wins, so callers see stable,
//! reproducible refusal messages. All failures are
//! [`EngineError::Precondition`]: nothing here inspects post-mutation state.

use crate::core::config::config;
use crate::core::error::{EngineError, Result};
use crate::core::types::UnitSlot;
use crate::dominion::Dominion;
use crate::external::RoundClock;
use crate::power::{defensive_power, offensive_power, DefenseOptions};
use crate::spells::{Spell, SpellCategory};

fn ensure(cond: bool, reason: &str) -> Result<()> {
    if cond {
        Ok(())
    } else {
        Err(EngineError::precondition(reason))
    }
}

/// Shared checks for any operation against another dominion
fn check_hostile_pair(actor: &Dominion, target: &Dominion) -> Result<()> {
    ensure(actor.id != target.id, "cannot target yourself")?;
    ensure(actor.realm != target.realm, "cannot target your own realm")?;
    ensure(actor.round == target.round, "target is not in this round")?;
    ensure(!actor.locked && !target.locked, "dominion is locked")?;
    ensure(!actor.under_protection, "you are still under protection")?;
    ensure(!target.under_protection, "target is still under protection")?;
    Ok(())
}

/// Range check against the actor's guard window. A target that invaded the
/// actor recently stays valid regardless of range, so retaliation is always
/// possible.
fn check_range(actor: &Dominion, target: &Dominion) -> Result<()> {
    let cfg = config();
    if actor.recently_invaded_by(target.id, cfg.retaliation_window) > 0 {
        return Ok(());
    }
    let range = actor.range_to(target);
    let (lo, hi) = actor.guard.range_bounds();
    if range < lo || range > hi {
        return Err(EngineError::precondition(format!(
            "target at {:.0}% is outside your {:.0}%-{:.0}% range",
            range, lo, hi
        )));
    }
    Ok(())
}

/// Full invasion precondition ladder, in order:
///
/// 1. round accepts offensive actions
/// 2. pair is attackable (realms, protection, locks)
/// 3. attacker morale
/// 4. target in range (or valid retaliation)
/// 5. sent force is non-empty and at home
/// 6. enough boats for the seaborne part
/// 7. 33% rule: at least a third of home defense stays home
/// 8. 5:4 rule: sent OP at most 1.25x the defense left behind
pub fn check_invasion(
    attacker: &Dominion,
    defender: &Dominion,
    sent: &[i64; 4],
    clock: &dyn RoundClock,
) -> Result<()> {
    let cfg = config();
    ensure(!clock.offensive_actions_disabled(), "offensive actions are currently disabled")?;
    check_hostile_pair(attacker, defender)?;
    ensure(
        attacker.morale >= cfg.min_morale_to_invade,
        "morale is too low to invade",
    )?;
    check_range(attacker, defender)?;

    let total_sent: i64 = sent.iter().sum();
    ensure(total_sent > 0, "no units sent")?;
    for slot in UnitSlot::ALL {
        if sent[slot.index()] < 0 {
            return Err(EngineError::precondition("sent unit counts cannot be negative"));
        }
        if sent[slot.index()] > attacker.military.slot(slot) {
            return Err(EngineError::precondition(format!(
                "not enough {} at home",
                attacker.race.unit(slot).name
            )));
        }
    }

    let needed = crate::combat::boats::boats_needed(attacker, sent);
    ensure(attacker.resources.boats >= needed, "not enough boats to carry the army")?;

    let mut home = attacker.clone();
    for slot in UnitSlot::ALL {
        *home.military.slot_mut(slot) -= sent[slot.index()];
    }
    let dp_before = defensive_power(attacker, &DefenseOptions::default());
    let dp_after = defensive_power(&home, &DefenseOptions::default());
    ensure(
        dp_after >= dp_before / 3.0,
        "you must leave at least a third of your defense at home",
    )?;

    let land_ratio = defender.total_land() as f64 / attacker.total_land().max(1) as f64;
    let op_sent = offensive_power(attacker, Some(land_ratio), Some(sent));
    ensure(
        op_sent <= dp_after * 1.25,
        "sent offense cannot exceed 125% of the defense left at home",
    )?;

    Ok(())
}

/// Spell precondition ladder, in order:
///
/// 1. caster can pay (wizard strength floor and cost, mana)
/// 2. self buffs target only the caster; everything else needs a hostile pair
/// 3. hostile casts respect the round's opening gate and the range window
pub fn check_spell(
    caster: &Dominion,
    target: &Dominion,
    spell: &Spell,
    clock: &dyn RoundClock,
) -> Result<()> {
    let cfg = config();
    ensure(
        caster.wizard_strength >= cfg.min_wizard_strength,
        "wizard strength is too low to cast",
    )?;
    ensure(
        caster.wizard_strength >= spell.strength_cost,
        "not enough wizard strength for this spell",
    )?;
    let mana_cost = (spell.mana_cost_per_acre * caster.total_land() as f64).ceil() as i64;
    ensure(caster.resources.mana >= mana_cost, "not enough mana")?;
    ensure(!caster.locked, "dominion is locked")?;

    match spell.category {
        SpellCategory::SelfBuff => {
            ensure(caster.id == target.id, "this spell can only be cast on yourself")?;
        }
        SpellCategory::Info => {
            check_hostile_pair(caster, target)?;
            check_range(caster, target)?;
        }
        SpellCategory::BlackOp | SpellCategory::WarSpell => {
            ensure(!clock.offensive_actions_disabled(), "offensive actions are currently disabled")?;
            ensure(
                clock.hours_since_round_start() >= cfg.black_ops_gate_hours,
                "hostile magic is not yet enabled this round",
            )?;
            check_hostile_pair(caster, target)?;
            check_range(caster, target)?;
        }
    }
    Ok(())
}
