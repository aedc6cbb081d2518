//! The spell pipeline
//!
//! Self buffs always land. Everything cast across the border rolls against
//! the wizard-ratio success curves, can bounce off an Energy Mirror, and
//! feeds the infamy/mastery/resilience ledger on success or costs wizards on
//! failure. Like invasions, all of this runs on working copies.

use rand::Rng;
use tracing::debug;

use crate::core::error::{EngineError, Result};
use crate::core::types::{Resource, UnitSlot, WarFooting};
use crate::dominion::{ActiveSpell, Dominion, PassivePerk};
use crate::external::RoundClock;
use crate::ops::ledger::{
    apply_infamy, infamy_gain, mastery_gain, mastery_loss, resilience_gain, resilience_reduction,
    SpecialistKind,
};
use crate::ops::losses::wizard_losses_on_failure;
use crate::ops::success::{black_op_chance, info_chance};
use crate::power::{wizard_ratio, RatioSide};
use crate::resolve::guards;
use crate::resolve::result::{DamageDealt, SpellResult};
use crate::spells::{DamageTarget, Spell, SpellCategory, SpellEffect, SpellKey};

/// Mid-round damage scaling: hostile percentages shrink as the round ages,
/// pinned flat before day 10 and after day 40
fn scale_by_day(day: u32) -> f64 {
    1.625 - 0.025 * day.clamp(10, 40) as f64
}

fn pay_costs(caster: &mut Dominion, spell: &Spell) -> i64 {
    let mana_cost = (spell.mana_cost_per_acre * caster.total_land() as f64).ceil() as i64;
    caster.resources.mana -= mana_cost;
    caster.wizard_strength -= spell.strength_cost;
    mana_cost
}

/// Replace any existing aura of the same key; recasting refreshes, it never
/// stacks
fn apply_aura(recipient: &mut Dominion, spell: &Spell, duration: u32, cast_by: crate::core::types::DominionId) {
    recipient.active_spells.retain(|s| s.key != spell.key);
    recipient.active_spells.push(ActiveSpell { key: spell.key, remaining: duration, cast_by });
}

/// Resolve a self buff. No roll: the only way this fails is a precondition.
/// A buff can be refreshed once it has started counting down, never while
/// still at full duration.
pub(crate) fn resolve_self_spell_inner(
    caster: &mut Dominion,
    spell: &Spell,
    clock: &dyn RoundClock,
) -> Result<SpellResult> {
    guards::check_spell(caster, &caster.clone(), spell, clock)?;
    let duration = ((spell.duration as f64)
        * (1.0 + caster.tech_perk(PassivePerk::SpellDuration)))
    .round() as u32;
    if caster
        .active_spells
        .iter()
        .any(|s| s.key == spell.key && s.remaining >= duration)
    {
        return Err(EngineError::precondition("that aura is already at full duration"));
    }
    let mana_spent = pay_costs(caster, spell);
    apply_aura(caster, spell, duration, caster.id);
    Ok(SpellResult {
        caster: caster.id,
        target: caster.id,
        spell: spell.key,
        success: true,
        reflected: false,
        chance: 1.0,
        mana_spent,
        duration,
        damage: Vec::new(),
        caster_wizards_lost: 0,
        caster_archmages_lost: 0,
        infamy_gained: 0,
    })
}

/// Apply one instant payload to whoever ended up receiving it
fn apply_damage(
    recipient: &mut Dominion,
    effects: &[SpellEffect],
    day: u32,
) -> Vec<DamageDealt> {
    let reduction = (resilience_reduction(recipient.wizard_resilience)
        + recipient.wonder_perk(PassivePerk::EnemySpellDamage))
    .min(0.8);
    let mut dealt = Vec::new();
    for effect in effects {
        let SpellEffect::Destroy { target, percent, scale_by_day: scaled } = effect;
        let mut fraction = percent / 100.0;
        if *scaled {
            fraction *= scale_by_day(day);
        }
        fraction *= 1.0 - reduction;
        let amount = match target {
            DamageTarget::Peasants => {
                let killed = ((recipient.peasants as f64 * fraction).floor() as i64)
                    .min(recipient.peasants);
                recipient.peasants -= killed;
                killed
            }
            DamageTarget::Spies => {
                let lost = ((recipient.military.spies as f64 * fraction).floor() as i64)
                    .min(recipient.military.spies);
                recipient.military.spies -= lost;
                // Disbanded, not dead
                recipient.military.draftees += lost;
                lost
            }
            DamageTarget::Stock(Resource::Boats) => {
                let sunk = recipient.resources.boats * fraction;
                recipient.resources.boats -= sunk;
                sunk.floor() as i64
            }
            DamageTarget::Stock(resource) => match stock_mut(recipient, *resource) {
                Some(stock) => {
                    let lost = ((*stock as f64 * fraction).floor() as i64).min(*stock);
                    *stock -= lost;
                    lost
                }
                None => 0,
            },
        };
        dealt.push(DamageDealt { target: *target, amount });
    }
    dealt
}

/// Integer stocks only; boats are handled separately as a fractional pool
fn stock_mut(dominion: &mut Dominion, resource: Resource) -> Option<&mut i64> {
    match resource {
        Resource::Platinum => Some(&mut dominion.resources.platinum),
        Resource::Food => Some(&mut dominion.resources.food),
        Resource::Lumber => Some(&mut dominion.resources.lumber),
        Resource::Mana => Some(&mut dominion.resources.mana),
        Resource::Ore => Some(&mut dominion.resources.ore),
        Resource::Gems => Some(&mut dominion.resources.gems),
        Resource::Tech => Some(&mut dominion.resources.tech),
        Resource::Boats => None,
    }
}

/// Resolve an info or hostile cast against a working copy of the target
pub(crate) fn resolve_targeted_spell_inner(
    caster: &mut Dominion,
    target: &mut Dominion,
    spell: &Spell,
    footing: WarFooting,
    clock: &dyn RoundClock,
    rng: &mut impl Rng,
) -> Result<SpellResult> {
    guards::check_spell(caster, target, spell, clock)?;
    let mana_spent = pay_costs(caster, spell);

    let own_ratio = wizard_ratio(caster, RatioSide::Offense);
    let target_ratio = wizard_ratio(target, RatioSide::Defense);
    let chance = match spell.category {
        SpellCategory::Info => info_chance(own_ratio, target_ratio),
        _ => (black_op_chance(own_ratio, target_ratio)
            * (1.0 - target.wonder_perk(PassivePerk::EnemySpellChance)))
        .clamp(0.01, 0.95),
    };
    let success = rng.gen::<f64>() < chance;

    debug!(
        caster = caster.id.0,
        target = target.id.0,
        spell = ?spell.key,
        chance,
        success,
        "spell rolled"
    );

    let mut result = SpellResult {
        caster: caster.id,
        target: target.id,
        spell: spell.key,
        success,
        reflected: false,
        chance,
        mana_spent,
        duration: 0,
        damage: Vec::new(),
        caster_wizards_lost: 0,
        caster_archmages_lost: 0,
        infamy_gained: 0,
    };

    if !success {
        if spell.is_hostile() {
            let losses = wizard_losses_on_failure(caster, target, footing);
            caster.military.wizards -= losses.wizards;
            caster.military.archmages -= losses.archmages;
            for slot in UnitSlot::ALL {
                *caster.military.slot_mut(slot) -= losses.units[slot.index()];
            }
            result.caster_wizards_lost = losses.wizards;
            result.caster_archmages_lost = losses.archmages;
        }
        return Ok(result);
    }

    if spell.category == SpellCategory::Info {
        // Payload is the revealed snapshot, carried by the notification
        return Ok(result);
    }

    let reflected = target.spell_active(SpellKey::EnergyMirror) && rng.gen::<f64>() < 0.20;
    result.reflected = reflected;

    let day = clock.round_day();
    if spell.category == SpellCategory::WarSpell {
        let duration =
            ((spell.duration as f64) * footing.spell_duration_multiplier()).round() as u32;
        result.duration = duration;
        if reflected {
            apply_aura(caster, spell, duration, caster.id);
        } else {
            apply_aura(target, spell, duration, caster.id);
        }
    } else if reflected {
        result.damage = apply_damage(caster, spell.effects, day);
    } else {
        result.damage = apply_damage(target, spell.effects, day);
    }

    if !reflected {
        let range = caster.range_to(target);
        let gained = infamy_gain(own_ratio, target_ratio, range);
        result.infamy_gained = gained;
        caster.infamy = apply_infamy(caster.infamy, gained);
        let mastery = mastery_gain(caster.wizard_mastery, target.wizard_mastery, gained);
        caster.wizard_mastery += mastery;
        target.wizard_mastery -= mastery_loss(target.wizard_mastery, mastery);
        target.wizard_resilience += resilience_gain(SpecialistKind::Wizard);
    }

    Ok(result)
}
