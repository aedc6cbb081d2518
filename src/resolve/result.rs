//! Flat, serializable outcome records
//!
//! One struct per operation kind, every field a plain value. These are what
//! callers render, log, and ship in notifications; nothing in them borrows
//! engine state.

use serde::{Deserialize, Serialize};

use crate::core::types::{DominionId, Hours};
use crate::spells::{DamageTarget, SpellKey};

/// Outcome of one resolved invasion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvasionResult {
    pub attacker: DominionId,
    pub defender: DominionId,
    pub success: bool,
    pub overwhelmed: bool,

    pub op: f64,
    pub dp: f64,
    pub range: f64,

    pub attacker_losses: [i64; 4],
    pub defender_losses: [i64; 4],
    pub defender_draftee_losses: i64,
    pub converted: [i64; 4],

    pub acres_conquered: i64,
    pub acres_generated: i64,

    pub prestige_attacker_immediate: i64,
    pub prestige_attacker_queued: i64,
    pub prestige_defender: i64,
    pub research_points: i64,

    pub boats_committed: f64,
    pub attacker_boats_sunk: f64,
    pub defender_boats_sunk: f64,

    pub plunder_platinum: i64,
    pub plunder_gems: i64,
}

/// One destroyed pool within a spell outcome
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DamageDealt {
    pub target: DamageTarget,
    pub amount: i64,
}

/// Outcome of one resolved spell cast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellResult {
    pub caster: DominionId,
    pub target: DominionId,
    pub spell: SpellKey,
    pub success: bool,
    /// The target's mirror bounced the payload back onto the caster
    pub reflected: bool,
    pub chance: f64,
    pub mana_spent: i64,

    /// Aura hours applied; zero for instant or failed casts
    pub duration: Hours,
    pub damage: Vec<DamageDealt>,

    pub caster_wizards_lost: i64,
    pub caster_archmages_lost: i64,
    pub infamy_gained: i64,
}
