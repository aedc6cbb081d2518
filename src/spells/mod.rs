//! Spell definitions
//!
//! Every castable spell lives in the static catalog as data: costs, duration,
//! category, and instant-damage effects. The resolver dispatches on
//! [`SpellCategory`]; gameplay code that needs to know whether a particular
//! aura is up checks [`crate::dominion::Dominion::spell_active`] by key.

mod catalog;

pub use catalog::{spell, DamageTarget, Spell, SpellCategory, SpellEffect, SpellKey};
