//! Warspire - conflict resolution engine for a persistent tick-based strategy game
//!
//! Dominions accumulate resources, train units, and act on each other through
//! invasions and magic. This crate owns the deterministic pipeline that decides
//! whether an attack or spell succeeds, computes casualties, land transfer and
//! plunder, and schedules the resulting deltas to apply at future game hours.
//!
//! Persistence, HTTP, rendering and the hourly production scheduler live
//! outside this crate and are consumed through the traits in [`external`].

pub mod combat;
pub mod core;
pub mod dominion;
pub mod external;
pub mod ops;
pub mod power;
pub mod queue;
pub mod resolve;
pub mod spells;
