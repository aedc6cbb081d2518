//! Dominion data model: value-typed snapshots and race rosters
//!
//! Combat-relevant state is an explicit snapshot struct mutated only by the
//! conflict resolver (combat fields) or the hourly tick (production fields,
//! outside this crate). Unit counts live in a slot-indexed array; there is no
//! dynamic field-name composition anywhere.

pub mod race;
pub mod snapshot;

pub use race::{Race, RacePerk, UnitPerk, UnitStats};
pub use snapshot::{ActiveSpell, Dominion, InvasionStamp, Military, PassivePerk, Resources};
