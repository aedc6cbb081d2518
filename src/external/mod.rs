//! Collaborator traits at the engine boundary
//!
//! The resolver owns conflict semantics and nothing else: persistence,
//! diplomacy state, round timing, and player notifications all arrive
//! through these traits. The in-memory implementations in [`memory`] back
//! the test suite and the demo binary.

pub mod memory;

use serde_json::Value;

use crate::core::error::Result;
use crate::core::types::{DominionId, RealmId, WarFooting};
use crate::dominion::Dominion;

/// Loads and persists dominion snapshots.
///
/// `save` carries an audit tag naming the operation that produced the
/// state, for the backing store's event log.
pub trait DominionRepository: Send + Sync {
    fn load(&self, id: DominionId) -> Result<Dominion>;
    fn save(&self, dominion: &Dominion, audit_tag: &str) -> Result<()>;
}

/// Answers what diplomatic footing two realms are on
pub trait GovernmentProvider: Send + Sync {
    fn war_footing(&self, a: RealmId, b: RealmId) -> WarFooting;
}

/// Round timing, injected so tests can pin the clock
pub trait RoundClock: Send + Sync {
    fn round_day(&self) -> u32;
    fn hours_since_round_start(&self) -> u32;
    /// Round-wide switch: set during maintenance and the end-of-round freeze
    fn offensive_actions_disabled(&self) -> bool;
}

/// Receives player-facing notifications. Delivery is best-effort: a failing
/// sink is logged by the resolver and never rolls back a resolved conflict.
pub trait NotificationSink: Send + Sync {
    fn queue(&self, recipient: DominionId, kind: &str, payload: Value) -> Result<()>;
}
