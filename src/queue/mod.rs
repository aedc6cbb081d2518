//! The deferred-effects queue
//!
//! Everything that arrives later goes through here: returning armies,
//! conquered land in transit, queued prestige, boats under construction.
//! Entries are typed by [`EffectKey`], never merged on insert, and mature
//! exactly once: [`DeferredEffectsQueue::tick`] hands each entry back on the
//! hour it completes and forgets it.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::types::{BuildingType, DominionId, Hours, Resource, Terrain, UnitSlot};

/// What a queue entry delivers on maturity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKey {
    Resource(Resource),
    Unit(UnitSlot),
    Draftees,
    Prestige,
    Land(Terrain),
    DiscountedLand,
    Building(BuildingType),
}

/// What put the entry in the queue; lets callers inspect or cancel one
/// pipeline without touching another's entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectOrigin {
    Invasion,
    Training,
    Construction,
    Spell,
}

/// One pending delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredEffect {
    pub key: EffectKey,
    pub amount: i64,
    /// Hours until maturity; ticks down each hour, delivers at zero
    pub remaining: Hours,
    pub origin: EffectOrigin,
}

/// Per-dominion queues of pending deliveries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeferredEffectsQueue {
    entries: AHashMap<DominionId, Vec<DeferredEffect>>,
}

impl DeferredEffectsQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a delivery. Entries are deliberately never merged, even for an
    /// identical key and hour: each keeps its own origin and audit identity.
    pub fn enqueue(
        &mut self,
        dominion: DominionId,
        key: EffectKey,
        amount: i64,
        hours: Hours,
        origin: EffectOrigin,
    ) -> Result<()> {
        if amount <= 0 {
            return Err(EngineError::invariant(format!(
                "queue amount must be positive, got {} for {:?}",
                amount, key
            )));
        }
        if hours == 0 {
            return Err(EngineError::invariant(
                "zero-hour deliveries must be applied directly, not queued",
            ));
        }
        self.entries
            .entry(dominion)
            .or_default()
            .push(DeferredEffect { key, amount, remaining: hours, origin });
        Ok(())
    }

    /// Advance one dominion's queue by one hour, returning every entry that
    /// matured. Matured entries are removed; calling `tick` again does not
    /// deliver them twice.
    pub fn tick(&mut self, dominion: DominionId) -> Vec<DeferredEffect> {
        let Some(entries) = self.entries.get_mut(&dominion) else {
            return Vec::new();
        };
        let mut matured = Vec::new();
        entries.retain_mut(|effect| {
            effect.remaining -= 1;
            if effect.remaining == 0 {
                matured.push(*effect);
                false
            } else {
                true
            }
        });
        if entries.is_empty() {
            self.entries.remove(&dominion);
        }
        matured
    }

    /// Remove up to `amount` of a key from the queue, draining the entries
    /// closest to maturity first. Returns how much was actually removed,
    /// which is less than requested when the queue holds less.
    pub fn dequeue_partial(&mut self, dominion: DominionId, key: EffectKey, amount: i64) -> i64 {
        let Some(entries) = self.entries.get_mut(&dominion) else {
            return 0;
        };
        entries.sort_by_key(|e| e.remaining);
        let mut left = amount.max(0);
        for effect in entries.iter_mut() {
            if left == 0 {
                break;
            }
            if effect.key != key {
                continue;
            }
            let taken = effect.amount.min(left);
            effect.amount -= taken;
            left -= taken;
        }
        entries.retain(|e| e.amount > 0);
        if entries.is_empty() {
            self.entries.remove(&dominion);
        }
        amount.max(0) - left
    }

    /// Total pending amount of a key
    pub fn total(&self, dominion: DominionId, key: EffectKey) -> i64 {
        self.entries
            .get(&dominion)
            .map(|v| v.iter().filter(|e| e.key == key).map(|e| e.amount).sum())
            .unwrap_or(0)
    }

    /// Total pending amount of a key from one origin
    pub fn total_by_origin(&self, dominion: DominionId, key: EffectKey, origin: EffectOrigin) -> i64 {
        self.entries
            .get(&dominion)
            .map(|v| {
                v.iter()
                    .filter(|e| e.key == key && e.origin == origin)
                    .map(|e| e.amount)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Pending entries for inspection, unordered
    pub fn pending(&self, dominion: DominionId) -> &[DeferredEffect] {
        self.entries.get(&dominion).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOM: DominionId = DominionId(1);

    #[test]
    fn test_enqueue_rejects_nonpositive_and_instant() {
        let mut q = DeferredEffectsQueue::new();
        assert!(q.enqueue(DOM, EffectKey::Prestige, 0, 12, EffectOrigin::Invasion).is_err());
        assert!(q.enqueue(DOM, EffectKey::Prestige, -5, 12, EffectOrigin::Invasion).is_err());
        assert!(q.enqueue(DOM, EffectKey::Prestige, 5, 0, EffectOrigin::Invasion).is_err());
    }

    #[test]
    fn test_entries_never_merge() {
        let mut q = DeferredEffectsQueue::new();
        q.enqueue(DOM, EffectKey::Unit(UnitSlot::One), 10, 12, EffectOrigin::Invasion).unwrap();
        q.enqueue(DOM, EffectKey::Unit(UnitSlot::One), 10, 12, EffectOrigin::Training).unwrap();
        assert_eq!(q.pending(DOM).len(), 2);
        assert_eq!(q.total(DOM, EffectKey::Unit(UnitSlot::One)), 20);
        assert_eq!(q.total_by_origin(DOM, EffectKey::Unit(UnitSlot::One), EffectOrigin::Training), 10);
    }

    #[test]
    fn test_tick_delivers_exactly_once() {
        let mut q = DeferredEffectsQueue::new();
        q.enqueue(DOM, EffectKey::Resource(Resource::Boats), 3, 2, EffectOrigin::Construction).unwrap();
        assert!(q.tick(DOM).is_empty());
        let matured = q.tick(DOM);
        assert_eq!(matured.len(), 1);
        assert_eq!(matured[0].amount, 3);
        assert!(q.tick(DOM).is_empty());
        assert_eq!(q.total(DOM, EffectKey::Resource(Resource::Boats)), 0);
    }

    #[test]
    fn test_tick_other_dominion_untouched() {
        let mut q = DeferredEffectsQueue::new();
        let other = DominionId(2);
        q.enqueue(other, EffectKey::Prestige, 20, 1, EffectOrigin::Invasion).unwrap();
        assert!(q.tick(DOM).is_empty());
        assert_eq!(q.total(other, EffectKey::Prestige), 20);
    }

    #[test]
    fn test_dequeue_partial_drains_soonest_first() {
        let mut q = DeferredEffectsQueue::new();
        let key = EffectKey::Resource(Resource::Boats);
        q.enqueue(DOM, key, 10, 12, EffectOrigin::Construction).unwrap();
        q.enqueue(DOM, key, 10, 3, EffectOrigin::Construction).unwrap();
        let removed = q.dequeue_partial(DOM, key, 12);
        assert_eq!(removed, 12);
        assert_eq!(q.total(DOM, key), 8);
        // The 3-hour entry went entirely, the 12-hour one partially
        let pending = q.pending(DOM);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].remaining, 12);
    }

    #[test]
    fn test_dequeue_partial_caps_at_available() {
        let mut q = DeferredEffectsQueue::new();
        let key = EffectKey::Resource(Resource::Boats);
        q.enqueue(DOM, key, 5, 4, EffectOrigin::Construction).unwrap();
        assert_eq!(q.dequeue_partial(DOM, key, 50), 5);
        assert_eq!(q.dequeue_partial(DOM, key, 50), 0);
    }

    #[test]
    fn test_dequeue_ignores_other_keys() {
        let mut q = DeferredEffectsQueue::new();
        q.enqueue(DOM, EffectKey::Prestige, 30, 6, EffectOrigin::Invasion).unwrap();
        assert_eq!(q.dequeue_partial(DOM, EffectKey::Draftees, 30), 0);
        assert_eq!(q.total(DOM, EffectKey::Prestige), 30);
    }
}
