//! In-memory collaborators for tests and the demo binary

use std::sync::Mutex;

use ahash::AHashMap;
use serde_json::Value;

use crate::core::error::{EngineError, Result};
use crate::core::types::{DominionId, RealmId, WarFooting};
use crate::dominion::Dominion;
use crate::external::{DominionRepository, GovernmentProvider, NotificationSink, RoundClock};

fn lock<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| EngineError::invariant("collaborator lock poisoned"))
}

/// Repository over a hash map
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    dominions: Mutex<AHashMap<DominionId, Dominion>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, dominion: Dominion) -> Result<()> {
        lock(&self.dominions)?.insert(dominion.id, dominion);
        Ok(())
    }
}

impl DominionRepository for InMemoryRepository {
    fn load(&self, id: DominionId) -> Result<Dominion> {
        lock(&self.dominions)?
            .get(&id)
            .cloned()
            .ok_or(EngineError::UnknownDominion(id))
    }

    fn save(&self, dominion: &Dominion, _audit_tag: &str) -> Result<()> {
        lock(&self.dominions)?.insert(dominion.id, dominion.clone());
        Ok(())
    }
}

/// Government that reports one fixed footing for every realm pair
#[derive(Debug, Clone, Copy)]
pub struct StaticGovernment(pub WarFooting);

impl GovernmentProvider for StaticGovernment {
    fn war_footing(&self, a: RealmId, b: RealmId) -> WarFooting {
        if a == b {
            WarFooting::None
        } else {
            self.0
        }
    }
}

/// A pinned round clock
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub day: u32,
    pub hours_since_start: u32,
    pub disabled: bool,
}

impl FixedClock {
    /// Mid-round, offensive actions allowed
    pub fn midround() -> Self {
        Self { day: 20, hours_since_start: 20 * 24, disabled: false }
    }
}

impl RoundClock for FixedClock {
    fn round_day(&self) -> u32 {
        self.day
    }

    fn hours_since_round_start(&self) -> u32 {
        self.hours_since_start
    }

    fn offensive_actions_disabled(&self) -> bool {
        self.disabled
    }
}

/// Sink that records everything queued through it
#[derive(Debug, Default)]
pub struct CollectingSink {
    notifications: Mutex<Vec<(DominionId, String, Value)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<(DominionId, String, Value)> {
        match self.notifications.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => Vec::new(),
        }
    }
}

impl NotificationSink for CollectingSink {
    fn queue(&self, recipient: DominionId, kind: &str, payload: Value) -> Result<()> {
        lock(&self.notifications)?.push((recipient, kind.to_string(), payload));
        Ok(())
    }
}

/// Sink that always fails, for exercising best-effort delivery
#[derive(Debug, Default)]
pub struct FailingSink;

impl NotificationSink for FailingSink {
    fn queue(&self, _recipient: DominionId, _kind: &str, _payload: Value) -> Result<()> {
        Err(EngineError::External("notification channel down".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{RealmId, RoundId};
    use crate::dominion::race::Race;

    #[test]
    fn test_repository_round_trips() {
        let repo = InMemoryRepository::new();
        let dom = Dominion::seeded(DominionId(7), RealmId(1), RoundId(1), "X", Race::legion(), 700);
        repo.insert(dom.clone()).unwrap();
        let loaded = repo.load(DominionId(7)).unwrap();
        assert_eq!(loaded.name, "X");
        assert!(matches!(
            repo.load(DominionId(8)),
            Err(EngineError::UnknownDominion(DominionId(8)))
        ));
    }

    #[test]
    fn test_collecting_sink_drains() {
        let sink = CollectingSink::new();
        sink.queue(DominionId(1), "invasion", serde_json::json!({"acres": 50})).unwrap();
        let drained = sink.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].1, "invasion");
        assert!(sink.drain().is_empty());
    }

    #[test]
    fn test_static_government_same_realm_at_peace() {
        let gov = StaticGovernment(WarFooting::MutualWar);
        assert_eq!(gov.war_footing(RealmId(1), RealmId(1)), WarFooting::None);
        assert_eq!(gov.war_footing(RealmId(1), RealmId(2)), WarFooting::MutualWar);
    }
}
