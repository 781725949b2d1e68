//! Score-driven piece unlocks. The set only ever grows.

use crate::catalog::{PieceCatalog, PieceDefinition, Tier, UnlockLookup};
use crate::storage::{KeyValueStore, StorageError, UNLOCKS_KEY};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Pieces of one tier that became available together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockEvent {
    pub tier: Tier,
    pub pieces: Vec<(&'static str, &'static str)>,
}

/// Next tier milestone above the current score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextUnlock {
    pub tier: Tier,
    pub required: u32,
    pub remaining: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressInfo {
    pub total: usize,
    /// Available pieces, starters included.
    pub unlocked: usize,
    pub percentage: u32,
    pub next: Option<NextUnlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlockProgression {
    unlocked: BTreeSet<String>,
}

impl UnlockLookup for UnlockProgression {
    fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }
}

impl UnlockProgression {
    /// Read the persisted set. A malformed value is logged and treated as empty.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        let Some(raw) = store.load(UNLOCKS_KEY)? else {
            return Ok(Self::default());
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => Ok(Self {
                unlocked: ids.into_iter().collect(),
            }),
            Err(e) => {
                warn!(error = %e, "ignoring malformed unlock state");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let ids: Vec<&str> = self.unlocked.iter().map(String::as_str).collect();
        let json = serde_json::to_string(&ids).map_err(|source| StorageError::Json {
            key: UNLOCKS_KEY.to_string(),
            source,
        })?;
        store.save(UNLOCKS_KEY, &json)
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    /// Add every tiered piece whose threshold `score` meets and return the new ones.
    pub fn check_for_unlocks<'c>(
        &mut self,
        score: u32,
        catalog: &'c PieceCatalog,
    ) -> Vec<&'c PieceDefinition> {
        let mut fresh = Vec::new();
        for def in catalog.all() {
            let Some(required) = def.tier.required_score() else {
                continue;
            };
            if score >= required && self.unlocked.insert(def.id.to_string()) {
                fresh.push(def);
            }
        }
        if !fresh.is_empty() {
            info!(score, count = fresh.len(), "pieces unlocked");
        }
        fresh
    }

    /// Forget all unlocks and persist the empty set.
    pub fn reset(&mut self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        self.unlocked.clear();
        self.save(store)
    }

    pub fn progress(&self, catalog: &PieceCatalog, score: u32) -> ProgressInfo {
        let total = catalog.len();
        let unlocked = catalog.available(self).count();
        let percentage = if total == 0 {
            0
        } else {
            ((unlocked as f64 / total as f64) * 100.0).round() as u32
        };
        ProgressInfo {
            total,
            unlocked,
            percentage,
            next: next_unlock(score),
        }
    }
}

/// Group newly unlocked pieces per tier, in tier order.
pub fn group_by_tier(pieces: &[&PieceDefinition]) -> Vec<UnlockEvent> {
    Tier::ALL
        .iter()
        .filter_map(|&tier| {
            let ids: Vec<_> = pieces
                .iter()
                .filter(|p| p.tier == tier)
                .map(|p| (p.id, p.name))
                .collect();
            (!ids.is_empty()).then_some(UnlockEvent { tier, pieces: ids })
        })
        .collect()
}

/// First tier whose threshold is above `score`.
pub fn next_unlock(score: u32) -> Option<NextUnlock> {
    Tier::ALL.iter().find_map(|&tier| {
        let required = tier.required_score()?;
        (required > score).then_some(NextUnlock {
            tier,
            required,
            remaining: required - score,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;

    #[test]
    fn test_bronze_unlocks_at_1000_once() {
        let cat = PieceCatalog::standard().unwrap();
        let mut u = UnlockProgression::default();
        assert!(u.check_for_unlocks(999, &cat).is_empty());
        let got = u.check_for_unlocks(1000, &cat);
        assert_eq!(got.len(), 5);
        assert!(got.iter().all(|p| p.tier == Tier::Bronze));
        assert!(u.check_for_unlocks(1500, &cat).is_empty());
    }

    #[test]
    fn test_jump_groups_by_tier() {
        let cat = PieceCatalog::standard().unwrap();
        let mut u = UnlockProgression::default();
        let got = u.check_for_unlocks(7_500, &cat);
        let events = group_by_tier(&got);
        let tiers: Vec<Tier> = events.iter().map(|e| e.tier).collect();
        assert_eq!(tiers, vec![Tier::Bronze, Tier::Silver, Tier::Gold]);
        assert_eq!(events[1].pieces.len(), 6);
    }

    #[test]
    fn test_persist_and_reload() {
        let cat = PieceCatalog::standard().unwrap();
        let mut store = MemoryStore::default();
        let mut u = UnlockProgression::default();
        u.check_for_unlocks(3_000, &cat);
        u.save(&mut store).unwrap();
        let back = UnlockProgression::load(&store).unwrap();
        assert_eq!(back, u);
        assert_eq!(back.len(), 11);
    }

    #[test]
    fn test_malformed_state_loads_empty() {
        let mut store = MemoryStore::default();
        store.save(UNLOCKS_KEY, "{not json").unwrap();
        assert_eq!(UnlockProgression::load(&store).unwrap().len(), 0);
    }

    #[test]
    fn test_reset_clears_persisted_set() {
        let cat = PieceCatalog::standard().unwrap();
        let mut store = MemoryStore::default();
        let mut u = UnlockProgression::default();
        u.check_for_unlocks(20_000, &cat);
        u.reset(&mut store).unwrap();
        assert_eq!(u.len(), 0);
        assert_eq!(store.load(UNLOCKS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_next_unlock_and_progress() {
        let cat = PieceCatalog::standard().unwrap();
        let u = UnlockProgression::default();
        assert_eq!(
            next_unlock(400),
            Some(NextUnlock {
                tier: Tier::Bronze,
                required: 1000,
                remaining: 600
            })
        );
        assert_eq!(next_unlock(3_000).map(|n| n.tier), Some(Tier::Gold));
        assert_eq!(next_unlock(15_000), None);
        let p = u.progress(&cat, 0);
        assert_eq!((p.total, p.unlocked, p.percentage), (30, 7, 23));
    }

    proptest! {
        #[test]
        fn unlocks_never_revoked(scores in prop::collection::vec(0u32..20_000, 1..20)) {
            let cat = PieceCatalog::standard().unwrap();
            let mut u = UnlockProgression::default();
            let mut seen: BTreeSet<String> = BTreeSet::new();
            for s in scores {
                u.check_for_unlocks(s, &cat);
                let now = u.unlocked.clone();
                prop_assert!(seen.is_subset(&now));
                seen = now;
            }
        }
    }
}
