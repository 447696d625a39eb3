//! Per-event memoization of geospatial timezone lookups.
//!
//! The same event id always resolves to the same candidate list (inputs are
//! immutable for the life of the process), so the cache is insert-once with
//! no eviction. Concurrent workers may race on the first write; the loser
//! merely recomputed a deterministic value, so the entry API keeps the
//! first insert and the race stays benign — no heavyweight locking.

use std::collections::BTreeMap;
use std::sync::RwLock;

use legaltime_types::{Candidate, EventId};

/// Insert-once cache of ranked timezone candidates keyed by event id.
#[derive(Debug, Default)]
pub struct LookupCache {
    inner: RwLock<BTreeMap<EventId, Vec<Candidate>>>,
}

impl LookupCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the cached candidate list for an event, if present.
    ///
    /// A poisoned lock behaves as a miss: the caller recomputes the same
    /// deterministic value.
    pub fn get(&self, id: &EventId) -> Option<Vec<Candidate>> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.get(id).cloned())
    }

    /// Record an event's candidate list, keeping any earlier insert.
    pub fn insert(&self, id: EventId, candidates: Vec<Candidate>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.entry(id).or_insert(candidates);
        }
    }

    /// Number of memoized events.
    pub fn len(&self) -> usize {
        self.inner.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
