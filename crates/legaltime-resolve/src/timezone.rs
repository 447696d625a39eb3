//! Timezone resolution: cached geospatial candidates into the aggregator.
//!
//! Unlike region resolution, timezone resolution never discards a ranked
//! candidate list — the full distribution is what the legal-time aggregator
//! consumes. A geospatial search that finds nothing at all is fatal for the
//! event: there is no estimate to produce without at least one candidate.

use chrono::{DateTime, Utc};
use legaltime_boundaries::{BoundaryStore, OverlapParams, disambiguate};
use legaltime_types::{Candidate, Decision, EventId, EventRecord, LegalTimeEstimate, QueryBox};
use tracing::debug;

use crate::cache::LookupCache;
use crate::dst::TransitionCalculator;
use crate::error::ResolveError;
use crate::localize::localize;

/// Resolves events to legal-time estimates via their timezone candidates.
#[derive(Debug)]
pub struct TimezoneResolver<'a> {
    store: &'a BoundaryStore,
    cache: &'a LookupCache,
    calculator: &'a TransitionCalculator,
}

impl<'a> TimezoneResolver<'a> {
    /// Build a resolver over loaded reference data, a lookup cache, and a
    /// transition calculator.
    pub const fn new(
        store: &'a BoundaryStore,
        cache: &'a LookupCache,
        calculator: &'a TransitionCalculator,
    ) -> Self {
        Self {
            store,
            cache,
            calculator,
        }
    }

    /// The event's ranked timezone candidates, memoized by event id.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NoTimezoneMatch`] when the geospatial search
    /// fails even after the retry budget — fatal for this event.
    pub fn candidates(&self, event: &EventRecord) -> Result<Vec<Candidate>, ResolveError> {
        if let Some(hit) = self.cache.get(&event.id) {
            return Ok(hit);
        }
        let candidates = self.lookup(&event.id, &event.query)?;
        self.cache.insert(event.id.clone(), candidates.clone());
        Ok(candidates)
    }

    /// Resolve one event to a full legal-time estimate.
    pub fn resolve(&self, event: &EventRecord) -> Result<LegalTimeEstimate, ResolveError> {
        let candidates = self.candidates(event)?;
        self.localize_candidates(event.timestamp, &candidates)
    }

    /// Aggregate an already-known candidate list at an instant.
    pub fn localize_candidates(
        &self,
        timestamp: DateTime<Utc>,
        candidates: &[Candidate],
    ) -> Result<LegalTimeEstimate, ResolveError> {
        localize(timestamp, candidates, self.calculator)
    }

    fn lookup(&self, id: &EventId, query: &QueryBox) -> Result<Vec<Candidate>, ResolveError> {
        let decision = disambiguate(query, self.store.timezones(), &OverlapParams::timezones())?;
        match decision {
            Decision::Unique(label) => Ok(vec![Candidate::new(label, 100.0)]),
            Decision::Ranked(candidates) => {
                debug!(
                    event = %id,
                    count = candidates.len(),
                    "ranked timezone candidates"
                );
                Ok(candidates)
            }
            Decision::NoMatch => Err(ResolveError::NoTimezoneMatch),
        }
    }
}
