//! Fixed-size worker pool over event batches.
//!
//! Resolution is embarrassingly parallel: every worker reads the same
//! immutable reference data and touches no other event's state. Workers
//! pull batches from a shared queue and run synchronous, blocking
//! computation only — there is no I/O inside the loop. A fatal error for
//! one event is caught here, tagged with the event id, and reported as an
//! output record while the batch continues.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use legaltime_boundaries::BoundaryStore;
use legaltime_resolve::{
    LookupCache, OverrideTables, RegionResolver, ResolveError, TimezoneResolver,
    TransitionCalculator,
};
use legaltime_types::{EventId, EventRecord, LegalTimeEstimate, RegionCode};
use serde::Serialize;
use tracing::warn;

use crate::error::RunnerError;

/// One output line per input event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputRecord {
    /// The event resolved; `region` is `null` for the explicit
    /// unresolved-region marker.
    Resolved {
        /// The event this record belongs to.
        event_id: EventId,
        /// Region code, or `null` when no region was assigned.
        region: Option<RegionCode>,
        /// The aggregated legal-time estimate.
        #[serde(flatten)]
        estimate: LegalTimeEstimate,
    },
    /// Resolution failed fatally for this event; the batch continued.
    Failed {
        /// The event this record belongs to.
        event_id: EventId,
        /// Human-readable failure description.
        error: String,
    },
}

/// Shared read-only context for the worker pool.
#[derive(Debug)]
pub struct BatchContext<'a> {
    /// Loaded reference datasets.
    pub store: &'a BoundaryStore,
    /// Override tables for region resolution.
    pub tables: &'a OverrideTables,
    /// Seasonal transition calculator.
    pub calculator: &'a TransitionCalculator,
    /// Per-event lookup cache, shared across workers.
    pub cache: &'a LookupCache,
}

/// Resolve all events over a pool of `workers` threads pulling batches of
/// `batch_size` from a shared queue. Output order matches input order.
pub fn process_events(
    context: &BatchContext<'_>,
    events: Vec<EventRecord>,
    workers: usize,
    batch_size: usize,
) -> Vec<OutputRecord> {
    let batches: Vec<(usize, Vec<EventRecord>)> =
        chunk(events, batch_size).into_iter().enumerate().collect();
    let queue = Mutex::new(batches.into_iter());
    let results: Mutex<Vec<(usize, Vec<OutputRecord>)>> = Mutex::new(Vec::new());

    std::thread::scope(|scope| {
        for _ in 0..workers.max(1) {
            scope.spawn(|| {
                let regions = RegionResolver::new(context.store, context.tables);
                let timezones =
                    TimezoneResolver::new(context.store, context.cache, context.calculator);
                loop {
                    let next = queue
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .next();
                    let Some((index, batch)) = next else {
                        break;
                    };
                    let outcomes: Vec<OutputRecord> = batch
                        .iter()
                        .map(|event| process_event(&regions, &timezones, event))
                        .collect();
                    results
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push((index, outcomes));
                }
            });
        }
    });

    let mut collected = results
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    collected.sort_by_key(|(index, _)| *index);
    collected
        .into_iter()
        .flat_map(|(_, outcomes)| outcomes)
        .collect()
}

/// Resolve one event, converting any fatal error into a `Failed` record
/// tagged with the event id.
fn process_event(
    regions: &RegionResolver<'_>,
    timezones: &TimezoneResolver<'_>,
    event: &EventRecord,
) -> OutputRecord {
    match resolve_event(regions, timezones, event) {
        Ok((region, estimate)) => OutputRecord::Resolved {
            event_id: event.id.clone(),
            region,
            estimate,
        },
        Err(error) => {
            warn!(event_id = %event.id, %error, "event resolution failed");
            OutputRecord::Failed {
                event_id: event.id.clone(),
                error: error.to_string(),
            }
        }
    }
}

/// The per-event pipeline: region first, then the legal-time estimate.
fn resolve_event(
    regions: &RegionResolver<'_>,
    timezones: &TimezoneResolver<'_>,
    event: &EventRecord,
) -> Result<(Option<RegionCode>, LegalTimeEstimate), ResolveError> {
    let region = regions.resolve(event)?;
    let estimate = timezones.resolve(event)?;
    Ok((region, estimate))
}

/// Write one JSON line per record.
pub fn write_outputs(path: &Path, records: &[OutputRecord]) -> Result<(), RunnerError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Split events into batches of at most `size`, preserving order.
fn chunk(events: Vec<EventRecord>, size: usize) -> Vec<Vec<EventRecord>> {
    let size = size.max(1);
    let mut batches = Vec::new();
    let mut iter = events.into_iter();
    loop {
        let batch: Vec<EventRecord> = iter.by_ref().take(size).collect();
        if batch.is_empty() {
            break;
        }
        batches.push(batch);
    }
    batches
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{TimeZone, Utc};
    use geo::{MultiPolygon, polygon};
    use legaltime_boundaries::PolygonSet;
    use legaltime_resolve::PlaceOverrides;
    use legaltime_types::QueryBox;

    use super::*;

    fn square(min_x: f64, min_y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: min_x, y: min_y),
            (x: min_x + size, y: min_y),
            (x: min_x + size, y: min_y + size),
            (x: min_x, y: min_y + size),
            (x: min_x, y: min_y),
        ]])
    }

    fn test_store() -> BoundaryStore {
        let regions = PolygonSet::from_pairs(vec![
            ("AA".to_owned(), square(0.0, 0.0, 10.0)),
            ("BB".to_owned(), square(10.0, 0.0, 10.0)),
            ("CC".to_owned(), square(60.0, 0.0, 10.0)),
        ]);
        let timezones = PolygonSet::from_pairs(vec![
            ("America/Denver".to_owned(), square(0.0, 0.0, 20.0)),
            ("America/New_York".to_owned(), square(60.0, 0.0, 10.0)),
        ]);
        BoundaryStore::from_sets(regions, timezones)
    }

    fn test_tables() -> OverrideTables {
        let aliases = [
            ("Alphaland".to_owned(), RegionCode::new("AA")),
            ("Betaland".to_owned(), RegionCode::new("BB")),
            ("Gammaland".to_owned(), RegionCode::new("CC")),
        ]
        .into_iter()
        .collect();
        OverrideTables::from_parts(PlaceOverrides::default(), aliases)
    }

    fn winter_event(id: &str, query: QueryBox) -> EventRecord {
        EventRecord {
            id: EventId::new(id),
            name: None,
            query,
            timestamp: Utc.with_ymd_and_hms(2019, 2, 20, 12, 0, 0).single().unwrap(),
        }
    }

    #[test]
    fn failures_are_isolated_per_event() {
        let store = test_store();
        let tables = test_tables();
        let calculator = TransitionCalculator::new();
        let cache = LookupCache::new();
        let context = BatchContext {
            store: &store,
            tables: &tables,
            calculator: &calculator,
            cache: &cache,
        };

        let events = vec![
            winter_event("ok-1", QueryBox::new(2.0, 2.0, 3.0, 3.0)),
            // No timezone footprint anywhere near: fatal for this event.
            winter_event("lost", QueryBox::new(200.0, 50.0, 201.0, 51.0)),
            winter_event("ok-2", QueryBox::new(4.0, 4.0, 5.0, 5.0)),
        ];
        let outcomes = process_events(&context, events, 2, 1);

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(
            outcomes[0],
            OutputRecord::Resolved { ref event_id, .. } if event_id.as_str() == "ok-1"
        ));
        assert!(matches!(
            outcomes[1],
            OutputRecord::Failed { ref event_id, .. } if event_id.as_str() == "lost"
        ));
        assert!(matches!(
            outcomes[2],
            OutputRecord::Resolved { ref event_id, .. } if event_id.as_str() == "ok-2"
        ));
    }

    #[test]
    fn output_order_matches_input_order() {
        let store = test_store();
        let tables = test_tables();
        let calculator = TransitionCalculator::new();
        let cache = LookupCache::new();
        let context = BatchContext {
            store: &store,
            tables: &tables,
            calculator: &calculator,
            cache: &cache,
        };

        let events: Vec<EventRecord> = (0..20)
            .map(|i| winter_event(&format!("evt-{i:02}"), QueryBox::new(2.0, 2.0, 3.0, 3.0)))
            .collect();
        let outcomes = process_events(&context, events, 4, 3);

        let ids: Vec<String> = outcomes
            .iter()
            .map(|o| match o {
                OutputRecord::Resolved { event_id, .. }
                | OutputRecord::Failed { event_id, .. } => event_id.as_str().to_owned(),
            })
            .collect();
        let expected: Vec<String> = (0..20).map(|i| format!("evt-{i:02}")).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn outputs_serialize_as_ndjson() {
        let record = OutputRecord::Failed {
            event_id: EventId::new("evt-9"),
            error: "geospatial timezone search found no candidates".to_owned(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"event_id\":\"evt-9\""));
        assert!(json.contains("\"error\""));

        let mut dir = std::env::temp_dir();
        dir.push(format!("legaltime-batch-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.ndjson");
        write_outputs(&path, &[record]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 1);
    }
}
