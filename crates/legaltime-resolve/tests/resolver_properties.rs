//! End-to-end properties of the resolution pipeline over a synthetic
//! boundary store with real IANA zone names.
//!
//! These tests exercise the full path a batch worker takes per event:
//! region resolution (overrides, names, geometry) and timezone resolution
//! (cached geospatial candidates into the legal-time aggregator).

// Test code panics on failure by design.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::float_cmp,
    clippy::indexing_slicing
)]

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use geo::{MultiPolygon, polygon};
use legaltime_boundaries::{BoundaryStore, PolygonSet};
use legaltime_resolve::{
    LookupCache, OverrideTables, PlaceOverrides, RegionResolver, ResolveError,
    TimezoneResolver, TransitionCalculator,
};
use legaltime_types::{EventId, EventRecord, QueryBox, RegionCode};

fn square(min_x: f64, min_y: f64, size: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: min_x, y: min_y),
        (x: min_x + size, y: min_y),
        (x: min_x + size, y: min_y + size),
        (x: min_x, y: min_y + size),
        (x: min_x, y: min_y),
    ]])
}

/// Regions AA and BB side by side with a distant CC; zone footprints
/// aligned with the regions plus a distant filler zone.
fn store() -> BoundaryStore {
    let regions = PolygonSet::from_pairs(vec![
        ("AA".to_owned(), square(0.0, 0.0, 10.0)),
        ("BB".to_owned(), square(10.0, 0.0, 10.0)),
        ("CC".to_owned(), square(60.0, 0.0, 10.0)),
    ]);
    let timezones = PolygonSet::from_pairs(vec![
        ("America/Denver".to_owned(), square(0.0, 0.0, 10.0)),
        ("America/Chicago".to_owned(), square(10.0, 0.0, 10.0)),
        ("America/New_York".to_owned(), square(60.0, 0.0, 10.0)),
    ]);
    BoundaryStore::from_sets(regions, timezones)
}

fn tables() -> OverrideTables {
    let aliases: BTreeMap<String, RegionCode> = [
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
        // 18 days before the 2019 spring transition.
        timestamp: Utc.with_ymd_and_hms(2019, 2, 20, 12, 0, 0).single().unwrap(),
    }
}

#[test]
fn contained_event_resolves_region_and_estimate() {
    let store = store();
    let tables = tables();
    let cache = LookupCache::new();
    let calc = TransitionCalculator::new();
    let regions = RegionResolver::new(&store, &tables);
    let timezones = TimezoneResolver::new(&store, &cache, &calc);

    let event = winter_event("contained", QueryBox::new(2.0, 2.0, 4.0, 4.0));

    let code = regions.resolve(&event).unwrap();
    assert_eq!(code, Some(RegionCode::new("AA")));

    let estimate = timezones.resolve(&event).unwrap();
    assert_eq!(estimate.most_probable_timezone.as_str(), "America/Denver");
    assert_eq!(estimate.offset_lower, -7.0);
    assert_eq!(estimate.offset_point, -7.0);
    assert_eq!(estimate.offset_upper, -7.0);
    assert_eq!(estimate.is_dst, 0.0);
    assert!(estimate.days_since_transition.abs() <= 35.0);
}

#[test]
fn ambiguous_region_is_unresolved_but_timezone_still_estimates() {
    let store = store();
    let tables = tables();
    let cache = LookupCache::new();
    let calc = TransitionCalculator::new();
    let regions = RegionResolver::new(&store, &tables);
    let timezones = TimezoneResolver::new(&store, &cache, &calc);

    // 55/45 straddle of the AA|BB (and Denver|Chicago) boundary.
    let event = winter_event("straddle", QueryBox::new(4.5, 0.0, 14.5, 10.0));

    // Region resolution reports ambiguity as "no region assigned".
    assert_eq!(regions.resolve(&event).unwrap(), None);

    // Timezone resolution consumes the full ranked list instead.
    let estimate = timezones.resolve(&event).unwrap();
    assert_eq!(estimate.most_probable_timezone.as_str(), "America/Denver");
    assert_eq!(estimate.offset_lower, -7.0);
    assert_eq!(estimate.offset_upper, -6.0);
    assert!(estimate.offset_point > -7.0 && estimate.offset_point < -6.0);
    assert!(estimate.offset_lower <= estimate.offset_point);
    assert!(estimate.offset_point <= estimate.offset_upper);
}

#[test]
fn whole_universe_box_fails_region_and_timezone() {
    let store = store();
    let tables = tables();
    let cache = LookupCache::new();
    let calc = TransitionCalculator::new();
    let regions = RegionResolver::new(&store, &tables);
    let timezones = TimezoneResolver::new(&store, &cache, &calc);

    // Covers every region and every zone footprint.
    let event = winter_event("everything", QueryBox::new(-5.0, -5.0, 75.0, 15.0));

    assert_eq!(regions.resolve(&event).unwrap(), None);
    assert!(matches!(
        timezones.resolve(&event),
        Err(ResolveError::NoTimezoneMatch)
    ));
}

#[test]
fn decisive_majority_resolves_uniquely() {
    let store = store();
    let tables = tables();
    let regions = RegionResolver::new(&store, &tables);

    // 85% in AA, 15% in BB.
    let event = winter_event("decisive", QueryBox::new(1.5, 0.0, 11.5, 10.0));
    assert_eq!(regions.resolve(&event).unwrap(), Some(RegionCode::new("AA")));
}

#[test]
fn resolution_is_deterministic_across_repeats() {
    let store = store();
    let cache = LookupCache::new();
    let calc = TransitionCalculator::new();
    let timezones = TimezoneResolver::new(&store, &cache, &calc);

    let event = winter_event("repeat", QueryBox::new(3.0, 0.0, 13.0, 10.0));
    let first = timezones.resolve(&event).unwrap();
    for _ in 0..5 {
        let again = timezones.resolve(&event).unwrap();
        assert_eq!(again, first);
    }
    assert_eq!(cache.len(), 1);
}

#[test]
fn point_event_is_buffered_into_its_zone() {
    let store = store();
    let cache = LookupCache::new();
    let calc = TransitionCalculator::new();
    let timezones = TimezoneResolver::new(&store, &cache, &calc);

    let event = winter_event("point", QueryBox::new(12.0, 5.0, 12.0, 5.0));
    let estimate = timezones.resolve(&event).unwrap();
    assert_eq!(estimate.most_probable_timezone.as_str(), "America/Chicago");
    assert_eq!(estimate.offset_point, -6.0);
}

#[test]
fn out_of_window_instant_is_fatal_not_coerced() {
    let store = store();
    let cache = LookupCache::new();
    let calc = TransitionCalculator::new();
    let timezones = TimezoneResolver::new(&store, &cache, &calc);

    let mut event = winter_event("too-early", QueryBox::new(2.0, 2.0, 4.0, 4.0));
    // Mid-January sits 54 days before the spring transition.
    event.timestamp = Utc.with_ymd_and_hms(2019, 1, 15, 12, 0, 0).single().unwrap();
    let result = timezones.resolve(&event);
    assert!(matches!(result, Err(ResolveError::DaysOutOfRange { .. })));
}
