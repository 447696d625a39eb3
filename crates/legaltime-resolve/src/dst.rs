//! DST transition lookup over scanned timezone transition tables.
//!
//! All zones under study share one transition calendar, so the *when* of a
//! seasonal clock change comes from a single fixed reference timezone. Per
//! (zone, year) a transition table is built by scanning the year for UTC
//! offset changes — a coarse daily probe refined by binary search to the
//! second — and the calculator then binary-searches the sorted instants for
//! the transition governing a season.
//!
//! Tables are immutable once built and cached insert-once behind `RwLock`s;
//! a racing first write recomputes the same deterministic value, which is
//! benign.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};

use legaltime_types::DstSeason;

use crate::error::ResolveError;

/// The fixed reference timezone whose transition history defines the shared
/// seasonal calendar.
pub const REFERENCE_TIMEZONE: Tz = chrono_tz::America::Denver;

/// The exactly-one-hour shift every studied transition must have, seconds.
const ONE_HOUR_SECS: i64 = 3600;

/// One offset change in a zone's scanned history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TransitionRecord {
    /// First UTC instant at which the new offset applies.
    utc: DateTime<Utc>,
    /// DST component of the offset before the change, seconds.
    dst_before: i64,
    /// DST component of the offset after the change, seconds.
    dst_after: i64,
}

/// A validated seasonal clock change in the reference timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DstTransition {
    /// The UTC instant the new offset takes effect.
    pub utc: DateTime<Utc>,
    /// The same instant expressed as reference-zone local naive time (using
    /// the post-transition offset). Day-offset arithmetic runs against this.
    pub local: NaiveDateTime,
    /// The year the transition belongs to.
    pub year: i32,
    /// Which seasonal regime it governs.
    pub season: DstSeason,
}

/// Finds and validates seasonal transitions, memoizing per year and season.
#[derive(Debug)]
pub struct TransitionCalculator {
    reference: Tz,
    changeovers: RwLock<BTreeMap<(i32, DstSeason), DstTransition>>,
    observance: RwLock<BTreeMap<(String, i32), bool>>,
}

impl TransitionCalculator {
    /// Calculator over the canonical reference timezone.
    pub fn new() -> Self {
        Self::with_reference(REFERENCE_TIMEZONE)
    }

    /// Calculator over an explicit reference timezone (tests, other study
    /// areas).
    pub fn with_reference(reference: Tz) -> Self {
        Self {
            reference,
            changeovers: RwLock::new(BTreeMap::new()),
            observance: RwLock::new(BTreeMap::new()),
        }
    }

    /// The seasonal clock change governing `season` of `year`.
    ///
    /// Binary-searches the reference zone's sorted transition instants for
    /// the latest transition at or before a probe chosen deep in the season
    /// (June 1 for spring, December 1 for fall).
    ///
    /// # Errors
    ///
    /// - [`ResolveError::NoTransitionFound`] / [`ResolveError::TransitionYearMismatch`]
    ///   when the table has no transition in the requested year — stale or
    ///   missing reference data.
    /// - [`ResolveError::NotOneHourShift`] when the change is not exactly
    ///   one hour, violating the design's core assumption.
    pub fn transition_for(
        &self,
        year: i32,
        season: DstSeason,
    ) -> Result<DstTransition, ResolveError> {
        let key = (year, season);
        if let Ok(guard) = self.changeovers.read()
            && let Some(hit) = guard.get(&key)
        {
            return Ok(*hit);
        }

        let computed = self.compute_changeover(year, season)?;
        if let Ok(mut guard) = self.changeovers.write() {
            guard.entry(key).or_insert(computed);
        }
        Ok(computed)
    }

    /// Whether `zone_name`'s own transition table contains a transition
    /// dated within `year` (up to the December 31 probe).
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownTimezone`] for identifiers absent
    /// from the IANA database.
    pub fn timezone_observes_dst(
        &self,
        zone_name: &str,
        year: i32,
    ) -> Result<bool, ResolveError> {
        let key = (zone_name.to_owned(), year);
        if let Ok(guard) = self.observance.read()
            && let Some(hit) = guard.get(&key)
        {
            return Ok(*hit);
        }

        let zone: Tz = zone_name
            .parse()
            .map_err(|_err| ResolveError::UnknownTimezone {
                name: zone_name.to_owned(),
            })?;
        let start = utc_instant(year, 1, 1)?;
        let cutoff = utc_instant(year, 12, 31)?;
        let observed = !scan_transitions(zone, start, cutoff)?.is_empty();

        if let Ok(mut guard) = self.observance.write() {
            guard.entry(key).or_insert(observed);
        }
        Ok(observed)
    }

    fn compute_changeover(
        &self,
        year: i32,
        season: DstSeason,
    ) -> Result<DstTransition, ResolveError> {
        // Include the prior year so a table whose latest entry predates the
        // requested year surfaces as a year mismatch, not an empty table.
        let prior = year
            .checked_sub(1)
            .ok_or(ResolveError::InvalidCalendar { year })?;
        let next = year
            .checked_add(1)
            .ok_or(ResolveError::InvalidCalendar { year })?;
        let table = scan_transitions(
            self.reference,
            utc_instant(prior, 1, 1)?,
            utc_instant(next, 1, 1)?,
        )?;

        let probe = match season {
            DstSeason::Spring => utc_instant(year, 6, 1)?,
            DstSeason::Fall => utc_instant(year, 12, 1)?,
        };

        let idx = table.partition_point(|t| t.utc <= probe);
        let found = idx
            .checked_sub(1)
            .and_then(|i| table.get(i))
            .ok_or_else(|| ResolveError::NoTransitionFound {
                zone: self.reference.name().to_owned(),
                year,
            })?;

        if found.utc.year() != year {
            return Err(ResolveError::TransitionYearMismatch {
                requested: year,
                found: found.utc.year(),
            });
        }

        let delta_seconds = found.dst_after.saturating_sub(found.dst_before);
        if delta_seconds.abs() != ONE_HOUR_SECS {
            return Err(ResolveError::NotOneHourShift { delta_seconds });
        }

        let local = found.utc.with_timezone(&self.reference).naive_local();
        Ok(DstTransition {
            utc: found.utc,
            local,
            year,
            season,
        })
    }
}

impl Default for TransitionCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Total and DST offset components at an instant, in seconds.
fn offset_at(zone: Tz, instant: DateTime<Utc>) -> (i32, i64) {
    let offset = zone.offset_from_utc_datetime(&instant.naive_utc());
    (
        offset.fix().local_minus_utc(),
        offset.dst_offset().num_seconds(),
    )
}

/// Scan `[start, end)` for offset changes in `zone`: coarse daily probe,
/// then binary refinement of each detected change to one-second precision.
fn scan_transitions(
    zone: Tz,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<TransitionRecord>, ResolveError> {
    let mut transitions = Vec::new();
    let mut cursor = start;

    while cursor < end {
        let next = cursor
            .checked_add_signed(Duration::days(1))
            .ok_or(ResolveError::InvalidCalendar { year: cursor.year() })?
            .min(end);
        let here = offset_at(zone, cursor);
        let there = offset_at(zone, next);
        if here != there {
            let instant = refine(zone, cursor, next, here)?;
            let (_, dst_after) = offset_at(zone, instant);
            transitions.push(TransitionRecord {
                utc: instant,
                dst_before: here.1,
                dst_after,
            });
        }
        cursor = next;
    }

    Ok(transitions)
}

/// First instant in `(lo, hi]` whose offset differs from `lo_offset`.
fn refine(
    zone: Tz,
    mut lo: DateTime<Utc>,
    mut hi: DateTime<Utc>,
    lo_offset: (i32, i64),
) -> Result<DateTime<Utc>, ResolveError> {
    while hi.signed_duration_since(lo) > Duration::seconds(1) {
        let half = hi.signed_duration_since(lo) / 2;
        let mid = lo
            .checked_add_signed(half)
            .ok_or(ResolveError::InvalidCalendar { year: lo.year() })?;
        if offset_at(zone, mid) == lo_offset {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(hi)
}

/// Midnight UTC of the given date.
fn utc_instant(year: i32, month: u32, day: u32) -> Result<DateTime<Utc>, ResolveError> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .ok_or(ResolveError::InvalidCalendar { year })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn spring_2019_changeover() {
        let calc = TransitionCalculator::new();
        let transition = calc.transition_for(2019, DstSeason::Spring).unwrap();
        // 2:00 AM MST on March 10, 2019 == 09:00 UTC.
        assert_eq!(transition.utc, utc_instant(2019, 3, 10).unwrap() + Duration::hours(9));
        // Expressed locally with the post-transition offset: 3:00 AM MDT.
        assert_eq!(
            transition.local,
            utc_instant(2019, 3, 10).unwrap().naive_utc() + Duration::hours(3)
        );
        assert_eq!(transition.year, 2019);
    }

    #[test]
    fn fall_2019_changeover() {
        let calc = TransitionCalculator::new();
        let transition = calc.transition_for(2019, DstSeason::Fall).unwrap();
        // 2:00 AM MDT on November 3, 2019 == 08:00 UTC.
        assert_eq!(transition.utc, utc_instant(2019, 11, 3).unwrap() + Duration::hours(8));
        // Locally (post-transition, MST): 1:00 AM.
        assert_eq!(
            transition.local,
            utc_instant(2019, 11, 3).unwrap().naive_utc() + Duration::hours(1)
        );
    }

    #[test]
    fn repeated_lookups_are_identical() {
        let calc = TransitionCalculator::new();
        let first = calc.transition_for(2020, DstSeason::Fall).unwrap();
        let second = calc.transition_for(2020, DstSeason::Fall).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn observance_distinguishes_zones() {
        let calc = TransitionCalculator::new();
        assert!(calc.timezone_observes_dst("America/Denver", 2019).unwrap());
        // Arizona has not observed DST since the 1960s.
        assert!(!calc.timezone_observes_dst("America/Phoenix", 2019).unwrap());
    }

    #[test]
    fn unknown_zone_is_an_error() {
        let calc = TransitionCalculator::new();
        let result = calc.timezone_observes_dst("Not/AZone", 2019);
        assert!(matches!(result, Err(ResolveError::UnknownTimezone { .. })));
    }

    #[test]
    fn half_hour_shift_reference_is_rejected() {
        // Lord Howe Island shifts by 30 minutes, violating the one-hour
        // assumption the aggregation depends on.
        let calc = TransitionCalculator::with_reference(chrono_tz::Australia::Lord_Howe);
        let result = calc.transition_for(2019, DstSeason::Spring);
        assert!(matches!(result, Err(ResolveError::NotOneHourShift { .. })));
    }

    #[test]
    fn transitionless_reference_is_rejected() {
        let calc = TransitionCalculator::with_reference(chrono_tz::America::Phoenix);
        let result = calc.transition_for(2019, DstSeason::Spring);
        assert!(matches!(
            result,
            Err(ResolveError::NoTransitionFound { .. })
                | Err(ResolveError::TransitionYearMismatch { .. })
        ));
    }
}
