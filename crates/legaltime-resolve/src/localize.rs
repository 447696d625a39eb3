//! The legal-time aggregator: per-candidate clock facts, then statistical
//! aggregation across area-weighted timezone candidates.
//!
//! A single candidate passes straight through. Multiple candidates are
//! expanded into a 100-element weighted sample (weights rounded with the
//! remainder-preserving scheme) from which the confidence interval,
//! clamped mean point estimate, probability-valued DST flags, and the
//! days-since-transition mode are computed. Every output is validated
//! finite and in range before it leaves; violations are fatal, never
//! coerced.

use chrono::{DateTime, Datelike, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use legaltime_types::{Candidate, DstSeason, LegalTimeEstimate, TzName};

use crate::dst::TransitionCalculator;
use crate::error::ResolveError;
use crate::rounding::saferound;

/// Rounded weights must sum to exactly this many sample elements.
const SAMPLE_SIZE: u32 = 100;

/// Largest plausible |UTC offset| in hours.
const MAX_OFFSET_HOURS: f64 = 24.0;

/// Largest plausible |days since transition|; beyond this the transition
/// table and the input instant do not belong to the same study window.
const MAX_TRANSITION_DAYS: f64 = 35.0;

/// Per-candidate clock facts at the event instant.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CandidateClock {
    /// Total UTC offset in hours.
    offset_hours: f64,
    /// 1.0 when the locale is past the spring transition (or before the
    /// fall one), 0.0 otherwise.
    is_dst: f64,
    /// Signed real-valued days between local time and the seasonal
    /// transition.
    days_since_transition: f64,
    /// 1.0 when the zone's own table has a transition in the local year.
    observes_dst: f64,
}

/// Aggregate area-weighted timezone candidates into a legal-time estimate.
///
/// Candidates arrive ranked by descending share; the first is reported as
/// the most probable timezone.
///
/// # Errors
///
/// Fatal on: an empty candidate set, an unknown timezone label, a violated
/// per-candidate invariant (offset or day range), weight rounding that
/// cannot reach 100, or any non-finite aggregate.
pub fn localize(
    utc: DateTime<Utc>,
    candidates: &[Candidate],
    calculator: &TransitionCalculator,
) -> Result<LegalTimeEstimate, ResolveError> {
    let most_probable = candidates
        .first()
        .map(|c| TzName::new(c.label.clone()))
        .ok_or(ResolveError::EmptyCandidates)?;

    let clocks = candidates
        .iter()
        .map(|c| clock_for(&c.label, utc, calculator))
        .collect::<Result<Vec<CandidateClock>, ResolveError>>()?;

    let estimate = if let [only] = clocks.as_slice() {
        // Fast path: one candidate, zero-width interval.
        LegalTimeEstimate {
            most_probable_timezone: most_probable,
            offset_lower: only.offset_hours,
            offset_point: only.offset_hours,
            offset_upper: only.offset_hours,
            is_dst: only.is_dst,
            days_since_transition: only.days_since_transition,
            timezone_experiences_dst: only.observes_dst,
        }
    } else {
        aggregate(most_probable, candidates, &clocks)?
    };

    validate_finite(&estimate)?;
    Ok(estimate)
}

/// Compute one candidate's clock facts.
fn clock_for(
    label: &str,
    utc: DateTime<Utc>,
    calculator: &TransitionCalculator,
) -> Result<CandidateClock, ResolveError> {
    let zone: Tz = label.parse().map_err(|_err| ResolveError::UnknownTimezone {
        name: label.to_owned(),
    })?;

    let offset = zone.offset_from_utc_datetime(&utc.naive_utc());
    let offset_hours = f64::from(offset.fix().local_minus_utc()) / 3600.0;
    if !(-MAX_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(&offset_hours) {
        return Err(ResolveError::OffsetOutOfRange {
            zone: label.to_owned(),
            hours: offset_hours,
        });
    }

    let season = DstSeason::from_month(utc.month());
    let transition = calculator.transition_for(utc.year(), season)?;

    let local = utc.with_timezone(&zone).naive_local();
    let days_since_transition =
        local.signed_duration_since(transition.local).num_seconds() as f64 / 86_400.0;
    if !(-MAX_TRANSITION_DAYS..=MAX_TRANSITION_DAYS).contains(&days_since_transition) {
        return Err(ResolveError::DaysOutOfRange {
            zone: label.to_owned(),
            days: days_since_transition,
        });
    }

    // At or before the transition in spring means standard time; after the
    // fall transition likewise. The flag is derived purely from the shared
    // calendar — `observes_dst` is what discounts zones that never shift.
    let before_transition = days_since_transition <= 0.0;
    let is_dst = match season {
        DstSeason::Spring => f64::from(u8::from(!before_transition)),
        DstSeason::Fall => f64::from(u8::from(before_transition)),
    };

    let observes = calculator.timezone_observes_dst(label, local.year())?;

    Ok(CandidateClock {
        offset_hours,
        is_dst,
        days_since_transition,
        observes_dst: f64::from(u8::from(observes)),
    })
}

/// Slow path: weighted 100-element resample and its statistics.
fn aggregate(
    most_probable: TzName,
    candidates: &[Candidate],
    clocks: &[CandidateClock],
) -> Result<LegalTimeEstimate, ResolveError> {
    let shares: Vec<f64> = candidates.iter().map(|c| c.share).collect();
    let weights = saferound(&shares, SAMPLE_SIZE)?;

    let mut sample: Vec<CandidateClock> = Vec::with_capacity(SAMPLE_SIZE as usize);
    for (clock, weight) in clocks.iter().zip(&weights) {
        for _ in 0..*weight {
            sample.push(*clock);
        }
    }
    let sample_len = u32::try_from(sample.len()).unwrap_or(u32::MAX);
    if sample_len != SAMPLE_SIZE {
        return Err(ResolveError::WeightRounding {
            sum: sample_len,
            target: SAMPLE_SIZE,
        });
    }

    let mut offsets: Vec<f64> = sample.iter().map(|c| c.offset_hours).collect();
    offsets.sort_by(f64::total_cmp);
    let offset_lower = percentile(&offsets, 0.025);
    let offset_upper = percentile(&offsets, 0.975);
    let offset_point = mean(&offsets).clamp(offset_lower, offset_upper);

    let is_dst = mean(&sample.iter().map(|c| c.is_dst).collect::<Vec<f64>>());
    let observes = mean(&sample.iter().map(|c| c.observes_dst).collect::<Vec<f64>>());
    // The mode, never the mean: averaging day offsets across a regime
    // boundary would produce a day count no candidate actually has.
    let days_since_transition = mode(
        &sample
            .iter()
            .map(|c| c.days_since_transition)
            .collect::<Vec<f64>>(),
    );

    Ok(LegalTimeEstimate {
        most_probable_timezone: most_probable,
        offset_lower,
        offset_point,
        offset_upper,
        is_dst,
        days_since_transition,
        timezone_experiences_dst: observes,
    })
}

/// Arithmetic mean; NaN on an empty slice (caught by the finiteness check).
fn mean(values: &[f64]) -> f64 {
    let total: f64 = values.iter().sum();
    total / values.len() as f64
}

/// Empirical quantile with linear interpolation over a sorted slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q * sorted.len().saturating_sub(1) as f64;
    let below = position.floor();
    let above = position.ceil();
    let at = |p: f64| {
        usize::try_from(p.max(0.0) as u64)
            .ok()
            .and_then(|i| sorted.get(i))
            .copied()
            .unwrap_or(f64::NAN)
    };
    at(below) + (at(above) - at(below)) * (position - below)
}

/// The most common value; on tied counts, the smallest.
fn mode(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut best = f64::NAN;
    let mut best_count = 0usize;
    let mut current = f64::NAN;
    let mut current_count = 0usize;
    for value in sorted {
        if value.total_cmp(&current).is_eq() {
            current_count = current_count.saturating_add(1);
        } else {
            current = value;
            current_count = 1;
        }
        // Strict comparison: an earlier (smaller) value keeps a tied count.
        if current_count > best_count {
            best = current;
            best_count = current_count;
        }
    }
    best
}

/// Reject any non-finite field before the estimate escapes.
fn validate_finite(estimate: &LegalTimeEstimate) -> Result<(), ResolveError> {
    let fields: [(&'static str, f64); 6] = [
        ("offset_lower", estimate.offset_lower),
        ("offset_point", estimate.offset_point),
        ("offset_upper", estimate.offset_upper),
        ("is_dst", estimate.is_dst),
        ("days_since_transition", estimate.days_since_transition),
        (
            "timezone_experiences_dst",
            estimate.timezone_experiences_dst,
        ),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            return Err(ResolveError::NonFinite { field });
        }
    }
    Ok(())
}
