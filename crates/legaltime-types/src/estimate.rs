//! The legal-time estimate produced per event, and the seasonal regime enum.

use serde::{Deserialize, Serialize};

use crate::ids::TzName;

/// Which seasonal clock-change regime an instant falls in.
///
/// The spring regime covers January through June (the relevant transition is
/// the spring-forward change); the fall regime covers July through December.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DstSeason {
    /// First half of the year; the spring-forward transition applies.
    Spring,
    /// Second half of the year; the fall-back transition applies.
    Fall,
}

impl DstSeason {
    /// Classify a UTC month (1-12) into its seasonal regime.
    pub const fn from_month(month: u32) -> Self {
        if month <= 6 { Self::Spring } else { Self::Fall }
    }
}

/// Statistically aggregated estimate of local legal time for one event.
///
/// Invariants, enforced by the aggregator before this value is returned:
/// `offset_lower <= offset_point <= offset_upper`; `is_dst` and
/// `timezone_experiences_dst` lie in `[0, 1]`; `days_since_transition` lies
/// in `[-35, 35]`; every field is finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalTimeEstimate {
    /// The timezone with the largest area weight among the candidates.
    pub most_probable_timezone: TzName,
    /// 2.5th percentile of the weighted offset distribution, in hours.
    pub offset_lower: f64,
    /// Point estimate of the UTC offset in hours (mean, clamped into the
    /// confidence interval).
    pub offset_point: f64,
    /// 97.5th percentile of the weighted offset distribution, in hours.
    pub offset_upper: f64,
    /// Probability that the event's locale was observing daylight-saving
    /// time: 0 or 1 for a single candidate, a weighted mean when the
    /// candidates disagree.
    pub is_dst: f64,
    /// Signed real-valued days between the event's local time and the
    /// relevant seasonal transition (mode across candidates, never a mean).
    pub days_since_transition: f64,
    /// Probability that the locale observes daylight saving at all in the
    /// event's year.
    pub timezone_experiences_dst: f64,
}
