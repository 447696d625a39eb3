//! Error types for the `legaltime-resolve` crate.
//!
//! The taxonomy separates fatal configuration/consistency errors (reference
//! data untrustworthy, invariant violated) from expected ambiguity, which is
//! not an error at all: `NoMatch` and `Ranked` outcomes travel through
//! [`Decision`](legaltime_types::Decision), never through this enum. The one
//! exception is a failed geospatial timezone search, which the original
//! pipeline treats as fatal for the event.

use legaltime_boundaries::BoundaryError;
use legaltime_types::RegionCode;

/// Errors that can occur during region or legal-time resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A boundary-store or disambiguation failure.
    #[error(transparent)]
    Boundary {
        /// The underlying boundary error.
        #[from]
        source: BoundaryError,
    },

    /// An override table could not be read from disk.
    #[error("failed to read override table {path}: {source}")]
    TableIo {
        /// Path of the table file.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An override table was not valid JSON of the expected shape.
    #[error("failed to parse override table {path}: {source}")]
    TableParse {
        /// Path of the table file.
        path: String,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A candidate label was not a known IANA timezone.
    #[error("unknown timezone identifier: {name}")]
    UnknownTimezone {
        /// The unrecognized identifier.
        name: String,
    },

    /// The geospatial timezone search produced no candidates even after the
    /// retry budget. Unlike region resolution, the timezone pipeline cannot
    /// proceed without a candidate set.
    #[error("geospatial timezone search found no candidates")]
    NoTimezoneMatch,

    /// A calendar instant could not be constructed for the given year.
    #[error("invalid calendar year: {year}")]
    InvalidCalendar {
        /// The offending year.
        year: i32,
    },

    /// No transition exists at or before the seasonal probe instant.
    #[error("no transition found for {zone} at or before the {year} probe")]
    NoTransitionFound {
        /// The timezone whose table was searched.
        zone: String,
        /// The requested year.
        year: i32,
    },

    /// The transition found by binary search belongs to the wrong year,
    /// indicating a stale or incomplete transition table.
    #[error("transition year mismatch: requested {requested}, found {found}")]
    TransitionYearMismatch {
        /// The year the caller asked about.
        requested: i32,
        /// The year of the transition actually found.
        found: i32,
    },

    /// The seasonal clock change was not the one-hour shift this design
    /// depends on.
    #[error("transition is not a one-hour shift (delta {delta_seconds}s)")]
    NotOneHourShift {
        /// Observed DST-offset delta across the transition, in seconds.
        delta_seconds: i64,
    },

    /// A computed UTC offset fell outside the plausible range.
    #[error("offset {hours}h for {zone} outside [-24, 24]")]
    OffsetOutOfRange {
        /// The candidate timezone.
        zone: String,
        /// The offending offset in hours.
        hours: f64,
    },

    /// Days-since-transition fell outside the `[-35, 35]` window,
    /// signaling a transition-table/input mismatch.
    #[error("days since transition {days} for {zone} outside [-35, 35]")]
    DaysOutOfRange {
        /// The candidate timezone.
        zone: String,
        /// The offending signed day offset.
        days: f64,
    },

    /// The aggregator was handed an empty candidate set.
    #[error("cannot localize with zero timezone candidates")]
    EmptyCandidates,

    /// Rounded area weights did not sum to the expected total.
    #[error("rounded weights sum to {sum}, expected {target}")]
    WeightRounding {
        /// The sum actually obtained.
        sum: u32,
        /// The required total.
        target: u32,
    },

    /// An aggregate came out non-finite; internal consistency violated.
    #[error("non-finite aggregate in field {field}")]
    NonFinite {
        /// Name of the offending estimate field.
        field: &'static str,
    },

    /// A resolved region code is not on the known-code list.
    #[error("resolved unknown region code: {code}")]
    UnknownRegion {
        /// The unrecognized code.
        code: RegionCode,
    },
}
