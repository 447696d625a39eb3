//! Region and legal-time resolution over loaded reference data.
//!
//! This crate is the arithmetic half of the pipeline: given the boundary
//! store from `legaltime-boundaries`, it resolves each event to an
//! administrative region code (or an explicit unresolved marker) and a
//! statistically aggregated [`LegalTimeEstimate`].
//!
//! # Modules
//!
//! - [`error`] -- The [`ResolveError`] taxonomy: fatal configuration and
//!   consistency errors; expected ambiguity travels as data, not errors.
//! - [`dst`] -- [`TransitionCalculator`]: seasonal transitions via binary
//!   search over scanned transition tables, with one-hour validation.
//! - [`rounding`] -- Remainder-preserving percentage rounding.
//! - [`localize`] -- The legal-time aggregator (fast single-candidate path
//!   and the weighted-resample slow path).
//! - [`cache`] -- [`LookupCache`]: insert-once per-event memoization.
//! - [`overrides`] -- Read-only disable/remap/alias tables.
//! - [`region`] -- [`RegionResolver`]: overrides, names, then geometry.
//! - [`timezone`] -- [`TimezoneResolver`]: cached candidates into the
//!   aggregator.
//!
//! [`LegalTimeEstimate`]: legaltime_types::LegalTimeEstimate

pub mod cache;
pub mod dst;
pub mod error;
pub mod localize;
pub mod overrides;
pub mod region;
pub mod rounding;
pub mod timezone;

// Re-export primary types at crate root.
pub use cache::LookupCache;
pub use dst::{DstTransition, REFERENCE_TIMEZONE, TransitionCalculator};
pub use error::ResolveError;
pub use localize::localize;
pub use overrides::{OverrideTables, PlaceOverrides};
pub use region::RegionResolver;
pub use rounding::saferound;
pub use timezone::TimezoneResolver;
