//! Shared type definitions for the legaltime resolution pipeline.
//!
//! This crate holds the vocabulary every other crate speaks: strongly-typed
//! string identifiers, the event record and its query box, disambiguation
//! outcomes, and the legal-time estimate.
//!
//! # Modules
//!
//! - [`ids`] -- Newtype wrappers for event, region, and timezone identifiers.
//! - [`event`] -- [`EventRecord`] and the axis-aligned [`QueryBox`].
//! - [`decision`] -- [`Candidate`] rankings and the three-way [`Decision`].
//! - [`estimate`] -- [`LegalTimeEstimate`] and the [`DstSeason`] regime enum.

pub mod decision;
pub mod estimate;
pub mod event;
pub mod ids;

// Re-export primary types at crate root.
pub use decision::{Candidate, Decision};
pub use estimate::{DstSeason, LegalTimeEstimate};
pub use event::{EventRecord, QueryBox};
pub use ids::{EventId, RegionCode, TzName};
