//! Reference polygon datasets and area-weighted disambiguation.
//!
//! This crate owns the geometric half of legal-time resolution: it loads
//! and cleans the two reference datasets (administrative regions, timezone
//! boundaries), keeps them immutable behind the [`BoundaryStore`], and
//! decides which labeled region a query box belongs to via area-weighted
//! overlap shares.
//!
//! # Modules
//!
//! - [`dataset`] -- [`PolygonSet`]: labeled multi-polygons with a
//!   bounding-rect index, iterated in dataset (label sort) order.
//! - [`error`] -- Error types; reference-data failures are fatal.
//! - [`fetch`] -- One-time download of canonical sources when no cache
//!   artifact exists.
//! - [`geojson_io`] -- GeoJSON reading/writing of dataset artifacts.
//! - [`clean`] -- Dataset-specific cleaning (territory filter, area-of-
//!   interest clipping) applied before a cache artifact is written.
//! - [`project`] -- Cylindrical equal-area projection for overlap
//!   accounting.
//! - [`store`] -- [`BoundaryStore`]: both datasets, loaded once at startup.
//! - [`overlay`] -- [`disambiguate`]: the area-weighted decision algorithm.

pub mod clean;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod geojson_io;
pub mod overlay;
pub mod project;
pub mod store;

// Re-export primary types at crate root.
pub use dataset::PolygonSet;
pub use error::BoundaryError;
pub use overlay::{DECISIVE_SHARE, OverlapParams, disambiguate};
pub use store::{BoundaryConfig, BoundaryStore, DatasetConfig};
