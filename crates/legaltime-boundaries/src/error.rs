//! Error types for the `legaltime-boundaries` crate.
//!
//! Reference data failures are fatal by design: resolution cannot proceed
//! without trustworthy boundary polygons, so fetch and parse errors abort
//! instead of degrading.

/// Errors that can occur while loading or querying reference polygon data.
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    /// Downloading a canonical dataset failed.
    #[error("failed to fetch dataset from {url}: {source}")]
    Fetch {
        /// The canonical source URL.
        url: String,
        /// The underlying HTTP error.
        source: reqwest::Error,
    },

    /// Reading or writing a cache artifact failed.
    #[error("dataset I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A dataset file was not valid GeoJSON.
    #[error("failed to parse {path} as GeoJSON: {source}")]
    Parse {
        /// Path of the offending file.
        path: String,
        /// The underlying GeoJSON error.
        source: Box<geojson::Error>,
    },

    /// A feature was missing the property naming its label.
    #[error("feature missing string property {property:?}")]
    MissingProperty {
        /// The property that should carry the label.
        property: String,
    },

    /// A feature carried a geometry other than polygon or multi-polygon.
    #[error("feature {label:?} has non-areal geometry")]
    UnsupportedGeometry {
        /// Label of the offending feature.
        label: String,
    },

    /// A dataset contained no usable features after cleaning.
    #[error("dataset {name:?} is empty after cleaning")]
    EmptyDataset {
        /// Short dataset name (e.g. `regions`).
        name: String,
    },

    /// Intersecting regions were found but the total intersection area was
    /// zero, so overlap shares cannot be computed.
    #[error("total intersection area is zero; cannot compute overlap shares")]
    ZeroOverlapArea,
}
