//! Event records and the axis-aligned query box derived from their
//! coordinates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::EventId;

/// Axis-aligned bounding rectangle in geographic coordinates.
///
/// Zero-area boxes are legal input: events recorded as a single point
/// arrive with `min == max` on both axes and are buffered by the
/// disambiguator before intersection testing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryBox {
    /// Western bound (degrees longitude).
    pub min_lon: f64,
    /// Southern bound (degrees latitude).
    pub min_lat: f64,
    /// Eastern bound (degrees longitude).
    pub max_lon: f64,
    /// Northern bound (degrees latitude).
    pub max_lat: f64,
}

impl QueryBox {
    /// Build a query box from `[min_lon, min_lat, max_lon, max_lat]` bounds.
    pub const fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Planar area of the box in square degrees.
    pub fn area(&self) -> f64 {
        (self.max_lon - self.min_lon) * (self.max_lat - self.min_lat)
    }

    /// Whether the box degenerates to a point or a line.
    pub fn is_degenerate(&self) -> bool {
        self.area() <= 0.0
    }

    /// Return a copy expanded by `margin` degrees on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min_lon: self.min_lon - margin,
            min_lat: self.min_lat - margin,
            max_lon: self.max_lon + margin,
            max_lat: self.max_lat + margin,
        }
    }
}

/// A geotagged event as consumed from collaborators: an opaque identifier,
/// a bounding box (possibly a point), an optional free-text location name,
/// and a UTC instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Opaque event identifier used for diagnostics and caching.
    pub id: EventId,
    /// Free-text location name, when the ingesting collaborator had one
    /// (e.g. `"Denver, CO"`). Consumed by the region resolver's name
    /// stages; geospatial resolution does not need it.
    pub name: Option<String>,
    /// Bounding box derived from the event's coordinates.
    pub query: QueryBox,
    /// The event's UTC instant.
    pub timestamp: DateTime<Utc>,
}
