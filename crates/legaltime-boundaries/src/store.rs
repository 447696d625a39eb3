//! The boundary store: both reference datasets, loaded once and immutable
//! for the life of the process.
//!
//! The store is constructed explicitly at startup and passed by reference to
//! the resolvers — there is no module-level global and no lazy load inside
//! the hot path. Per dataset the load is cache-or-fetch: an existing
//! non-empty cache artifact is parsed directly; otherwise the canonical
//! source is downloaded, cleaned, persisted as the new cache artifact, and
//! returned. Disk I/O therefore happens exactly once per dataset per
//! process.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::info;

use crate::clean::{clean_regions, clean_timezones};
use crate::dataset::PolygonSet;
use crate::error::BoundaryError;
use crate::fetch::{file_exists_non_zero, maybe_download};
use crate::geojson_io::{read_features, read_polygon_set, write_polygon_set};

/// Property carrying the label in cleaned cache artifacts.
const CACHE_LABEL_PROPERTY: &str = "code";

/// Where one dataset lives: its cleaned cache artifact, the raw download
/// destination, and the canonical source URL used only when the cache is
/// absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetConfig {
    /// Path of the cleaned cache artifact (GeoJSON).
    pub cache_path: PathBuf,
    /// Path the raw source document is downloaded to.
    pub source_path: PathBuf,
    /// Canonical source URL (GeoJSON document).
    pub source_url: String,
}

/// Configuration for both reference datasets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoundaryConfig {
    /// Administrative region dataset.
    #[serde(default = "default_region_dataset")]
    pub regions: DatasetConfig,
    /// Timezone boundary dataset.
    #[serde(default = "default_timezone_dataset")]
    pub timezones: DatasetConfig,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            regions: default_region_dataset(),
            timezones: default_timezone_dataset(),
        }
    }
}

fn default_region_dataset() -> DatasetConfig {
    DatasetConfig {
        cache_path: PathBuf::from("shape/regions.geojson"),
        source_path: PathBuf::from("shape/cb_2018_us_state_500k.geojson"),
        source_url:
            "https://www2.census.gov/geo/tiger/GENZ2018/geojson/cb_2018_us_state_500k.geojson"
                .to_owned(),
    }
}

fn default_timezone_dataset() -> DatasetConfig {
    DatasetConfig {
        cache_path: PathBuf::from("shape/timezones.geojson"),
        source_path: PathBuf::from("shape/timezones-2021c.geojson"),
        source_url: "https://github.com/evansiroky/timezone-boundary-builder/releases/download/2021c/timezones.geojson"
            .to_owned(),
    }
}

/// Both reference polygon datasets, read-only after construction.
#[derive(Debug)]
pub struct BoundaryStore {
    regions: PolygonSet,
    timezones: PolygonSet,
}

impl BoundaryStore {
    /// Load both datasets per the cache-or-fetch contract.
    ///
    /// The region dataset loads first because timezone cleaning clips
    /// against the region union.
    ///
    /// # Errors
    ///
    /// Any fetch, parse, or cleaning failure is fatal: the caller cannot
    /// resolve anything without reference data.
    pub fn load(config: &BoundaryConfig) -> Result<Self, BoundaryError> {
        let regions = load_dataset(&config.regions, |raw| clean_regions(raw))?;
        info!(count = regions.len(), "region dataset loaded");

        let timezones = load_dataset(&config.timezones, |raw| clean_timezones(raw, &regions))?;
        info!(count = timezones.len(), "timezone dataset loaded");

        Ok(Self { regions, timezones })
    }

    /// Build a store directly from in-memory sets (tests, embedding).
    pub const fn from_sets(regions: PolygonSet, timezones: PolygonSet) -> Self {
        Self { regions, timezones }
    }

    /// The administrative region dataset.
    pub const fn regions(&self) -> &PolygonSet {
        &self.regions
    }

    /// The timezone boundary dataset.
    pub const fn timezones(&self) -> &PolygonSet {
        &self.timezones
    }
}

/// Cache-or-fetch one dataset, cleaning raw features with `clean`.
fn load_dataset(
    config: &DatasetConfig,
    clean: impl FnOnce(Vec<crate::geojson_io::RawFeature>) -> Result<PolygonSet, BoundaryError>,
) -> Result<PolygonSet, BoundaryError> {
    if file_exists_non_zero(&config.cache_path) {
        return read_polygon_set(&config.cache_path, CACHE_LABEL_PROPERTY);
    }

    maybe_download(&config.source_url, &config.source_path)?;
    let raw = read_features(&config.source_path)?;
    let cleaned = clean(raw)?;
    write_polygon_set(&config.cache_path, &cleaned, CACHE_LABEL_PROPERTY)?;
    info!(
        cache = %config.cache_path.display(),
        "cleaned dataset persisted as cache artifact"
    );
    Ok(cleaned)
}
