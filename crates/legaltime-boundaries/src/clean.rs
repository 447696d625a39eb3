//! Dataset-specific cleaning applied once, before a cache artifact is
//! written.
//!
//! The raw sources carry more than the resolvers want: the region source
//! includes non-state territories, and the timezone source covers the whole
//! planet. Cleaning reduces both to the area of interest so every later
//! query runs against small, relevant sets.

use geo::BooleanOps;
use tracing::debug;

use crate::dataset::PolygonSet;
use crate::error::BoundaryError;
use crate::geojson_io::RawFeature;
use crate::project::overlap_area;

/// Property carrying the two-letter postal code in the raw region source.
pub const REGION_CODE_PROPERTY: &str = "STUSPS";

/// Property carrying the FIPS code in the raw region source.
pub const REGION_FIPS_PROPERTY: &str = "STATEFP";

/// Property carrying the zone identifier in the raw timezone source.
pub const TIMEZONE_ID_PROPERTY: &str = "tzid";

/// Territories present in the region source that are not states for our
/// purposes. The District of Columbia is deliberately NOT on this list:
/// dropping it at load time made events over the capital match nothing at
/// all, so it stays in the dataset and the region resolver filters it after
/// resolution.
const NON_REGION_FIPS: [&str; 5] = [
    "60", // American Samoa
    "66", // Guam
    "69", // Northern Mariana Islands
    "72", // Puerto Rico
    "78", // Virgin Islands
];

/// Minimum share (percent) of a zone's area that must fall inside the
/// region union for the zone to survive cleaning.
const MIN_INSIDE_SHARE: f64 = 1.0;

/// Clean the raw region source: drop non-state territories and keep only
/// the postal code and geometry.
pub fn clean_regions(features: Vec<RawFeature>) -> Result<PolygonSet, BoundaryError> {
    let mut pairs = Vec::new();
    for feature in features {
        let fips =
            feature
                .string_property(REGION_FIPS_PROPERTY)
                .ok_or_else(|| BoundaryError::MissingProperty {
                    property: REGION_FIPS_PROPERTY.to_owned(),
                })?;
        if NON_REGION_FIPS.contains(&fips) {
            debug!(fips, "dropping non-state territory");
            continue;
        }
        let code =
            feature
                .string_property(REGION_CODE_PROPERTY)
                .ok_or_else(|| BoundaryError::MissingProperty {
                    property: REGION_CODE_PROPERTY.to_owned(),
                })?;
        pairs.push((code.to_owned(), feature.geometry));
    }
    if pairs.is_empty() {
        return Err(BoundaryError::EmptyDataset {
            name: "regions".to_owned(),
        });
    }
    Ok(PolygonSet::from_pairs(pairs))
}

/// Clean the raw timezone source against the cleaned region set: drop zones
/// with under [`MIN_INSIDE_SHARE`] percent of their area inside the region
/// union, then clip the survivors to that union.
///
/// Filtering before clipping keeps sliver zones (a fraction of a percent
/// inside the area of interest) out of every later disambiguation.
pub fn clean_timezones(
    features: Vec<RawFeature>,
    regions: &PolygonSet,
) -> Result<PolygonSet, BoundaryError> {
    let area_of_interest = regions.union();

    let mut pairs = Vec::new();
    for feature in features {
        let zone_id =
            feature
                .string_property(TIMEZONE_ID_PROPERTY)
                .ok_or_else(|| BoundaryError::MissingProperty {
                    property: TIMEZONE_ID_PROPERTY.to_owned(),
                })?;
        let zone_area = overlap_area(&feature.geometry, true);
        if zone_area <= 0.0 {
            continue;
        }
        let inside = feature.geometry.intersection(&area_of_interest);
        let inside_share = overlap_area(&inside, true) / zone_area * 100.0;
        if inside_share < MIN_INSIDE_SHARE {
            debug!(zone_id, inside_share, "dropping zone outside area of interest");
            continue;
        }
        pairs.push((zone_id.to_owned(), inside));
    }
    if pairs.is_empty() {
        return Err(BoundaryError::EmptyDataset {
            name: "timezones".to_owned(),
        });
    }
    Ok(PolygonSet::from_pairs(pairs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use geo::{Area, MultiPolygon, polygon};

    use super::*;

    fn square(min_x: f64, min_y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: min_x, y: min_y),
            (x: min_x + size, y: min_y),
            (x: min_x + size, y: min_y + size),
            (x: min_x, y: min_y + size),
            (x: min_x, y: min_y),
        ]])
    }

    fn raw(properties: &[(&str, &str)], geometry: MultiPolygon<f64>) -> RawFeature {
        let properties = properties
            .iter()
            .map(|(k, v)| ((*k).to_owned(), serde_json::Value::String((*v).to_owned())))
            .collect();
        RawFeature {
            properties,
            geometry,
        }
    }

    #[test]
    fn territories_are_dropped_but_dc_is_kept() {
        let features = vec![
            raw(
                &[(REGION_FIPS_PROPERTY, "08"), (REGION_CODE_PROPERTY, "CO")],
                square(0.0, 0.0, 5.0),
            ),
            raw(
                &[(REGION_FIPS_PROPERTY, "11"), (REGION_CODE_PROPERTY, "DC")],
                square(10.0, 0.0, 1.0),
            ),
            raw(
                &[(REGION_FIPS_PROPERTY, "72"), (REGION_CODE_PROPERTY, "PR")],
                square(20.0, 0.0, 2.0),
            ),
        ];
        let set = clean_regions(features).unwrap();
        let labels: Vec<&str> = set.labels().collect();
        assert_eq!(labels, vec!["CO", "DC"]);
    }

    #[test]
    fn all_territories_is_an_empty_dataset() {
        let features = vec![raw(
            &[(REGION_FIPS_PROPERTY, "66"), (REGION_CODE_PROPERTY, "GU")],
            square(0.0, 0.0, 2.0),
        )];
        assert!(matches!(
            clean_regions(features),
            Err(BoundaryError::EmptyDataset { .. })
        ));
    }

    #[test]
    fn distant_zones_are_dropped_and_survivors_clipped() {
        let regions = PolygonSet::from_pairs(vec![("AA".to_owned(), square(0.0, 0.0, 10.0))]);
        let features = vec![
            // Half inside the area of interest.
            raw(&[(TIMEZONE_ID_PROPERTY, "Zone/Inside")], square(5.0, 0.0, 10.0)),
            // Entirely outside.
            raw(
                &[(TIMEZONE_ID_PROPERTY, "Zone/Outside")],
                square(100.0, 0.0, 10.0),
            ),
        ];
        let set = clean_timezones(features, &regions).unwrap();
        let labels: Vec<&str> = set.labels().collect();
        assert_eq!(labels, vec!["Zone/Inside"]);

        // Survivor is clipped to the overlapping 5x10 strip.
        let clipped = set.get("Zone/Inside").unwrap();
        assert!((clipped.unsigned_area() - 50.0).abs() < 1e-6);
    }
}
