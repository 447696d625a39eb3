//! GeoJSON reading and writing for reference datasets.
//!
//! Cache artifacts are GeoJSON `FeatureCollection`s: one feature per labeled
//! region, the label in a configurable string property (`code` for cleaned
//! caches, the upstream property names for raw source documents). Only
//! areal geometries are accepted — a polygon dataset with point or line
//! features is reference-data corruption, not something to skip silently.

use std::path::Path;

use geo::MultiPolygon;
use geojson::{Feature, FeatureCollection, GeoJson};

use crate::dataset::PolygonSet;
use crate::error::BoundaryError;

/// One parsed feature: its property bag and its areal geometry.
#[derive(Debug, Clone)]
pub struct RawFeature {
    /// The feature's GeoJSON properties.
    pub properties: serde_json::Map<String, serde_json::Value>,
    /// The feature's geometry, normalized to a multi-polygon.
    pub geometry: MultiPolygon<f64>,
}

impl RawFeature {
    /// Fetch a string-valued property by name.
    pub fn string_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(|v| v.as_str())
    }
}

/// Read every feature of a GeoJSON file, normalizing geometries to
/// multi-polygons.
pub fn read_features(path: &Path) -> Result<Vec<RawFeature>, BoundaryError> {
    let text = std::fs::read_to_string(path)?;
    let parse_err = |source: geojson::Error| BoundaryError::Parse {
        path: path.display().to_string(),
        source: Box::new(source),
    };
    let geojson: GeoJson = text.parse().map_err(parse_err)?;
    let collection = FeatureCollection::try_from(geojson).map_err(parse_err)?;

    collection
        .features
        .into_iter()
        .map(|feature| {
            let properties = feature.properties.unwrap_or_default();
            let label = properties
                .values()
                .find_map(|v| v.as_str())
                .unwrap_or("<unlabeled>")
                .to_owned();
            let geometry = feature
                .geometry
                .ok_or_else(|| BoundaryError::UnsupportedGeometry {
                    label: label.clone(),
                })?;
            let geometry = geo::Geometry::<f64>::try_from(geometry.value)
                .map_err(parse_err)
                .and_then(|g| into_multi_polygon(g, &label))?;
            Ok(RawFeature {
                properties,
                geometry,
            })
        })
        .collect()
}

/// Read a cleaned cache artifact into a [`PolygonSet`], taking labels from
/// `label_property`.
pub fn read_polygon_set(path: &Path, label_property: &str) -> Result<PolygonSet, BoundaryError> {
    let features = read_features(path)?;
    let pairs = features
        .into_iter()
        .map(|feature| {
            let label = feature
                .string_property(label_property)
                .ok_or_else(|| BoundaryError::MissingProperty {
                    property: label_property.to_owned(),
                })?
                .to_owned();
            Ok((label, feature.geometry))
        })
        .collect::<Result<Vec<_>, BoundaryError>>()?;
    Ok(PolygonSet::from_pairs(pairs))
}

/// Persist a [`PolygonSet`] as a GeoJSON `FeatureCollection`, writing each
/// label into `label_property`.
pub fn write_polygon_set(
    path: &Path,
    set: &PolygonSet,
    label_property: &str,
) -> Result<(), BoundaryError> {
    let features = set
        .iter()
        .map(|(label, geometry)| {
            let mut properties = serde_json::Map::new();
            properties.insert(
                label_property.to_owned(),
                serde_json::Value::String(label.to_owned()),
            );
            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, GeoJson::from(collection).to_string())?;
    Ok(())
}

/// Normalize a decoded geometry to a multi-polygon, rejecting non-areal
/// shapes.
fn into_multi_polygon(
    geometry: geo::Geometry<f64>,
    label: &str,
) -> Result<MultiPolygon<f64>, BoundaryError> {
    match geometry {
        geo::Geometry::Polygon(p) => Ok(MultiPolygon::new(vec![p])),
        geo::Geometry::MultiPolygon(mp) => Ok(mp),
        _ => Err(BoundaryError::UnsupportedGeometry {
            label: label.to_owned(),
        }),
    }
}
