//! Labeled polygon sets with a bounding-rect index.
//!
//! A [`PolygonSet`] is the in-memory form of one reference dataset: each
//! label (region code or timezone identifier) maps to one multi-polygon.
//! Labels are held in a `BTreeMap`, so iteration order is label sort order —
//! that order is the dataset order the tie-break policy in
//! [`overlay`](crate::overlay) relies on.
//!
//! Spatial queries use a two-stage test: a precomputed bounding rect per
//! entry filters candidates cheaply, then the exact polygon intersection
//! test runs on the survivors.

use std::collections::BTreeMap;

use geo::{BooleanOps, BoundingRect, Intersects, MultiPolygon, Polygon, Rect};

/// One labeled entry: geometry plus its precomputed bounds.
#[derive(Debug, Clone)]
struct SetEntry {
    geometry: MultiPolygon<f64>,
    /// `None` when the geometry is empty and can never intersect anything.
    bounds: Option<Rect<f64>>,
}

/// An immutable collection of labeled reference polygons.
#[derive(Debug, Clone, Default)]
pub struct PolygonSet {
    entries: BTreeMap<String, SetEntry>,
}

impl PolygonSet {
    /// Build a set from `(label, geometry)` pairs.
    ///
    /// Duplicate labels keep the last geometry seen. Bounding rects are
    /// computed once here.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, MultiPolygon<f64>)>,
    {
        let entries = pairs
            .into_iter()
            .map(|(label, geometry)| {
                let bounds = geometry.bounding_rect();
                (label, SetEntry { geometry, bounds })
            })
            .collect();
        Self { entries }
    }

    /// Number of labeled regions in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set holds no regions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a region's geometry by label.
    pub fn get(&self, label: &str) -> Option<&MultiPolygon<f64>> {
        self.entries.get(label).map(|e| &e.geometry)
    }

    /// Iterate over `(label, geometry)` in dataset (label sort) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MultiPolygon<f64>)> {
        self.entries.iter().map(|(l, e)| (l.as_str(), &e.geometry))
    }

    /// All labels in dataset order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Return the regions whose geometry intersects the query polygon, in
    /// dataset order.
    ///
    /// `query_rect` must be the bounding rect of `query`; it drives the
    /// coarse precheck before the exact test.
    pub fn intersecting(
        &self,
        query_rect: &Rect<f64>,
        query: &Polygon<f64>,
    ) -> Vec<(&str, &MultiPolygon<f64>)> {
        self.entries
            .iter()
            .filter(|(_, entry)| {
                entry
                    .bounds
                    .is_some_and(|bounds| bounds.intersects(query_rect))
            })
            .filter(|(_, entry)| entry.geometry.intersects(query))
            .map(|(label, entry)| (label.as_str(), &entry.geometry))
            .collect()
    }

    /// Union of every geometry in the set.
    ///
    /// Used once at load time to clip the timezone dataset to the region
    /// dataset's extent; not part of any per-event path.
    pub fn union(&self) -> MultiPolygon<f64> {
        self.entries
            .values()
            .fold(MultiPolygon::new(Vec::new()), |acc, entry| {
                acc.union(&entry.geometry)
            })
    }
}
