//! Cylindrical equal-area projection for overlap accounting.
//!
//! Overlap shares computed in raw geographic coordinates over-weight
//! intersections far from the equator. Region disambiguation therefore
//! projects intersections to a cylindrical equal-area plane before taking
//! areas (`x = R·λ`, `y = R·sin φ`); timezone disambiguation stays in
//! geographic coordinates, which is consistent as long as numerator and
//! denominator use the same plane.

use geo::{Area, MapCoords, MultiPolygon};

/// Mean earth radius in meters. Any constant works for percentage shares
/// (the scale cancels), but projected areas come out in square meters.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Project a geographic multi-polygon onto the cylindrical equal-area plane.
pub fn to_equal_area(geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    geometry.map_coords(|c| {
        geo::coord! {
            x: EARTH_RADIUS_M * c.x.to_radians(),
            y: EARTH_RADIUS_M * c.y.to_radians().sin(),
        }
    })
}

/// Area of a geographic multi-polygon, equal-area projected when
/// `equal_area` is set, planar square degrees otherwise.
pub fn overlap_area(geometry: &MultiPolygon<f64>, equal_area: bool) -> f64 {
    if equal_area {
        to_equal_area(geometry).unsigned_area()
    } else {
        geometry.unsigned_area()
    }
}
