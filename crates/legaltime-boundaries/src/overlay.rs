//! Area-weighted disambiguation of a query box against a polygon set.
//!
//! Given a query box and a labeled reference set, decide which single label
//! the box belongs to — or report, explicitly, that the answer is ambiguous
//! or absent. The same algorithm serves both region and timezone
//! resolution; only the parameters differ.
//!
//! The retry-with-larger-buffer step is a bounded loop with an explicit
//! budget, not recursion: termination is guaranteed by the counter alone.

use geo::{BooleanOps, MultiPolygon, Polygon, Rect};
use legaltime_types::{Candidate, Decision, QueryBox};
use tracing::debug;

use crate::dataset::PolygonSet;
use crate::error::BoundaryError;
use crate::project::overlap_area;

/// Minimum overlap share (percent) for a top candidate to count as a
/// decisive, unique match. Empirically chosen upstream; preserved exactly.
pub const DECISIVE_SHARE: f64 = 80.0;

/// Tuning for one disambiguation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapParams {
    /// Buffer (degrees) applied to zero-area query boxes before
    /// intersection testing.
    pub zero_area_buffer: f64,
    /// How many times a zero-intersection query may retry with a buffer one
    /// order of magnitude larger.
    pub retry_budget: u32,
    /// Overlap share above which the top candidate wins outright.
    pub decisive_share: f64,
    /// Whether overlap areas are taken on the equal-area plane. Either
    /// choice is internally consistent; equal-area avoids distortion for
    /// the pole-spanning region dataset.
    pub equal_area: bool,
}

impl OverlapParams {
    /// Parameters for administrative region disambiguation: tight buffer,
    /// no retry, equal-area accounting.
    pub const fn regions() -> Self {
        Self {
            zero_area_buffer: 1e-4,
            retry_budget: 0,
            decisive_share: DECISIVE_SHARE,
            equal_area: true,
        }
    }

    /// Parameters for timezone disambiguation: looser buffer, one retry,
    /// planar accounting.
    pub const fn timezones() -> Self {
        Self {
            zero_area_buffer: 1e-3,
            retry_budget: 1,
            decisive_share: DECISIVE_SHARE,
            equal_area: false,
        }
    }
}

/// Disambiguate a query box against a labeled polygon set.
///
/// Decision policy, in order:
/// - no intersections: retry with a buffer one order of magnitude larger
///   while budget remains, then [`Decision::NoMatch`];
/// - exactly one intersection: [`Decision::Unique`];
/// - every region in the set intersects: a degenerate artifact of malformed
///   continent-wide boxes, reported as [`Decision::NoMatch`] (this is
///   long-observed upstream behavior, not a bug);
/// - otherwise rank by share of the total intersection area; a top share
///   above the decisiveness threshold is [`Decision::Unique`], anything
///   less is [`Decision::Ranked`].
///
/// Exact share ties keep dataset (label sort) order. That tie-break is
/// deliberately lowest-effort and kept as observed behavior; see the
/// open-questions section of the design notes before relying on it.
///
/// # Errors
///
/// Returns [`BoundaryError::ZeroOverlapArea`] if regions intersect the
/// query but the total intersection area still comes out zero — reference
/// geometry degenerate enough to make shares meaningless.
pub fn disambiguate(
    query: &QueryBox,
    set: &PolygonSet,
    params: &OverlapParams,
) -> Result<Decision, BoundaryError> {
    let mut margin = if query.is_degenerate() {
        params.zero_area_buffer
    } else {
        0.0
    };
    let mut retries_left = params.retry_budget;

    loop {
        let expanded = query.expanded(margin);
        let rect = query_rect(&expanded);
        let polygon = rect.to_polygon();
        let hits = set.intersecting(&rect, &polygon);

        if hits.is_empty() {
            if retries_left == 0 {
                return Ok(Decision::NoMatch);
            }
            retries_left = retries_left.saturating_sub(1);
            margin = margin.max(params.zero_area_buffer) * 10.0;
            debug!(margin, retries_left, "no intersections, retrying with larger buffer");
            continue;
        }

        if hits.len() == 1 {
            return Ok(hits
                .first()
                .map(|(label, _)| Decision::Unique((*label).to_owned()))
                .unwrap_or(Decision::NoMatch));
        }

        if hits.len() == set.len() {
            // Matches the entire universe: a malformed box "covering
            // everything" carries no location signal.
            debug!(universe = set.len(), "query matched whole dataset");
            return Ok(Decision::NoMatch);
        }

        return rank_by_overlap(&polygon, &hits, params);
    }
}

/// Rank intersecting regions by their share of the total intersection area.
fn rank_by_overlap(
    query: &Polygon<f64>,
    hits: &[(&str, &MultiPolygon<f64>)],
    params: &OverlapParams,
) -> Result<Decision, BoundaryError> {
    let query_mp = MultiPolygon::new(vec![query.clone()]);

    let areas: Vec<(&str, f64)> = hits
        .iter()
        .map(|(label, geometry)| {
            let intersection = geometry.intersection(&query_mp);
            (*label, overlap_area(&intersection, params.equal_area))
        })
        .collect();

    let total: f64 = areas.iter().map(|(_, area)| area).sum();
    if total <= 0.0 {
        return Err(BoundaryError::ZeroOverlapArea);
    }

    let mut candidates: Vec<Candidate> = areas
        .into_iter()
        .map(|(label, area)| Candidate::new(label, area / total * 100.0))
        .collect();
    // Stable sort: exact ties keep dataset order.
    candidates.sort_by(|a, b| {
        b.share
            .partial_cmp(&a.share)
            .unwrap_or(core::cmp::Ordering::Equal)
    });

    match candidates.first() {
        Some(top) if top.share > params.decisive_share => {
            Ok(Decision::Unique(top.label.clone()))
        }
        Some(_) => Ok(Decision::Ranked(candidates)),
        None => Ok(Decision::NoMatch),
    }
}

/// Build the geo rect for an expanded query box.
fn query_rect(query: &QueryBox) -> Rect<f64> {
    Rect::new(
        geo::coord! { x: query.min_lon, y: query.min_lat },
        geo::coord! { x: query.max_lon, y: query.max_lat },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use geo::polygon;

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

    /// A, B adjacent 10-degree squares on the equator; C far away.
    fn three_region_set() -> PolygonSet {
        PolygonSet::from_pairs(vec![
            ("A".to_owned(), square(0.0, 0.0, 10.0)),
            ("B".to_owned(), square(10.0, 0.0, 10.0)),
            ("C".to_owned(), square(40.0, 0.0, 10.0)),
        ])
    }

    fn planar() -> OverlapParams {
        // Equal-area off keeps expected shares exact on synthetic squares.
        OverlapParams {
            equal_area: false,
            ..OverlapParams::timezones()
        }
    }

    #[test]
    fn fully_contained_box_is_unique() {
        let set = three_region_set();
        let query = QueryBox::new(2.0, 2.0, 4.0, 4.0);
        let decision = disambiguate(&query, &set, &planar()).unwrap();
        assert_eq!(decision, Decision::Unique("A".to_owned()));
    }

    #[test]
    fn distant_box_is_no_match_after_retry() {
        let set = three_region_set();
        let query = QueryBox::new(200.0, 50.0, 201.0, 51.0);
        let decision = disambiguate(&query, &set, &planar()).unwrap();
        assert_eq!(decision, Decision::NoMatch);
    }

    #[test]
    fn whole_universe_match_is_no_match() {
        let set = three_region_set();
        let query = QueryBox::new(-5.0, -5.0, 55.0, 15.0);
        let decision = disambiguate(&query, &set, &planar()).unwrap();
        assert_eq!(decision, Decision::NoMatch);
    }

    #[test]
    fn dominant_share_is_unique() {
        let set = three_region_set();
        // 8.5 degrees in A, 1.5 in B: 85% / 15%.
        let query = QueryBox::new(1.5, 0.0, 11.5, 10.0);
        let decision = disambiguate(&query, &set, &planar()).unwrap();
        assert_eq!(decision, Decision::Unique("A".to_owned()));
    }

    #[test]
    fn near_even_split_is_ranked() {
        let set = three_region_set();
        // 5.5 degrees in A, 4.5 in B: 55% / 45%.
        let query = QueryBox::new(4.5, 0.0, 14.5, 10.0);
        let decision = disambiguate(&query, &set, &planar()).unwrap();
        let Decision::Ranked(candidates) = decision else {
            panic!("expected ranked, got {decision:?}");
        };
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].label, "A");
        assert!((candidates[0].share - 55.0).abs() < 1e-6);
        assert!((candidates[1].share - 45.0).abs() < 1e-6);
        let sum: f64 = candidates.iter().map(|c| c.share).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn exact_tie_keeps_dataset_order() {
        let set = three_region_set();
        // Symmetric straddle of the A|B boundary: exactly 50/50.
        let query = QueryBox::new(5.0, 0.0, 15.0, 10.0);
        let decision = disambiguate(&query, &set, &planar()).unwrap();
        let Decision::Ranked(candidates) = decision else {
            panic!("expected ranked, got {decision:?}");
        };
        assert_eq!(candidates[0].label, "A");
        assert_eq!(candidates[1].label, "B");
    }

    #[test]
    fn point_event_is_buffered_to_a_match() {
        let set = three_region_set();
        let query = QueryBox::new(3.0, 3.0, 3.0, 3.0);
        let decision = disambiguate(&query, &set, &planar()).unwrap();
        assert_eq!(decision, Decision::Unique("A".to_owned()));
    }

    #[test]
    fn retry_budget_reaches_a_near_miss() {
        let set = three_region_set();
        // 0.005 degrees west of A: outside the 1e-3 first buffer, inside
        // the 1e-2 retry buffer.
        let near_miss = QueryBox::new(-0.005, 5.0, -0.005, 5.0);
        let with_retry = disambiguate(&near_miss, &set, &planar()).unwrap();
        assert_eq!(with_retry, Decision::Unique("A".to_owned()));

        // Region parameters have no retry budget and a tighter buffer.
        let no_retry = disambiguate(&near_miss, &set, &OverlapParams::regions()).unwrap();
        assert_eq!(no_retry, Decision::NoMatch);
    }
}
