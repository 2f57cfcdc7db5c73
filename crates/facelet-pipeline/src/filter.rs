//! Sticker filter: decide whether a traced boundary could be a facelet.
//!
//! A facelet's side is expected to be a third of the grid's edge
//! (`inner_scale / 3`). A boundary is accepted when its area matches a
//! square whose side is within a third of that expectation, and when the
//! trace returns close to where it started.
//!
//! The tolerances are empirical. Changing them changes which boundaries
//! reach the labeler.

use crate::types::{Candidate, Polygon};

/// Largest per-axis gap (pixels) between a boundary's first and last
/// points for it to count as closed.
pub const CLOSURE_TOLERANCE_PX: u32 = 30;

/// Accepted range of enclosed area for one facelet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaBand {
    /// Smallest accepted area (inclusive).
    pub min: f64,
    /// Largest accepted area (inclusive).
    pub max: f64,
}

impl AreaBand {
    /// Band for a grid of edge length `inner_scale`.
    ///
    /// `min = (s/3 - s/9)^2` and `max = (s/3 + s/9)^2`, using real
    /// division.
    #[must_use]
    pub fn for_inner_scale(inner_scale: u32) -> Self {
        let s = f64::from(inner_scale);
        let expected_side = s / 3.0;
        let slack = s / 9.0;
        Self {
            min: (expected_side - slack).powi(2),
            max: (expected_side + slack).powi(2),
        }
    }

    /// Whether `area` lies in the band, bounds included.
    #[must_use]
    pub fn contains(&self, area: f64) -> bool {
        (self.min..=self.max).contains(&area)
    }
}

/// Whether the boundary's enclosed area fits one facelet.
#[must_use]
pub fn within_area_band(polygon: &Polygon, inner_scale: u32) -> bool {
    AreaBand::for_inner_scale(inner_scale).contains(polygon.area())
}

/// Whether the boundary ends within [`CLOSURE_TOLERANCE_PX`] of its start
/// on both axes. Empty boundaries are not closed.
#[must_use]
pub fn is_closed(polygon: &Polygon) -> bool {
    match (polygon.first(), polygon.last()) {
        (Some(first), Some(last)) => {
            first.x.abs_diff(last.x) <= CLOSURE_TOLERANCE_PX
                && first.y.abs_diff(last.y) <= CLOSURE_TOLERANCE_PX
        }
        _ => false,
    }
}

/// Whether `polygon` is a plausible facelet: right area and closed.
#[must_use]
pub fn is_candidate(polygon: &Polygon, inner_scale: u32) -> bool {
    within_area_band(polygon, inner_scale) && is_closed(polygon)
}

/// Wrap every accepted polygon as a [`Candidate`], keeping input order.
///
/// Each candidate's `source_index` is its position in `polygons`.
#[must_use = "returns the accepted candidates"]
pub fn accept(polygons: &[Polygon], inner_scale: u32) -> Vec<Candidate> {
    let band = AreaBand::for_inner_scale(inner_scale);
    polygons
        .iter()
        .enumerate()
        .filter_map(|(index, polygon)| {
            let area = polygon.area();
            if !band.contains(area) {
                tracing::trace!(index, area, "rejected: area outside band");
                return None;
            }
            if !is_closed(polygon) {
                tracing::trace!(index, "rejected: open boundary");
                return None;
            }
            Some(Candidate::with_area(polygon.clone(), area, index))
        })
        .collect()
}
