//! Candidate selection: keep the largest facelet-sized boundaries.
//!
//! A face has nine stickers, and spurious boundaries that survive the
//! filter (glare, partial stickers) tend to be smaller than real ones, so
//! the nine largest candidates are kept.

use crate::filter;
use crate::types::{Candidate, Polygon};

/// Most candidates kept for one face.
pub const MAX_STICKERS: usize = 9;

/// Order candidates by area, largest first, and keep at most
/// [`MAX_STICKERS`].
///
/// The sort is stable: candidates with equal area stay in the order they
/// were given, so labeling is reproducible when two stickers trace to the
/// same area.
#[must_use = "returns the ranked candidates"]
pub fn rank(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.area().total_cmp(&a.area()));
    candidates.truncate(MAX_STICKERS);
    candidates
}

/// Filter `polygons` for facelet candidates and rank the survivors.
///
/// Returns fewer than nine candidates when fewer pass the filter.
#[must_use = "returns the selected candidates"]
pub fn select(polygons: &[Polygon], inner_scale: u32) -> Vec<Candidate> {
    rank(filter::accept(polygons, inner_scale))
}
