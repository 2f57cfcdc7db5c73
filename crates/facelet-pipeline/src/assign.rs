//! Label resolution: turn the raw many-to-many labels into a final
//! assignment.
//!
//! The labeler reports every containment it finds. Whether and how to
//! settle conflicts is a product decision, so it lives behind the
//! [`AssignmentPolicy`] trait with the [`AssignmentPolicyKind`] enum for
//! runtime selection. The default keeps the raw result.

use serde::{Deserialize, Serialize};

use crate::label::{GridPoint, Label, LabelAssignment, grid_points};
use crate::types::Candidate;

/// Selects how raw grid labels are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssignmentPolicyKind {
    /// Keep every label the labeler found, duplicates included.
    #[default]
    Permissive,

    /// Greedy nearest-point matching with conflict rejection.
    ///
    /// Labels are visited by increasing distance between the grid point
    /// and the candidate's centroid. A label is kept only if neither its
    /// position nor its candidate has been taken yet. The result is
    /// one-to-one and sorted by position.
    GreedyNearest,
}

/// Trait for label resolution strategies.
pub trait AssignmentPolicy {
    /// Resolve `labels`, computed over `candidates` in a crop of edge
    /// length `side`.
    fn resolve(&self, labels: &LabelAssignment, candidates: &[Candidate], side: u32)
    -> LabelAssignment;
}

impl AssignmentPolicy for AssignmentPolicyKind {
    fn resolve(
        &self,
        labels: &LabelAssignment,
        candidates: &[Candidate],
        side: u32,
    ) -> LabelAssignment {
        match *self {
            Self::Permissive => labels.clone(),
            Self::GreedyNearest => resolve_greedy_nearest(labels, candidates, side),
        }
    }
}

fn distance_squared(point: &GridPoint, candidate: &Candidate) -> Option<f64> {
    let (cx, cy) = candidate.polygon().centroid()?;
    let dx = f64::from(point.x) - cx;
    let dy = f64::from(point.y) - cy;
    Some(dx.mul_add(dx, dy * dy))
}

/// Greedy one-to-one matching by centroid distance.
///
/// Labels that reference an unknown position or candidate, or whose
/// candidate has no centroid, are dropped.
fn resolve_greedy_nearest(
    labels: &LabelAssignment,
    candidates: &[Candidate],
    side: u32,
) -> LabelAssignment {
    let points = grid_points(side);
    let mut scored: Vec<(f64, Label)> = labels
        .labels()
        .iter()
        .filter_map(|&l| {
            let point = points.get(l.grid)?;
            let candidate = candidates.get(l.candidate)?;
            distance_squared(point, candidate).map(|d| (d, l))
        })
        .collect();
    // Stable: equal distances keep labeler order.
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut grid_taken = [false; crate::label::GRID_POSITIONS];
    let mut candidate_taken = vec![false; candidates.len()];
    let mut kept = Vec::new();
    for (distance, l) in scored {
        if grid_taken[l.grid] || candidate_taken[l.candidate] {
            tracing::debug!(
                grid = l.grid,
                candidate = l.candidate,
                distance = distance.sqrt(),
                "rejected conflicting label"
            );
            continue;
        }
        grid_taken[l.grid] = true;
        candidate_taken[l.candidate] = true;
        kept.push(l);
    }
    kept.sort_by_key(|l| l.grid);
    LabelAssignment::new(kept)
}
