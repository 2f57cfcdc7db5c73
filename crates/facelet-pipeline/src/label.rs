//! Grid labeling: match candidates to the nine facelet positions.
//!
//! Positions are numbered row-major:
//!
//! ```text
//! [0][1][2]
//! [3][4][5]
//! [6][7][8]
//! ```
//!
//! Each position has a fixed sample point at quarter steps of the crop.
//! A candidate gets a position's label when the sample point lies
//! strictly inside its boundary. Nothing here enforces a one-to-one
//! match: overlapping or malformed boundaries can give a position several
//! candidates, and a missed sticker leaves a position empty. See
//! [`crate::assign`] for policies that resolve such conflicts.

use geo::Contains;
use serde::{Deserialize, Serialize};

use crate::types::Candidate;

/// Number of facelet positions on one face.
pub const GRID_POSITIONS: usize = 9;

/// Positions per row (and per column).
const GRID_WIDTH: usize = 3;

/// Quarter-step multipliers for the three rows and columns.
const STEP_MULTIPLIERS: [u32; GRID_WIDTH] = [1, 2, 3];

/// A facelet position's sample coordinate inside the crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Row-major position index, `0..9`.
    pub index: usize,
    /// Column in crop pixels.
    pub x: u32,
    /// Row in crop pixels.
    pub y: u32,
}

/// The nine sample points for a crop with edge length `side`.
///
/// `point(r, c) = (side/4 * (c+1), side/4 * (r+1))`, with the division
/// done first in integers.
#[must_use]
pub fn grid_points(side: u32) -> [GridPoint; GRID_POSITIONS] {
    let step = side / 4;
    std::array::from_fn(|index| {
        let (row, col) = (index / GRID_WIDTH, index % GRID_WIDTH);
        GridPoint {
            index,
            x: step * STEP_MULTIPLIERS[col],
            y: step * STEP_MULTIPLIERS[row],
        }
    })
}

/// One grid position matched to one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    /// Grid position, `0..9`.
    pub grid: usize,
    /// Index into the candidate list the labels were computed from.
    pub candidate: usize,
}

/// The `(grid, candidate)` pairs found for one face, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelAssignment(Vec<Label>);

impl LabelAssignment {
    /// Wrap a list of labels.
    #[must_use]
    pub const fn new(labels: Vec<Label>) -> Self {
        Self(labels)
    }

    /// All labels in discovery order.
    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.0
    }

    /// Number of labels.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no position was matched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Candidates matched to grid position `grid`.
    pub fn candidates_at(&self, grid: usize) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .filter(move |l| l.grid == grid)
            .map(|l| l.candidate)
    }

    /// Grid positions with no candidate.
    #[must_use]
    pub fn missing_positions(&self) -> Vec<usize> {
        (0..GRID_POSITIONS)
            .filter(|&g| self.candidates_at(g).next().is_none())
            .collect()
    }

    /// Grid positions with more than one candidate.
    #[must_use]
    pub fn ambiguous_positions(&self) -> Vec<usize> {
        (0..GRID_POSITIONS)
            .filter(|&g| self.candidates_at(g).nth(1).is_some())
            .collect()
    }

    /// Whether every position has exactly one candidate and no candidate
    /// is used twice.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let mut grids = [false; GRID_POSITIONS];
        let mut candidates = std::collections::HashSet::new();
        for l in &self.0 {
            let Some(seen) = grids.get_mut(l.grid) else {
                return false;
            };
            if *seen || !candidates.insert(l.candidate) {
                return false;
            }
            *seen = true;
        }
        grids.iter().all(|&g| g)
    }

    /// The candidate for each position when the assignment is one-to-one
    /// per position, `None` where a position is empty or ambiguous.
    #[must_use]
    pub fn by_position(&self) -> [Option<usize>; GRID_POSITIONS] {
        std::array::from_fn(|g| {
            let mut it = self.candidates_at(g);
            match (it.next(), it.next()) {
                (Some(k), None) => Some(k),
                _ => None,
            }
        })
    }
}

/// Test every grid point against every candidate.
///
/// Emits `(g, k)` for each grid point `g` (outer loop) and candidate `k`
/// (inner loop) where the point is strictly inside candidate `k`'s
/// boundary. No deduplication or conflict resolution is applied.
#[must_use = "returns the raw label assignment"]
pub fn label(side: u32, candidates: &[Candidate]) -> LabelAssignment {
    let shapes: Vec<geo::Polygon<f64>> = candidates.iter().map(|c| c.polygon().to_geo()).collect();
    let mut labels = Vec::new();
    for point in grid_points(side) {
        let sample = geo::Point::new(f64::from(point.x), f64::from(point.y));
        for (candidate, shape) in shapes.iter().enumerate() {
            if shape.contains(&sample) {
                labels.push(Label {
                    grid: point.index,
                    candidate,
                });
            }
        }
    }
    LabelAssignment::new(labels)
}

#[cfg(test)]
#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use crate::types::{Point, Polygon};

    fn square_around(cx: u32, cy: u32, half: i32) -> Candidate {
        let (cx, cy) = (cx as i32, cy as i32);
        let polygon = Polygon::new(vec![
            Point::new(cx - half, cy - half),
            Point::new(cx + half, cy - half),
            Point::new(cx + half, cy + half),
            Point::new(cx - half, cy + half),
        ]);
        Candidate::new(polygon, 0)
    }

    fn l(grid: usize, candidate: usize) -> Label {
        Label { grid, candidate }
    }

    #[test]
    fn grid_points_for_450() {
        let points = grid_points(450);
        // 450 / 4 = 112.
        assert_eq!((points[0].x, points[0].y), (112, 112));
        assert_eq!((points[2].x, points[2].y), (336, 112));
        assert_eq!((points[4].x, points[4].y), (224, 224));
        assert_eq!((points[6].x, points[6].y), (112, 336));
        assert_eq!((points[8].x, points[8].y), (336, 336));
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.index, i);
        }
    }

    #[test]
    fn nominal_face_is_a_bijection() {
        let side = 450;
        let spacing = side / 4;
        // Shuffle the candidate order so candidate index != grid index.
        let order = [4, 0, 8, 2, 6, 1, 3, 5, 7];
        let points = grid_points(side);
        let candidates: Vec<Candidate> = order
            .iter()
            .map(|&g| square_around(points[g].x, points[g].y, (spacing / 4) as i32 + 5))
            .collect();

        let labels = label(side, &candidates);
        assert_eq!(labels.len(), 9);
        assert!(labels.is_complete());
        assert!(labels.missing_positions().is_empty());
        assert!(labels.ambiguous_positions().is_empty());
        for (k, &g) in order.iter().enumerate() {
            assert_eq!(labels.candidates_at(g).collect::<Vec<_>>(), vec![k]);
        }
    }

    #[test]
    fn labels_are_ordered_grid_major() {
        let points = grid_points(400);
        let candidates = vec![
            square_around(points[8].x, points[8].y, 20),
            square_around(points[0].x, points[0].y, 20),
        ];
        let labels = label(400, &candidates);
        assert_eq!(labels.labels(), &[l(0, 1), l(8, 0)]);
    }

    #[test]
    fn point_on_edge_is_not_inside() {
        // Grid point 0 for side 400 is (100, 100); put it on the left edge.
        let polygon = Polygon::new(vec![
            Point::new(100, 60),
            Point::new(160, 60),
            Point::new(160, 140),
            Point::new(100, 140),
        ]);
        let labels = label(400, &[Candidate::new(polygon, 0)]);
        assert!(labels.is_empty());
    }

    #[test]
    fn interior_point_is_inside_and_outside_point_is_not() {
        // Grid points 0 and 1 for side 400 are (100, 100) and (200, 100).
        let polygon = Polygon::new(vec![
            Point::new(90, 90),
            Point::new(150, 90),
            Point::new(150, 150),
            Point::new(90, 150),
        ]);
        let labels = label(400, &[Candidate::new(polygon, 0)]);
        assert_eq!(labels.labels(), &[l(0, 0)]);
    }

    #[test]
    fn point_on_vertex_is_not_inside() {
        let polygon = Polygon::new(vec![
            Point::new(100, 100),
            Point::new(160, 100),
            Point::new(160, 160),
            Point::new(100, 160),
        ]);
        assert!(label(400, &[Candidate::new(polygon, 0)]).is_empty());
    }

    #[test]
    fn overlapping_candidates_both_label_a_position() {
        let points = grid_points(400);
        let candidates = vec![
            square_around(points[4].x, points[4].y, 30),
            square_around(points[4].x + 5, points[4].y, 30),
        ];
        let labels = label(400, &candidates);
        assert_eq!(labels.labels(), &[l(4, 0), l(4, 1)]);
        assert_eq!(labels.ambiguous_positions(), vec![4]);
        assert!(!labels.is_complete());
        assert_eq!(labels.by_position()[4], None);
    }

    #[test]
    fn one_candidate_can_cover_several_positions() {
        // A single huge boundary swallows every grid point.
        let big = square_around(200, 200, 190);
        let labels = label(400, &[big]);
        assert_eq!(labels.len(), 9);
        assert!(labels.labels().iter().all(|x| x.candidate == 0));
        assert!(!labels.is_complete());
    }

    #[test]
    fn missing_candidates_leave_positions_empty() {
        let points = grid_points(400);
        let candidates = vec![square_around(points[1].x, points[1].y, 20)];
        let labels = label(400, &candidates);
        assert_eq!(labels.missing_positions(), vec![0, 2, 3, 4, 5, 6, 7, 8]);
        let by_position = labels.by_position();
        assert_eq!(by_position[1], Some(0));
        assert_eq!(by_position[0], None);
    }

    #[test]
    fn no_candidates_no_labels() {
        assert!(label(400, &[]).is_empty());
    }

    #[test]
    fn out_of_range_grid_is_not_complete() {
        let labels = LabelAssignment::new((0..9).map(|g| l(g + 1, g)).collect());
        assert!(!labels.is_complete());
    }
}
