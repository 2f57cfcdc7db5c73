//! Shared types for the facelet detection pipeline.

use geo::{Area, Centroid};
use serde::{Deserialize, Serialize};

use crate::assign::AssignmentPolicyKind;
use crate::contour::ContourTracerKind;
use crate::geometry::CropPlan;
use crate::label::LabelAssignment;

/// Re-export `GrayImage` so downstream crates can reference the
/// intermediate edge map without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can reference input and
/// cropped images without depending on `image` directly.
pub use image::RgbImage;

/// A 2D integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Column (pixels from left edge).
    pub x: i32,
    /// Row (pixels from top edge).
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<Point> for geo::Coord<f64> {
    fn from(p: Point) -> Self {
        Self {
            x: f64::from(p.x),
            y: f64::from(p.y),
        }
    }
}

/// An ordered boundary of a detected region, in crop-local pixels.
///
/// The polygon is treated as closed for area and centroid queries
/// (the last point connects back to the first). Whether the traced
/// boundary actually returns to its start is a separate question
/// answered by [`crate::filter::is_closed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon(Vec<Point>);

impl Polygon {
    /// Create a new polygon from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polygon has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polygon.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polygon and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Enclosed area in square pixels (shoelace formula, unsigned).
    ///
    /// Polygons with fewer than three points enclose nothing.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.to_geo().unsigned_area()
    }

    /// Area-weighted centroid, or `None` for an empty polygon.
    #[must_use]
    pub fn centroid(&self) -> Option<(f64, f64)> {
        self.to_geo().centroid().map(|c| (c.x(), c.y()))
    }

    pub(crate) fn to_geo(&self) -> geo::Polygon<f64> {
        let ring: Vec<geo::Coord<f64>> = self.0.iter().copied().map(Into::into).collect();
        geo::Polygon::new(geo::LineString::new(ring), Vec::new())
    }
}

/// A polygon that passed the sticker filter.
///
/// The area is derived from the polygon when the candidate is built and
/// never changes afterwards. `source_index` is the polygon's position in
/// the contour tracer's output, which is what keeps area ties in a
/// reproducible order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    polygon: Polygon,
    area: f64,
    source_index: usize,
}

impl Candidate {
    /// Build a candidate, computing the enclosed area of `polygon`.
    #[must_use]
    pub fn new(polygon: Polygon, source_index: usize) -> Self {
        let area = polygon.area();
        Self::with_area(polygon, area, source_index)
    }

    /// Build a candidate whose area the caller already computed with
    /// [`Polygon::area`].
    pub(crate) const fn with_area(polygon: Polygon, area: f64, source_index: usize) -> Self {
        Self {
            polygon,
            area,
            source_index,
        }
    }

    /// The candidate's boundary.
    #[must_use]
    pub const fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Enclosed area in square pixels.
    #[must_use]
    pub const fn area(&self) -> f64 {
        self.area
    }

    /// Position of the polygon in the contour tracer's output.
    #[must_use]
    pub const fn source_index(&self) -> usize {
        self.source_index
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of an in-memory image.
    #[must_use]
    pub fn of(image: &RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }
}

/// Configuration for the detection pipeline.
///
/// Only the edge detector and the strategy choices are tunable. The
/// sticker filter's area band and closure tolerance are fixed constants
/// in [`crate::filter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Gaussian blur sigma applied to the grayscale crop before edge
    /// detection.
    pub blur_sigma: f32,

    /// Canny low threshold. Gradient magnitudes between `canny_low` and
    /// `canny_high` are edges only if connected to a strong edge.
    ///
    /// Must be at least [`edge::MIN_THRESHOLD`](crate::edge::MIN_THRESHOLD)
    /// and at most `canny_high`.
    pub canny_low: f32,

    /// Canny high threshold. Gradient magnitudes above this value are
    /// definite edges.
    pub canny_high: f32,

    /// Which contour tracing algorithm turns the edge map into polygons.
    pub contour_tracer: ContourTracerKind,

    /// How the raw grid labels are post-processed.
    pub assignment: AssignmentPolicyKind,
}

impl PipelineConfig {
    /// Default blur sigma. Matches the sigma of a 5×5 Gaussian kernel.
    pub const DEFAULT_BLUR_SIGMA: f32 = 1.1;
    /// Default Canny low threshold.
    pub const DEFAULT_CANNY_LOW: f32 = 50.0;
    /// Default Canny high threshold.
    pub const DEFAULT_CANNY_HIGH: f32 = 150.0;

    /// Check the configuration for values the pipeline cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `blur_sigma` is
    /// negative or not finite, if either Canny threshold is below
    /// [`edge::MIN_THRESHOLD`](crate::edge::MIN_THRESHOLD) or not finite,
    /// or if `canny_low > canny_high`.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.blur_sigma.is_finite() || self.blur_sigma < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "blur_sigma must be finite and non-negative, got {}",
                self.blur_sigma
            )));
        }
        for (name, value) in [("canny_low", self.canny_low), ("canny_high", self.canny_high)] {
            if !value.is_finite() || value < crate::edge::MIN_THRESHOLD {
                return Err(PipelineError::InvalidConfig(format!(
                    "{name} must be at least {}, got {value}",
                    crate::edge::MIN_THRESHOLD
                )));
            }
        }
        if self.canny_low > self.canny_high {
            return Err(PipelineError::InvalidConfig(format!(
                "canny_low ({}) exceeds canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blur_sigma: Self::DEFAULT_BLUR_SIGMA,
            canny_low: Self::DEFAULT_CANNY_LOW,
            canny_high: Self::DEFAULT_CANNY_HIGH,
            contour_tracer: ContourTracerKind::default(),
            assignment: AssignmentPolicyKind::default(),
        }
    }
}

/// Per-stage counts from a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionSummary {
    /// Polygons produced by the contour tracer.
    pub contours_found: usize,
    /// Polygons that passed the sticker filter.
    pub candidates_accepted: usize,
    /// Candidates kept after ranking (at most nine).
    pub candidates_selected: usize,
    /// Raw `(grid, candidate)` pairs from the labeler.
    pub raw_labels: usize,
    /// Pairs left after the assignment policy.
    pub resolved_labels: usize,
}

/// Result of running the full detection pipeline on one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// The crop window chosen for the source image.
    pub plan: CropPlan,
    /// The square crop the detection ran on.
    pub cropped: RgbImage,
    /// Selected candidates, largest first.
    pub candidates: Vec<Candidate>,
    /// Every grid point / candidate containment, unresolved.
    pub labels: LabelAssignment,
    /// Labels after the configured assignment policy.
    pub resolved: LabelAssignment,
    /// Per-stage counts.
    pub summary: DetectionSummary,
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The image is too small to hold a crop window.
    #[error(
        "image {width}x{height} is too small: the shorter side must be at least {min} pixels",
        min = crate::geometry::MIN_SHORT_SIDE
    )]
    ImageTooSmall {
        /// Width of the rejected image.
        width: u32,
        /// Height of the rejected image.
        height: u32,
    },

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
