//! Crop planning: pick a square window around the cube face.
//!
//! The window's edge is three quarters of the image's shorter side. Along
//! the shorter axis it sits one eighth of that side in from the edge;
//! along the longer axis it is centered. Both size constants scale with
//! resolution so the same thresholds work for any camera.
//!
//! This is step 1 in the pipeline, before edge detection.

use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, PipelineError, RgbImage};

/// Smallest shorter-side length (pixels) that yields a non-empty window.
pub const MIN_SHORT_SIDE: u32 = 8;

/// Crop window and derived size constants for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropPlan {
    /// Row of the window's top edge.
    pub border_top: u32,
    /// Column of the window's left edge.
    pub border_side: u32,
    /// Expected edge length of the 3×3 sticker grid.
    pub inner_scale: u32,
    /// Edge length of the (square) crop window.
    pub outer_scale: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Compute the crop window for an image of the given size.
///
/// With `short = min(w, h)` and `long = max(w, h)`, the short-axis offset
/// is `short / 8`, the long-axis offset is `long / 2 - 3 * (short / 8)`,
/// `inner_scale = 4 * (short / 8)` and `outer_scale = 6 * (short / 8)`.
/// Square images are treated as landscape.
///
/// # Errors
///
/// Returns [`PipelineError::ImageTooSmall`] if the shorter side is below
/// [`MIN_SHORT_SIDE`].
pub fn plan(dimensions: Dimensions) -> Result<CropPlan, PipelineError> {
    let Dimensions { width, height } = dimensions;
    let short = width.min(height);
    let long = width.max(height);
    if short < MIN_SHORT_SIDE {
        return Err(PipelineError::ImageTooSmall { width, height });
    }

    let short_border = short / 8;
    // long / 2 >= short / 2 >= 4 * (short / 8), so this cannot underflow.
    let long_border = long / 2 - 3 * short_border;

    let long_axis = if width >= height {
        Axis::Horizontal
    } else {
        Axis::Vertical
    };
    let offset_along = |axis: Axis| {
        if axis == long_axis {
            long_border
        } else {
            short_border
        }
    };

    Ok(CropPlan {
        border_top: offset_along(Axis::Vertical),
        border_side: offset_along(Axis::Horizontal),
        inner_scale: 4 * short_border,
        outer_scale: 6 * short_border,
    })
}

/// Copy the plan's window out of `image`.
///
/// The window is clipped to the image bounds, which only matters for a
/// plan that was not produced by [`plan`] for this image.
#[must_use = "returns the cropped image"]
pub fn crop(image: &RgbImage, plan: &CropPlan) -> RgbImage {
    image::imageops::crop_imm(
        image,
        plan.border_side,
        plan.border_top,
        plan.outer_scale,
        plan.outer_scale,
    )
    .to_image()
}
