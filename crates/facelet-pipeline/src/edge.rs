//! Binary edge map for a cropped cube face.
//!
//! Grayscale, blur, then Canny. The result is a binary image where white
//! pixels (255) are edges and black pixels (0) are background; sticker
//! borders show up as thin closed rings.

use image::GrayImage;

use crate::types::{PipelineConfig, RgbImage};

/// Minimum allowed Canny threshold.
///
/// A zero low threshold turns every pixel with any gradient into a
/// potential edge, which floods the crop with contours.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

/// Detect edges using the Canny algorithm.
///
/// Returns a binary image: 255 for edge pixels, 0 for non-edge.
///
/// Both thresholds are clamped to a minimum of [`MIN_THRESHOLD`] and
/// `low_threshold` is clamped to be at most `high_threshold`.
#[must_use = "returns the binary edge map"]
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let high = high_threshold.max(MIN_THRESHOLD);
    let low = low_threshold.max(MIN_THRESHOLD).min(high);
    imageproc::edges::canny(image, low, high)
}

/// Produce the denoised binary edge map of a color image.
#[must_use = "returns the binary edge map"]
pub fn detect_edges(image: &RgbImage, config: &PipelineConfig) -> GrayImage {
    let gray = crate::grayscale::to_grayscale(image);
    let blurred = crate::blur::gaussian_blur(&gray, config.blur_sigma);
    canny(&blurred, config.canny_low, config.canny_high)
}
