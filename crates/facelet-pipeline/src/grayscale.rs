//! Image decoding and grayscale conversion.
//!
//! Callers holding encoded bytes (PNG, JPEG, BMP, WebP) use [`decode_rgb`]
//! to get the three-channel image the pipeline crops. Edge detection then
//! works on the luminance produced by [`to_grayscale`].

use image::GrayImage;

use crate::types::{PipelineError, RgbImage};

/// Decode raw image bytes into an 8-bit RGB image.
///
/// Alpha, if present, is dropped.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

/// Convert an RGB image to luminance.
///
/// Uses the `image` crate's weighted luminance, so green contributes
/// most and blue least.
#[must_use = "returns the grayscale image"]
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}
