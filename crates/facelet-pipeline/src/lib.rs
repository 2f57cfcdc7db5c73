//! facelet-pipeline: Locate the nine stickers on one cube face (sans-IO).
//!
//! Turns a photograph of one face of a 3×3×3 puzzle into a square crop
//! and a mapping from detected sticker boundaries to grid positions:
//! crop planning -> grayscale -> blur -> edge detection -> contour
//! tracing -> sticker filter -> ranking -> grid labeling -> optional
//! conflict resolution.
//!
//! Sticker colors are not classified here. This crate has **no I/O
//! dependencies**: it operates on in-memory images and byte slices and
//! returns structured data.

pub mod assign;
pub mod blur;
pub mod contour;
pub mod edge;
pub mod filter;
pub mod geometry;
pub mod grayscale;
pub mod label;
pub mod select;
pub mod types;

pub use assign::{AssignmentPolicy, AssignmentPolicyKind};
pub use contour::{ContourTracer, ContourTracerKind};
pub use geometry::CropPlan;
pub use label::{GridPoint, Label, LabelAssignment};
pub use types::{
    Candidate, Detection, DetectionSummary, Dimensions, PipelineConfig, PipelineError, Point,
    Polygon, RgbImage,
};

/// Candidates and labels found among a crop's boundary polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    /// Selected candidates, largest first.
    pub candidates: Vec<Candidate>,
    /// Raw labels from the grid labeler.
    pub labels: LabelAssignment,
    /// Labels after the assignment policy.
    pub resolved: LabelAssignment,
    /// Number of polygons that passed the sticker filter.
    pub accepted: usize,
}

/// Run filter, ranking, labeling and resolution on polygons that were
/// traced from a crop laid out by `plan`.
///
/// This is the part of the pipeline that does not touch pixels. Callers
/// with their own edge detector or contour tracer can feed its output
/// here directly, as long as the polygons are in crop-local pixels.
#[must_use = "returns the located stickers"]
pub fn locate(polygons: &[Polygon], plan: &CropPlan, policy: AssignmentPolicyKind) -> Located {
    let accepted = filter::accept(polygons, plan.inner_scale);
    let accepted_count = accepted.len();
    let candidates = select::rank(accepted);
    let labels = label::label(plan.outer_scale, &candidates);
    let resolved = policy.resolve(&labels, &candidates, plan.outer_scale);

    tracing::debug!(
        polygons = polygons.len(),
        accepted = accepted_count,
        selected = candidates.len(),
        raw_labels = labels.len(),
        resolved_labels = resolved.len(),
        "located stickers"
    );
    if !labels.ambiguous_positions().is_empty() {
        tracing::debug!(positions = ?labels.ambiguous_positions(), "ambiguous grid positions");
    }

    Located {
        candidates,
        labels,
        resolved,
        accepted: accepted_count,
    }
}

/// Run the full detection pipeline on an RGB image.
///
/// # Pipeline steps
///
/// 1. Plan a square crop window from the image size
/// 2. Crop
/// 3. Grayscale, Gaussian blur and Canny edge detection
/// 4. Contour tracing (pluggable strategy)
/// 5. Sticker filter (area band + closure)
/// 6. Rank by area, keep the nine largest
/// 7. Grid labeling
/// 8. Label resolution (pluggable strategy)
///
/// Finding fewer than nine stickers is not an error; the result simply
/// holds fewer candidates and labels.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// [`PipelineConfig::validate`].
/// Returns [`PipelineError::ImageTooSmall`] if the image's shorter side
/// is below [`geometry::MIN_SHORT_SIDE`].
pub fn process(image: &RgbImage, config: &PipelineConfig) -> Result<Detection, PipelineError> {
    config.validate()?;

    // 1-2. Crop.
    let plan = geometry::plan(Dimensions::of(image))?;
    let cropped = geometry::crop(image, &plan);
    tracing::debug!(?plan, "planned crop");

    // 3. Edge map.
    let edges = edge::detect_edges(&cropped, config);

    // 4. Contour tracing.
    let polygons = config.contour_tracer.trace(&edges);

    // 5-8. Filter, rank, label, resolve.
    let located = locate(&polygons, &plan, config.assignment);

    let summary = DetectionSummary {
        contours_found: polygons.len(),
        candidates_accepted: located.accepted,
        candidates_selected: located.candidates.len(),
        raw_labels: located.labels.len(),
        resolved_labels: located.resolved.len(),
    };

    Ok(Detection {
        plan,
        cropped,
        candidates: located.candidates,
        labels: located.labels,
        resolved: located.resolved,
        summary,
    })
}

/// Decode an encoded image (PNG, JPEG, BMP, WebP) and run [`process`].
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
/// Otherwise returns any error from [`process`].
pub fn process_bytes(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<Detection, PipelineError> {
    let image = grayscale::decode_rgb(image_bytes)?;
    process(&image, config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
        buf
    }

    fn square(cx: i32, cy: i32, half: i32) -> Polygon {
        Polygon::new(vec![
            Point::new(cx - half, cy - half),
            Point::new(cx + half, cy - half),
            Point::new(cx + half, cy + half),
            Point::new(cx - half, cy + half),
            Point::new(cx - half, cy - half),
        ])
    }

    /// Plan for an 800x600 image: 450px crop, 300px inner scale.
    fn plan_800x600() -> CropPlan {
        geometry::plan(Dimensions {
            width: 800,
            height: 600,
        })
        .unwrap()
    }

    #[test]
    fn process_bytes_empty_input() {
        let result = process_bytes(&[], &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn process_bytes_corrupt_input() {
        let result = process_bytes(&[0xFF, 0x00], &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn process_rejects_tiny_image() {
        let img = RgbImage::new(6, 40);
        let result = process(&img, &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::ImageTooSmall { .. })));
    }

    #[test]
    fn process_rejects_invalid_config() {
        let config = PipelineConfig {
            canny_low: 300.0,
            ..PipelineConfig::default()
        };
        let result = process(&RgbImage::new(64, 64), &config);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn uniform_image_finds_nothing() {
        let img = RgbImage::from_pixel(160, 120, image::Rgb([90, 90, 90]));
        let detection = process(&img, &PipelineConfig::default()).unwrap();
        assert_eq!(detection.cropped.dimensions(), (90, 90));
        assert!(detection.candidates.is_empty());
        assert!(detection.labels.is_empty());
        assert_eq!(detection.summary.contours_found, 0);
    }

    #[test]
    fn process_bytes_matches_process() {
        let img = RgbImage::from_fn(80, 64, |x, y| {
            if (30..50).contains(&x) && (20..44).contains(&y) {
                image::Rgb([250, 250, 250])
            } else {
                image::Rgb([10, 10, 10])
            }
        });
        let config = PipelineConfig::default();
        let direct = process(&img, &config).unwrap();
        let decoded = process_bytes(&encode_png(&img), &config).unwrap();
        assert_eq!(direct, decoded);
    }

    #[test]
    fn locate_nominal_polygons() {
        let plan = plan_800x600();
        let step = i32::try_from(plan.outer_scale / 4).unwrap();
        // Discovery order is bottom-right first.
        let polygons: Vec<Polygon> = (0..9)
            .rev()
            .map(|g| square(step * (g % 3 + 1), step * (g / 3 + 1), 45))
            .collect();

        let located = locate(&polygons, &plan, AssignmentPolicyKind::Permissive);
        assert_eq!(located.accepted, 9);
        assert_eq!(located.candidates.len(), 9);
        assert!(located.labels.is_complete());
        // All areas tie, so candidate k is discovery index k: grid 8 - k.
        for g in 0..9 {
            assert_eq!(located.labels.candidates_at(g).collect::<Vec<_>>(), vec![8 - g]);
        }
        assert_eq!(located.resolved, located.labels);
    }

    #[test]
    fn locate_ignores_noise_and_keeps_raw_conflicts() {
        let plan = plan_800x600();
        let polygons = vec![
            square(112, 112, 45),
            square(5, 5, 3),      // too small
            square(224, 224, 45), // position 4
            square(230, 224, 45), // overlaps position 4
        ];
        let located = locate(&polygons, &plan, AssignmentPolicyKind::Permissive);
        assert_eq!(located.accepted, 3);
        assert_eq!(located.labels.ambiguous_positions(), vec![4]);

        let greedy = locate(&polygons, &plan, AssignmentPolicyKind::GreedyNearest);
        assert_eq!(greedy.labels, located.labels);
        assert!(greedy.resolved.ambiguous_positions().is_empty());
        assert_eq!(greedy.resolved.len(), 2);
    }
}
