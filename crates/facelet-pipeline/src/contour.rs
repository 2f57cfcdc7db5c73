//! Contour tracing: extract region boundaries from a binary edge map.
//!
//! This module defines the [`ContourTracer`] trait for pluggable tracing
//! algorithms and the [`ContourTracerKind`] enum for selecting one at
//! runtime. Callers with their own vision stack can skip both and hand
//! polygons straight to [`crate::locate`].

use image::GrayImage;
use imageproc::contours::BorderType;
use serde::{Deserialize, Serialize};

use crate::types::{Point, Polygon};

/// Selects which contour tracing algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContourTracerKind {
    /// Suzuki-Abe border following via `imageproc::contours::find_contours`,
    /// keeping only outermost borders.
    ///
    /// A sticker's Canny ring yields one outer and one hole border; only
    /// the outer one is kept, and anything nested inside it (print, glare
    /// edges) is dropped with the hole.
    #[default]
    ExternalBorders,
}

/// Trait for contour tracing strategies.
///
/// Input: a binary edge map (white pixels = edges, black = background).
/// Output: one polygon per region boundary, in a deterministic order.
pub trait ContourTracer {
    /// Trace boundaries in the given binary edge map.
    fn trace(&self, edges: &GrayImage) -> Vec<Polygon>;
}

impl ContourTracer for ContourTracerKind {
    fn trace(&self, edges: &GrayImage) -> Vec<Polygon> {
        match *self {
            Self::ExternalBorders => trace_external_borders(edges),
        }
    }
}

/// Outer borders with no enclosing border, in raster discovery order.
///
/// Boundaries with fewer than three points enclose no area and are
/// dropped here.
fn trace_external_borders(edges: &GrayImage) -> Vec<Polygon> {
    let contours: Vec<imageproc::contours::Contour<i32>> =
        imageproc::contours::find_contours(edges);

    contours
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter(|c| c.points.len() >= 3)
        .map(|c| Polygon::new(c.points.into_iter().map(|p| Point::new(p.x, p.y)).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(img: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, image::Luma([255]));
            }
        }
    }

    fn outline(img: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for x in x0..x1 {
            img.put_pixel(x, y0, image::Luma([255]));
            img.put_pixel(x, y1 - 1, image::Luma([255]));
        }
        for y in y0..y1 {
            img.put_pixel(x0, y, image::Luma([255]));
            img.put_pixel(x1 - 1, y, image::Luma([255]));
        }
    }

    #[test]
    fn default_is_external_borders() {
        assert_eq!(
            ContourTracerKind::default(),
            ContourTracerKind::ExternalBorders
        );
    }

    #[test]
    fn empty_image_produces_no_contours() {
        let img = GrayImage::new(10, 10);
        assert!(ContourTracerKind::ExternalBorders.trace(&img).is_empty());
    }

    #[test]
    fn single_pixel_is_dropped() {
        let mut img = GrayImage::new(10, 10);
        img.put_pixel(5, 5, image::Luma([255]));
        assert!(ContourTracerKind::ExternalBorders.trace(&img).is_empty());
    }

    #[test]
    fn filled_rectangle_produces_one_polygon() {
        let mut img = GrayImage::new(20, 20);
        fill(&mut img, 5, 5, 15, 15);
        let result = ContourTracerKind::ExternalBorders.trace(&img);
        assert_eq!(result.len(), 1);
        // Border pixels run from 5 to 14 on both axes.
        assert!((result[0].area() - 81.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ring_keeps_outer_border_only() {
        let mut img = GrayImage::new(30, 30);
        outline(&mut img, 5, 5, 25, 25);
        let result = ContourTracerKind::ExternalBorders.trace(&img);
        assert_eq!(result.len(), 1, "hole border should be dropped");
        assert!((result[0].area() - 361.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nested_region_is_dropped() {
        let mut img = GrayImage::new(40, 40);
        outline(&mut img, 2, 2, 38, 38);
        fill(&mut img, 15, 15, 25, 25);
        let result = ContourTracerKind::ExternalBorders.trace(&img);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn separate_regions_come_back_in_raster_order() {
        let mut img = GrayImage::new(40, 20);
        fill(&mut img, 25, 3, 35, 13);
        fill(&mut img, 3, 5, 13, 15);
        let result = ContourTracerKind::ExternalBorders.trace(&img);
        assert_eq!(result.len(), 2);
        // The right square's top row (y = 3) is scanned first.
        assert_eq!(result[0].first().map(|p| p.y), Some(3));
        assert_eq!(result[1].first().map(|p| p.y), Some(5));
    }
}
