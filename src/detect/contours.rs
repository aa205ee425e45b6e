//! External contour extraction over a binary map.
//!
//! Every non-zero pixel is foreground. Only outermost borders are kept, and a
//! component sitting inside the hole of another one is ignored. Components
//! come back in raster discovery order.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::point::Point;
use serde::Serialize;

// =============================================================================
// Bounding Box
// =============================================================================

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    /// Left edge (inclusive)
    pub x: u32,

    /// Top edge (inclusive)
    pub y: u32,

    /// Width in pixels (at least 1)
    pub width: u32,

    /// Height in pixels (at least 1)
    pub height: u32,
}

impl BoundingBox {
    /// Smallest box containing every point, or `None` for an empty slice.
    pub fn enclosing(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(Self {
            x: min_x.max(0) as u32,
            y: min_y.max(0) as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    /// Box midpoint, rounded down.
    ///
    /// Always lies inside the box, so inside the image.
    pub fn centroid(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

// =============================================================================
// Components
// =============================================================================

/// One external connected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    /// Bounding box of the component
    pub bounds: BoundingBox,
}

/// Extract the outer borders of all top-level foreground components.
///
/// The map is traced inside a one-pixel zero frame, so components touching
/// the image border are reported like any other.
pub fn external_components(map: &GrayImage) -> Vec<Component> {
    if map.width() == 0 || map.height() == 0 {
        return Vec::new();
    }

    find_contours::<i32>(&with_zero_frame(map))
        .into_iter()
        .filter(is_external)
        .filter_map(|contour| {
            let points: Vec<Point<i32>> = contour
                .points
                .iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect();
            let bounds = BoundingBox::enclosing(&points)?;
            Some(Component { bounds })
        })
        .collect()
}

fn with_zero_frame(map: &GrayImage) -> GrayImage {
    let mut framed = GrayImage::new(map.width() + 2, map.height() + 2);
    for (x, y, pixel) in map.enumerate_pixels() {
        framed.put_pixel(x + 1, y + 1, *pixel);
    }
    framed
}

fn is_external(contour: &Contour<i32>) -> bool {
    matches!(contour.border_type, BorderType::Outer) && contour.parent.is_none()
}

// =============================================================================
// Tests
// =============================================================================
