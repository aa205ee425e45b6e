//! Binary masks over a luminance grid and their weighted combination.

use image::{GrayImage, Luma};
use imageproc::edges::canny;

/// Value written for "on" pixels in every mask.
pub const MASK_ON: u8 = 255;

/// Mark pixels whose luminance is strictly above `threshold`.
pub fn bright_mask(luma: &GrayImage, threshold: u8) -> GrayImage {
    let mut mask = GrayImage::new(luma.width(), luma.height());
    for (src, dst) in luma.pixels().zip(mask.pixels_mut()) {
        if src.0[0] > threshold {
            *dst = Luma([MASK_ON]);
        }
    }
    mask
}

/// Mark strong intensity discontinuities with Canny hysteresis.
///
/// `low` must not exceed `high`.
pub fn edge_mask(luma: &GrayImage, low: f32, high: f32) -> GrayImage {
    canny(luma, low, high)
}

/// Weighted sum of two equally sized masks, rounded and clamped to 0-255.
pub fn combine_masks(
    bright: &GrayImage,
    edges: &GrayImage,
    bright_weight: f32,
    edge_weight: f32,
) -> GrayImage {
    debug_assert_eq!(bright.dimensions(), edges.dimensions());

    let mut combined = GrayImage::new(bright.width(), bright.height());
    for ((b, e), dst) in bright
        .pixels()
        .zip(edges.pixels())
        .zip(combined.pixels_mut())
    {
        let value = b.0[0] as f32 * bright_weight + e.0[0] as f32 * edge_weight;
        *dst = Luma([value.round().clamp(0.0, 255.0) as u8]);
    }
    combined
}
