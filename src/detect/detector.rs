//! Region detector.
//!
//! Flags "interesting" regions of a space photograph with a fixed heuristic:
//!
//! ```text
//! bytes ──decode──▶ RGB ──luma──▶ L ──┬── L > threshold ───▶ bright ──┐
//!                                     └── canny(low, high) ─▶ edges ──┴─▶ combined
//!                                                                              │
//!                        regions ◀── first N centroids ◀── external contours ◀─┘
//! ```
//!
//! The detector is synchronous and CPU-bound. Run it through
//! [`super::AnalysisService`] when serving requests.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageReader, Limits};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AnalysisError;

use super::config::DetectorConfig;
use super::contours::{external_components, Component};
use super::masks::{bright_mask, combine_masks, edge_mask};

/// Label attached to every detected region.
pub const REGION_LABEL: &str = "Possible interesting feature (edge/bright region)";

// =============================================================================
// Results
// =============================================================================

/// A candidate point of interest in source-image pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Bounding-box midpoint, column
    pub x: u32,

    /// Bounding-box midpoint, row
    pub y: u32,

    /// Free-text description
    pub desc: String,
}

impl Region {
    fn from_component(component: &Component) -> Self {
        let (x, y) = component.bounds.centroid();
        Self {
            x,
            y,
            desc: REGION_LABEL.to_string(),
        }
    }
}

/// Outcome of one detection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Regions in discovery order, at most `max_regions`
    pub regions: Vec<Region>,

    /// Number of regions returned (not the number discovered)
    pub count: usize,

    /// Width of the decoded image
    pub width: u32,

    /// Height of the decoded image
    pub height: u32,
}

// =============================================================================
// Detector
// =============================================================================

/// Bright + edge region detector.
///
/// Stateless apart from its configuration; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct RegionDetector {
    config: DetectorConfig,
}

impl RegionDetector {
    /// Create a detector with the given configuration.
    ///
    /// Call [`DetectorConfig::validate`] first; Canny requires `edge_low <= edge_high`.
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Decode raw image bytes, guessing the format from content.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::DecodeFailure`] for empty, truncated, unsupported or
    /// oversized input.
    pub fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, AnalysisError> {
        if bytes.is_empty() {
            return Err(AnalysisError::DecodeFailure {
                message: "image is empty".to_string(),
            });
        }

        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| AnalysisError::DecodeFailure {
                message: e.to_string(),
            })?;

        if reader.format().is_none() {
            return Err(AnalysisError::DecodeFailure {
                message: "unrecognised image format".to_string(),
            });
        }

        let mut limits = Limits::default();
        limits.max_alloc = Some(self.config.max_decode_bytes);
        reader.limits(limits);

        reader.decode().map_err(|e| AnalysisError::DecodeFailure {
            message: e.to_string(),
        })
    }

    /// Decode and analyse an encoded image.
    pub fn detect(&self, bytes: &[u8]) -> Result<Detection, AnalysisError> {
        let image = self.decode(bytes)?;
        Ok(self.detect_image(&image))
    }

    /// Analyse an already decoded image.
    pub fn detect_image(&self, image: &DynamicImage) -> Detection {
        let luma = image.to_luma8();
        let (width, height) = luma.dimensions();

        if width == 0 || height == 0 {
            return Detection {
                regions: Vec::new(),
                count: 0,
                width,
                height,
            };
        }

        let combined = self.interest_map(&luma);
        let components = external_components(&combined);
        let discovered = components.len();

        let regions: Vec<Region> = components
            .iter()
            .take(self.config.max_regions)
            .map(Region::from_component)
            .collect();

        debug!(
            width,
            height,
            discovered,
            returned = regions.len(),
            "Region detection complete"
        );

        Detection {
            count: regions.len(),
            regions,
            width,
            height,
        }
    }

    /// Build the combined bright + edge map for a luminance grid.
    pub fn interest_map(&self, luma: &GrayImage) -> GrayImage {
        let bright = bright_mask(luma, self.config.bright_threshold);
        let edges = edge_mask(luma, self.config.edge_low, self.config.edge_high);
        combine_masks(
            &bright,
            &edges,
            self.config.bright_weight,
            self.config.edge_weight,
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
