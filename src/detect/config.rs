//! Tunable parameters for the region detector.

use serde::{Deserialize, Serialize};

/// Default luminance threshold for the bright mask (strictly greater than).
pub const DEFAULT_BRIGHT_THRESHOLD: u8 = 200;

/// Default Canny hysteresis low threshold.
pub const DEFAULT_EDGE_LOW: f32 = 100.0;

/// Default Canny hysteresis high threshold.
pub const DEFAULT_EDGE_HIGH: f32 = 200.0;

/// Default weight of each mask in the combined map.
pub const DEFAULT_MASK_WEIGHT: f32 = 0.5;

/// Default number of regions returned per analysis.
pub const DEFAULT_MAX_REGIONS: usize = 10;

/// Default decoder allocation limit (512 MiB).
pub const DEFAULT_MAX_DECODE_BYTES: u64 = 512 * 1024 * 1024;

/// Parameters of the bright + edge interestingness heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Luminance (0-255) above which a pixel is considered bright
    pub bright_threshold: u8,

    /// Canny low threshold (weak edges kept only when linked to strong ones)
    pub edge_low: f32,

    /// Canny high threshold (strong edges)
    pub edge_high: f32,

    /// Weight of the bright mask in the combined map
    pub bright_weight: f32,

    /// Weight of the edge mask in the combined map
    pub edge_weight: f32,

    /// Maximum number of regions emitted, in discovery order
    pub max_regions: usize,

    /// Upper bound on decoder allocations, in bytes
    pub max_decode_bytes: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            bright_threshold: DEFAULT_BRIGHT_THRESHOLD,
            edge_low: DEFAULT_EDGE_LOW,
            edge_high: DEFAULT_EDGE_HIGH,
            bright_weight: DEFAULT_MASK_WEIGHT,
            edge_weight: DEFAULT_MASK_WEIGHT,
            max_regions: DEFAULT_MAX_REGIONS,
            max_decode_bytes: DEFAULT_MAX_DECODE_BYTES,
        }
    }
}

impl DetectorConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !self.edge_low.is_finite() || !self.edge_high.is_finite() {
            return Err("edge thresholds must be finite".to_string());
        }
        if self.edge_low < 0.0 {
            return Err("edge_low must not be negative".to_string());
        }
        if self.edge_low > self.edge_high {
            return Err(format!(
                "edge_low ({}) must not exceed edge_high ({})",
                self.edge_low, self.edge_high
            ));
        }

        for (name, weight) in [
            ("bright_weight", self.bright_weight),
            ("edge_weight", self.edge_weight),
        ] {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(format!("{} must be between 0 and 1", name));
            }
        }

        if self.max_regions == 0 {
            return Err("max_regions must be greater than 0".to_string());
        }
        if self.max_decode_bytes == 0 {
            return Err("max_decode_bytes must be greater than 0".to_string());
        }

        Ok(())
    }
}
