//! Region-of-interest detection.
//!
//! A heuristic pass that flags bright blobs (stars, highlights) and strong
//! edges (limbs, craters, terrain breaks) in a space photograph and reports a
//! bounded list of candidate points.
//!
//! # Components
//!
//! - [`DetectorConfig`]: thresholds, weights and limits (all tunable)
//! - [`RegionDetector`]: synchronous decode → masks → contours → regions
//! - [`AnalysisService`]: async front end with a worker bound and a timeout
//! - [`Region`] / [`Detection`]: results
//!
//! # Example
//!
//! ```ignore
//! use spacezoom::detect::{DetectorConfig, RegionDetector};
//!
//! let detector = RegionDetector::new(DetectorConfig::default());
//! let detection = detector.detect(&std::fs::read("images/m31.jpg")?)?;
//! for region in &detection.regions {
//!     println!("({}, {}) {}", region.x, region.y, region.desc);
//! }
//! ```

mod config;
mod contours;
mod detector;
mod masks;
mod service;

pub use config::{
    DetectorConfig, DEFAULT_BRIGHT_THRESHOLD, DEFAULT_EDGE_HIGH, DEFAULT_EDGE_LOW,
    DEFAULT_MASK_WEIGHT, DEFAULT_MAX_DECODE_BYTES, DEFAULT_MAX_REGIONS,
};
pub use contours::{external_components, BoundingBox, Component};
pub use detector::{Detection, Region, RegionDetector, REGION_LABEL};
pub use masks::{bright_mask, combine_masks, edge_mask, MASK_ON};
pub use service::{AnalysisService, DEFAULT_ANALYSIS_TIMEOUT, DEFAULT_ANALYSIS_WORKERS};
