//! Configuration management for SpaceZoom.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `SPACEZOOM_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use spacezoom::config::{Cli, Command};
//!
//! match Cli::parse().into_command() {
//!     Command::Serve(config) => println!("Listening on {}", config.bind_address()),
//!     Command::Seed(config) => println!("Seeding from {}", config.image_dir.display()),
//!     Command::Analyze(config) => println!("Analysing {}", config.file.display()),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `SPACEZOOM_HOST` - Server bind address (default: 0.0.0.0)
//! - `SPACEZOOM_PORT` - Server port (default: 8000)
//! - `SPACEZOOM_IMAGE_DIR` - Directory of full images (default: images)
//! - `SPACEZOOM_TILE_DIR` - Directory of pre-cut tiles (default: tiles)
//! - `SPACEZOOM_DATABASE` - SQLite catalog file (default: spacezoom.db)
//! - `SPACEZOOM_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)
//! - `SPACEZOOM_CORS_ORIGINS` - Comma-separated allowed origins (default: any)
//! - `SPACEZOOM_ANALYSIS_WORKERS` - Concurrent detection jobs (default: 4)
//! - `SPACEZOOM_ANALYSIS_TIMEOUT_SECS` - Detection time budget (default: 30)
//! - `SPACEZOOM_BRIGHT_THRESHOLD`, `SPACEZOOM_EDGE_LOW`, `SPACEZOOM_EDGE_HIGH`,
//!   `SPACEZOOM_BRIGHT_WEIGHT`, `SPACEZOOM_EDGE_WEIGHT`, `SPACEZOOM_MAX_REGIONS`,
//!   `SPACEZOOM_MAX_DECODE_MB` - Detector tuning

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::detect::{
    DetectorConfig, DEFAULT_ANALYSIS_TIMEOUT, DEFAULT_ANALYSIS_WORKERS, DEFAULT_BRIGHT_THRESHOLD,
    DEFAULT_EDGE_HIGH, DEFAULT_EDGE_LOW, DEFAULT_MASK_WEIGHT, DEFAULT_MAX_DECODE_BYTES,
    DEFAULT_MAX_REGIONS,
};
use crate::server::DEFAULT_CACHE_MAX_AGE;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default directory of full-resolution images.
pub const DEFAULT_IMAGE_DIR: &str = "images";

/// Default directory of pre-cut tiles.
pub const DEFAULT_TILE_DIR: &str = "tiles";

/// Default catalog database file.
pub const DEFAULT_DATABASE: &str = "spacezoom.db";

const BYTES_PER_MB: u64 = 1024 * 1024;

// =============================================================================
// CLI
// =============================================================================

/// SpaceZoom - deep-zoom tiles, region detection and annotations for space imagery.
#[derive(Parser, Debug, Clone)]
#[command(name = "spacezoom")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Consume the parsed CLI and return the selected command.
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeConfig),

    /// Register images found on disk in the catalog
    Seed(SeedConfig),

    /// Run region detection on a single local file and print the result as JSON
    Analyze(AnalyzeConfig),
}

// =============================================================================
// Detector Arguments
// =============================================================================

/// Detector tuning flags shared by `serve` and `analyze`.
#[derive(Args, Debug, Clone)]
pub struct DetectorArgs {
    /// Luminance above which a pixel counts as bright (0-255).
    #[arg(long, default_value_t = DEFAULT_BRIGHT_THRESHOLD, env = "SPACEZOOM_BRIGHT_THRESHOLD")]
    pub bright_threshold: u8,

    /// Canny low threshold.
    #[arg(long, default_value_t = DEFAULT_EDGE_LOW, env = "SPACEZOOM_EDGE_LOW")]
    pub edge_low: f32,

    /// Canny high threshold.
    #[arg(long, default_value_t = DEFAULT_EDGE_HIGH, env = "SPACEZOOM_EDGE_HIGH")]
    pub edge_high: f32,

    /// Weight of the bright mask (0-1).
    #[arg(long, default_value_t = DEFAULT_MASK_WEIGHT, env = "SPACEZOOM_BRIGHT_WEIGHT")]
    pub bright_weight: f32,

    /// Weight of the edge mask (0-1).
    #[arg(long, default_value_t = DEFAULT_MASK_WEIGHT, env = "SPACEZOOM_EDGE_WEIGHT")]
    pub edge_weight: f32,

    /// Maximum regions returned per analysis.
    #[arg(long, default_value_t = DEFAULT_MAX_REGIONS, env = "SPACEZOOM_MAX_REGIONS")]
    pub max_regions: usize,

    /// Decoder allocation limit in MiB.
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_DECODE_BYTES / BYTES_PER_MB,
        env = "SPACEZOOM_MAX_DECODE_MB"
    )]
    pub max_decode_mb: u64,
}

impl Default for DetectorArgs {
    fn default() -> Self {
        Self {
            bright_threshold: DEFAULT_BRIGHT_THRESHOLD,
            edge_low: DEFAULT_EDGE_LOW,
            edge_high: DEFAULT_EDGE_HIGH,
            bright_weight: DEFAULT_MASK_WEIGHT,
            edge_weight: DEFAULT_MASK_WEIGHT,
            max_regions: DEFAULT_MAX_REGIONS,
            max_decode_mb: DEFAULT_MAX_DECODE_BYTES / BYTES_PER_MB,
        }
    }
}

impl DetectorArgs {
    /// Build the detector configuration these flags describe.
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            bright_threshold: self.bright_threshold,
            edge_low: self.edge_low,
            edge_high: self.edge_high,
            bright_weight: self.bright_weight,
            edge_weight: self.edge_weight,
            max_regions: self.max_regions,
            max_decode_bytes: self.max_decode_mb.saturating_mul(BYTES_PER_MB),
        }
    }

    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.detector_config().validate()
    }
}

// =============================================================================
// Serve
// =============================================================================

/// Options for `spacezoom serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "SPACEZOOM_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "SPACEZOOM_PORT")]
    pub port: u16,

    // =========================================================================
    // Storage Configuration
    // =========================================================================
    /// Directory containing full-resolution images.
    #[arg(long, default_value = DEFAULT_IMAGE_DIR, env = "SPACEZOOM_IMAGE_DIR")]
    pub image_dir: PathBuf,

    /// Directory containing pre-cut tiles (`<stem>/<stem>_tile_<x>_<y>.jpg`).
    #[arg(long, default_value = DEFAULT_TILE_DIR, env = "SPACEZOOM_TILE_DIR")]
    pub tile_dir: PathBuf,

    /// SQLite catalog file.
    #[arg(long, default_value = DEFAULT_DATABASE, env = "SPACEZOOM_DATABASE")]
    pub database: PathBuf,

    // =========================================================================
    // HTTP Configuration
    // =========================================================================
    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "SPACEZOOM_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "SPACEZOOM_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Analysis Configuration
    // =========================================================================
    /// Maximum concurrent detection jobs.
    #[arg(long, default_value_t = DEFAULT_ANALYSIS_WORKERS, env = "SPACEZOOM_ANALYSIS_WORKERS")]
    pub analysis_workers: usize,

    /// Wall-clock budget for one detection, in seconds.
    #[arg(
        long,
        default_value_t = DEFAULT_ANALYSIS_TIMEOUT.as_secs(),
        env = "SPACEZOOM_ANALYSIS_TIMEOUT_SECS"
    )]
    pub analysis_timeout_secs: u64,

    #[command(flatten)]
    pub detector: DetectorArgs,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("host must not be empty".to_string());
        }
        if self.analysis_workers == 0 {
            return Err("analysis_workers must be greater than 0".to_string());
        }
        if self.analysis_timeout_secs == 0 {
            return Err("analysis_timeout_secs must be greater than 0".to_string());
        }
        if !self.image_dir.is_dir() {
            return Err(format!(
                "image directory does not exist: {}. Set --image-dir or SPACEZOOM_IMAGE_DIR",
                self.image_dir.display()
            ));
        }
        if !self.tile_dir.is_dir() {
            return Err(format!(
                "tile directory does not exist: {}. Set --tile-dir or SPACEZOOM_TILE_DIR",
                self.tile_dir.display()
            ));
        }

        self.detector.validate()
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Detection time budget.
    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }
}

// =============================================================================
// Seed
// =============================================================================

/// Options for `spacezoom seed`.
#[derive(Args, Debug, Clone)]
pub struct SeedConfig {
    /// Directory to scan for images.
    #[arg(long, default_value = DEFAULT_IMAGE_DIR, env = "SPACEZOOM_IMAGE_DIR")]
    pub image_dir: PathBuf,

    /// SQLite catalog file.
    #[arg(long, default_value = DEFAULT_DATABASE, env = "SPACEZOOM_DATABASE")]
    pub database: PathBuf,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl SeedConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !self.image_dir.is_dir() {
            return Err(format!(
                "image directory does not exist: {}",
                self.image_dir.display()
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Analyze
// =============================================================================

/// Options for `spacezoom analyze`.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeConfig {
    /// Image file to analyse.
    pub file: PathBuf,

    #[command(flatten)]
    pub detector: DetectorArgs,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl AnalyzeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !self.file.is_file() {
            return Err(format!("not a file: {}", self.file.display()));
        }
        self.detector.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
