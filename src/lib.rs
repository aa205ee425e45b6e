//! # SpaceZoom
//!
//! A backend for exploring very large space photographs: deep-zoom tiles,
//! heuristic region-of-interest detection and user annotations.
//!
//! ## Features
//!
//! - **Tile delivery**: Serves pre-cut tiles byte-for-byte from a deterministic path scheme
//! - **Region detection**: Bright + edge heuristic reporting a bounded list of candidate points
//! - **Catalog**: SQLite-backed image metadata and point annotations
//! - **Bounded analysis**: Detection runs off the request path with a worker limit and timeout
//!
//! ## Architecture
//!
//! - [`source`] - Image and tile byte storage
//! - [`tile`] - Tile addressing and lookup
//! - [`detect`] - Region detector and analysis service
//! - [`catalog`] - Image metadata and annotations
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use spacezoom::{
//!     create_router, AnalysisService, AppState, LocalImageSource, RegionDetector, RouterConfig,
//!     SqliteCatalog,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = Arc::new(LocalImageSource::new("images", "tiles"));
//!     let analysis = AnalysisService::new(Arc::clone(&source), RegionDetector::default());
//!     let catalog = Arc::new(SqliteCatalog::open("spacezoom.db").await?);
//!
//!     let router = create_router(AppState::new(source, analysis, catalog), RouterConfig::new());
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod detect;
pub mod error;
pub mod server;
pub mod source;
pub mod tile;

// Re-export commonly used types
pub use catalog::{
    seed_catalog, Annotation, Catalog, ImageRecord, NewAnnotation, NewImage, SeedReport,
    SqliteCatalog,
};
pub use config::{AnalyzeConfig, Cli, Command, DetectorArgs, SeedConfig, ServeConfig};
pub use detect::{AnalysisService, Detection, DetectorConfig, Region, RegionDetector};
pub use error::{AnalysisError, CatalogError, SeedError, StoreError, TileError};
pub use server::{
    create_router, AnalyzeResponse, ApiError, AppState, ErrorResponse, HealthResponse,
    RouterConfig,
};
pub use source::{validate_image_id, ImageSource, LocalImageSource};
pub use tile::{tile_relative_path, TileAddress, TileResponse, TileService};
