//! HTTP server layer for SpaceZoom.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │  ┌──────────────────────────┐   ┌────────────────────────────┐  │
//! │  │        handlers          │   │          routes            │  │
//! │  │ (requests, error bodies) │   │ (router config, CORS)      │  │
//! │  └────────────┬─────────────┘   └────────────────────────────┘  │
//! └───────────────┼─────────────────────────────────────────────────┘
//!                 │ AppState
//!      ┌──────────┼──────────────┬────────────────┐
//!      ▼          ▼              ▼                ▼
//!  ImageSource  TileService  AnalysisService   Catalog
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    analyze_handler, annotations_handler, create_annotation_handler, health_handler,
    image_handler, images_handler, tile_handler, AnalyzeRequest, AnalyzeResponse,
    AnnotationsResponse, ApiError, AppState, ErrorResponse, HealthResponse, ImagesResponse,
    TilePathParams, TileQueryParams, DEFAULT_CACHE_MAX_AGE, TILE_SIZE_HEADER,
};
pub use routes::{create_router, RouterConfig};
