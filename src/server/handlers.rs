//! HTTP request handlers for the SpaceZoom API.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /images` - List catalogued images
//! - `GET /images/{name}` - Raw source image
//! - `GET /tiles/{name}/{x}/{y}.jpg` - Pre-generated tile
//! - `POST /analyze-image` - Region-of-interest detection
//! - `GET /annotations/{name}` - Annotations of an image
//! - `POST /annotations` - Create an annotation

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::catalog::{Annotation, Catalog, ImageRecord, NewAnnotation};
use crate::detect::{AnalysisService, Region};
use crate::error::{AnalysisError, CatalogError, StoreError, TileError};
use crate::source::{validate_image_id, ImageSource};
use crate::tile::{content_type_for, TileAddress, TileService, DEFAULT_TILE_SIZE};

/// Response header echoing the tile size the client asked for.
pub const TILE_SIZE_HEADER: &str = "x-tile-size";

/// Default Cache-Control max-age for image and tile responses.
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: ImageSource> {
    /// Raw image and tile storage
    pub source: Arc<S>,

    /// Tile resolution
    pub tile_service: Arc<TileService<S>>,

    /// Bounded region detection
    pub analysis: Arc<AnalysisService<S>>,

    /// Image metadata and annotations
    pub catalog: Arc<dyn Catalog>,

    /// Cache-Control max-age in seconds for image and tile bytes
    pub cache_max_age: u32,
}

impl<S: ImageSource> AppState<S> {
    /// Wire the services around one shared source.
    pub fn new(source: Arc<S>, analysis: AnalysisService<S>, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            tile_service: Arc::new(TileService::with_shared_source(Arc::clone(&source))),
            source,
            analysis: Arc::new(analysis),
            catalog,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
        }
    }

    /// Override the Cache-Control max-age.
    pub fn with_cache_max_age(mut self, cache_max_age: u32) -> Self {
        self.cache_max_age = cache_max_age;
        self
    }

    fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age)
    }
}

impl<S: ImageSource> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            tile_service: Arc::clone(&self.tile_service),
            analysis: Arc::clone(&self.analysis),
            catalog: Arc::clone(&self.catalog),
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Path parameters for tile requests.
///
/// Extracted from: `/tiles/{name}/{x}/{filename}`
/// where filename is `{y}` or `{y}.jpg`
#[derive(Debug, Deserialize)]
pub struct TilePathParams {
    /// Source image file name
    pub name: String,

    /// Tile column
    pub x: i64,

    /// Tile row with optional .jpg extension (e.g., "0" or "0.jpg")
    pub filename: String,
}

impl TilePathParams {
    /// Parse the Y coordinate from the filename, stripping any .jpg extension.
    pub fn y(&self) -> Result<i64, std::num::ParseIntError> {
        let y_str = self.filename.strip_suffix(".jpg").unwrap_or(&self.filename);
        y_str.parse()
    }
}

/// Query parameters for tile requests.
#[derive(Debug, Deserialize)]
pub struct TileQueryParams {
    /// Requested tile edge in pixels (defaults to 256)
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

/// Body of `POST /analyze-image`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub image_filename: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "invalid_request")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Response from the image list endpoint.
#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub images: Vec<ImageRecord>,
}

/// Response from the analysis endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Number of regions returned
    pub features_found: usize,

    /// Candidate points in discovery order
    pub regions: Vec<Region>,
}

/// Response from the annotation list endpoint.
#[derive(Debug, Serialize)]
pub struct AnnotationsResponse {
    pub image_filename: String,
    pub annotations: Vec<Annotation>,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Build a JSON error response and log it by severity:
/// - 5xx at ERROR
/// - 404 at DEBUG
/// - other 4xx at WARN
fn error_response(status: StatusCode, error_type: &'static str, message: String) -> Response {
    if status.is_server_error() {
        error!(
            error_type = error_type,
            status = status.as_u16(),
            "Server error: {}",
            message
        );
    } else if status == StatusCode::NOT_FOUND {
        debug!(
            error_type = error_type,
            status = status.as_u16(),
            "Resource not found: {}",
            message
        );
    } else if status.is_client_error() {
        warn!(
            error_type = error_type,
            status = status.as_u16(),
            "Client error: {}",
            message
        );
    }

    let error_response = ErrorResponse::with_status(error_type, message, status);
    (status, Json(error_response)).into_response()
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            StoreError::InvalidIdentifier(_) => (StatusCode::BAD_REQUEST, "invalid_identifier"),
            StoreError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
        };
        error_response(status, error_type, self.to_string())
    }
}

impl IntoResponse for TileError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            // A tile miss is a bare 404 with an empty body
            TileError::TileNotFound { .. } => {
                debug!(status = 404, "Tile not found: {}", self);
                return StatusCode::NOT_FOUND.into_response();
            }
            TileError::InvalidIdentifier(_) => (StatusCode::BAD_REQUEST, "invalid_identifier"),
            TileError::InvalidTileSize { .. } => (StatusCode::BAD_REQUEST, "invalid_tile_size"),
            TileError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
        };
        error_response(status, error_type, self.to_string())
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AnalysisError::ImageNotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AnalysisError::InvalidIdentifier(_) => {
                (StatusCode::BAD_REQUEST, "invalid_identifier")
            }
            AnalysisError::DecodeFailure { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "decode_failure")
            }
            AnalysisError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            AnalysisError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            AnalysisError::Worker { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "worker_error"),
        };
        error_response(status, error_type, self.to_string())
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            CatalogError::ImageNotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            CatalogError::ImageExists { .. } => (StatusCode::CONFLICT, "already_exists"),
            CatalogError::InvalidAnnotation { .. } => {
                (StatusCode::BAD_REQUEST, "invalid_annotation")
            }
            CatalogError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
        };
        error_response(status, error_type, self.to_string())
    }
}

/// Error type returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    Tile(TileError),
    Analysis(AnalysisError),
    Catalog(CatalogError),

    /// Malformed path segment or request body
    InvalidRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Store(e) => e.into_response(),
            ApiError::Tile(e) => e.into_response(),
            ApiError::Analysis(e) => e.into_response(),
            ApiError::Catalog(e) => e.into_response(),
            ApiError::InvalidRequest(message) => {
                error_response(StatusCode::BAD_REQUEST, "invalid_request", message)
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<TileError> for ApiError {
    fn from(err: TileError) -> Self {
        ApiError::Tile(err)
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        ApiError::Analysis(err)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle image list requests.
///
/// # Endpoint
///
/// `GET /images`
///
/// # Response
///
/// `200 OK` with `{"images": [...]}` ordered by filename.
pub async fn images_handler<S: ImageSource>(
    State(state): State<AppState<S>>,
) -> Result<Json<ImagesResponse>, ApiError> {
    let images = state.catalog.list_images().await?;
    Ok(Json(ImagesResponse { images }))
}

/// Handle raw image requests.
///
/// # Endpoint
///
/// `GET /images/{name}`
///
/// # Response
///
/// - `200 OK`: Original file bytes, content type from the extension
/// - `400 Bad Request`: Name is not a plain file name
/// - `404 Not Found`: Image missing from the catalog or from disk
pub async fn image_handler<S: ImageSource>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    validate_image_id(&name)?;

    if state.catalog.get_image(&name).await?.is_none() {
        return Err(StoreError::NotFound(name).into());
    }

    let data = state.source.read_image(&name).await?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&name).to_string()),
            (header::CACHE_CONTROL, state.cache_control()),
        ],
        data,
    )
        .into_response())
}

/// Handle tile requests.
///
/// # Endpoint
///
/// `GET /tiles/{name}/{x}/{y}.jpg`
///
/// # Query Parameters
///
/// - `tile_size`: requested tile edge, 1-4096 (default: 256). Tiles are
///   pre-generated, so this is validated and echoed back, not applied.
///
/// # Response
///
/// - `200 OK`: Tile bytes with `Content-Type: image/jpeg`
/// - `400 Bad Request`: Malformed coordinates, name or tile size
/// - `404 Not Found`: No tile at this address (including out-of-range coordinates), empty body
///
/// # Headers
///
/// - `Cache-Control: public, max-age={cache_max_age}`
/// - `X-Tile-Size: {tile_size}`
pub async fn tile_handler<S: ImageSource>(
    State(state): State<AppState<S>>,
    Path(params): Path<TilePathParams>,
    Query(query): Query<TileQueryParams>,
) -> Result<Response, ApiError> {
    // Parse Y coordinate from filename (handles both "0" and "0.jpg")
    let y = params
        .y()
        .map_err(|_| ApiError::InvalidRequest(format!("Invalid tile row: {}", params.filename)))?;

    let address = TileAddress::with_tile_size(&params.name, params.x, y, query.tile_size);
    let tile = state.tile_service.get_tile(&address).await?;

    Ok((
        [
            (header::CONTENT_TYPE, tile.content_type.to_string()),
            (header::CACHE_CONTROL, state.cache_control()),
            (
                HeaderName::from_static(TILE_SIZE_HEADER),
                tile.tile_size.to_string(),
            ),
        ],
        tile.data,
    )
        .into_response())
}

/// Handle region analysis requests.
///
/// # Endpoint
///
/// `POST /analyze-image` with body `{"image_filename": "m31.jpg"}`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "features_found": 1,
///   "regions": [
///     {"x": 412, "y": 230, "desc": "Possible interesting feature (edge/bright region)"}
///   ]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or file name
/// - `404 Not Found`: Image not found
/// - `422 Unprocessable Entity`: File is not a decodable image
/// - `504 Gateway Timeout`: Detection exceeded its time budget
pub async fn analyze_handler<S: ImageSource>(
    State(state): State<AppState<S>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload?;
    let detection = state.analysis.analyze(&request.image_filename).await?;

    Ok(Json(AnalyzeResponse {
        features_found: detection.count,
        regions: detection.regions,
    }))
}

/// Handle annotation list requests.
///
/// # Endpoint
///
/// `GET /annotations/{name}`
///
/// # Errors
///
/// - `400 Bad Request`: Name is not a plain file name
/// - `404 Not Found`: Image not in the catalog
pub async fn annotations_handler<S: ImageSource>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<AnnotationsResponse>, ApiError> {
    validate_image_id(&name)?;
    let annotations = state.catalog.get_annotations(&name).await?;

    Ok(Json(AnnotationsResponse {
        image_filename: name,
        annotations,
    }))
}

/// Handle annotation creation.
///
/// # Endpoint
///
/// `POST /annotations` with body
/// `{"image_filename": "m31.jpg", "user_id": 1, "x": 0.4, "y": 0.6, "label": "core"}`
///
/// # Response
///
/// `201 Created` with the stored annotation.
pub async fn create_annotation_handler<S: ImageSource>(
    State(state): State<AppState<S>>,
    payload: Result<Json<NewAnnotation>, JsonRejection>,
) -> Result<(StatusCode, Json<Annotation>), ApiError> {
    let Json(annotation) = payload?;
    validate_image_id(&annotation.image_filename)?;

    let stored = state.catalog.add_annotation(annotation).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

// =============================================================================
// Tests
// =============================================================================
