use std::time::Duration;

use thiserror::Error;

/// Errors raised when reading image or tile bytes from storage
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// No file exists for the requested identifier or tile path
    #[error("Not found: {0}")]
    NotFound(String),

    /// Identifier is not a plain file name (empty, contains separators, `..`, ...)
    #[error("Invalid image identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Any other filesystem failure
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors that can occur when resolving a tile
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// No pre-generated tile exists at the derived path.
    ///
    /// Out-of-range coordinates land here too; there is no separate bounds error.
    #[error("Tile not found: {image_id} at ({x}, {y})")]
    TileNotFound { image_id: String, x: i64, y: i64 },

    /// Image identifier failed validation
    #[error("Invalid image identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Requested tile size is outside the accepted range
    #[error("Invalid tile size: {tile_size} (must be {min}-{max})")]
    InvalidTileSize { tile_size: u32, min: u32, max: u32 },

    /// Filesystem failure other than a missing tile
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors that can occur while analysing an image for regions of interest
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// Source image does not exist
    #[error("Image not found: {image_id}")]
    ImageNotFound { image_id: String },

    /// Image identifier failed validation
    #[error("Invalid image identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Bytes are present but are not a decodable raster (empty, corrupt, unsupported)
    #[error("Failed to decode image: {message}")]
    DecodeFailure { message: String },

    /// Decode + detection exceeded the wall-clock budget
    #[error("Analysis exceeded time budget of {}ms", budget.as_millis())]
    Timeout { budget: Duration },

    /// Filesystem failure other than a missing image
    #[error("I/O error: {0}")]
    Io(String),

    /// The blocking worker panicked or was cancelled
    #[error("Analysis worker failed: {message}")]
    Worker { message: String },
}

/// Errors raised by the image catalog
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// No catalog entry for this filename
    #[error("Image not found in catalog: {filename}")]
    ImageNotFound { filename: String },

    /// An entry with the same filename already exists
    #[error("Image already registered: {filename}")]
    ImageExists { filename: String },

    /// Annotation payload rejected before reaching the database
    #[error("Invalid annotation: {message}")]
    InvalidAnnotation { message: String },

    /// Underlying SQLite failure
    #[error("Database error: {0}")]
    Database(String),
}

/// Errors raised while seeding the catalog from an image directory
#[derive(Debug, Clone, Error)]
pub enum SeedError {
    /// The image directory could not be listed
    #[error("Cannot read image directory: {0}")]
    Io(String),

    /// The catalog rejected a registration
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::Database(err.to_string())
    }
}

impl TileError {
    /// Map a storage failure for the tile at `(image_id, x, y)`.
    pub fn from_store(err: StoreError, image_id: &str, x: i64, y: i64) -> Self {
        match err {
            StoreError::NotFound(_) => TileError::TileNotFound {
                image_id: image_id.to_string(),
                x,
                y,
            },
            StoreError::InvalidIdentifier(id) => TileError::InvalidIdentifier(id),
            StoreError::Io(msg) => TileError::Io(msg),
        }
    }
}

impl From<StoreError> for AnalysisError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(image_id) => AnalysisError::ImageNotFound { image_id },
            StoreError::InvalidIdentifier(id) => AnalysisError::InvalidIdentifier(id),
            StoreError::Io(msg) => AnalysisError::Io(msg),
        }
    }
}
