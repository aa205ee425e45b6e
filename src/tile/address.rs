//! Tile addressing.
//!
//! Tiles are pre-generated offline and located purely by naming convention:
//!
//! ```text
//! {tile_root}/{stem}/{stem}_tile_{x}_{y}.jpg
//! ```
//!
//! where `stem` is the image identifier with its final extension removed.
//! Nothing here touches the filesystem.

use std::path::Path;

use image::ImageFormat;

use crate::error::TileError;
use crate::source::validate_image_id;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Smallest accepted tile size.
pub const MIN_TILE_SIZE: u32 = 1;

/// Largest accepted tile size.
pub const MAX_TILE_SIZE: u32 = 4096;

/// Extension of every pre-generated tile.
pub const TILE_EXTENSION: &str = "jpg";

// =============================================================================
// Tile Address
// =============================================================================

/// Identifies one tile of a source image.
///
/// `tile_size` is carried for logging and response headers only; the naming
/// scheme does not encode it, so every size resolves to the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileAddress {
    /// Source image identifier (e.g. `"m31.jpg"`)
    pub image_id: String,

    /// Tile column (0-indexed from left)
    pub x: i64,

    /// Tile row (0-indexed from top)
    pub y: i64,

    /// Requested tile edge length in pixels
    pub tile_size: u32,
}

impl TileAddress {
    /// Create an address with the default tile size.
    pub fn new(image_id: impl Into<String>, x: i64, y: i64) -> Self {
        Self::with_tile_size(image_id, x, y, DEFAULT_TILE_SIZE)
    }

    /// Create an address with an explicit tile size.
    pub fn with_tile_size(image_id: impl Into<String>, x: i64, y: i64, tile_size: u32) -> Self {
        Self {
            image_id: image_id.into(),
            x,
            y,
            tile_size,
        }
    }

    /// Validate the identifier and tile size.
    pub fn validate(&self) -> Result<(), TileError> {
        validate_image_id(&self.image_id)
            .map_err(|_| TileError::InvalidIdentifier(self.image_id.clone()))?;

        if !(MIN_TILE_SIZE..=MAX_TILE_SIZE).contains(&self.tile_size) {
            return Err(TileError::InvalidTileSize {
                tile_size: self.tile_size,
                min: MIN_TILE_SIZE,
                max: MAX_TILE_SIZE,
            });
        }
        Ok(())
    }

    /// Image identifier without its extension.
    pub fn stem(&self) -> &str {
        image_stem(&self.image_id)
    }

    /// Path of this tile relative to the tile root.
    pub fn relative_path(&self) -> String {
        tile_relative_path(&self.image_id, self.x, self.y)
    }
}

// =============================================================================
// Pure Helpers
// =============================================================================

/// Strip the final extension from an image identifier.
///
/// `"m31.jpg"` → `"m31"`, `"archive.tar.gz"` → `"archive.tar"`, `"noext"` → `"noext"`.
pub fn image_stem(image_id: &str) -> &str {
    match image_id.rfind('.') {
        Some(idx) if idx > 0 => &image_id[..idx],
        _ => image_id,
    }
}

/// Canonical tile path relative to the tile root.
pub fn tile_relative_path(image_id: &str, x: i64, y: i64) -> String {
    let stem = image_stem(image_id);
    format!("{stem}/{stem}_tile_{x}_{y}.{TILE_EXTENSION}")
}

/// Infer a content type from a file extension.
///
/// Falls back to `application/octet-stream` for unknown extensions.
pub fn content_type_for(path: &str) -> &'static str {
    ImageFormat::from_path(Path::new(path))
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

// =============================================================================
// Tests
// =============================================================================
