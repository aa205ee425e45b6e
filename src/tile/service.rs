//! Tile Service for resolving pre-generated tiles.
//!
//! The TileService is the entry point for tile requests. It:
//! - Validates the tile address
//! - Derives the canonical tile path
//! - Reads the tile bytes through the image source
//! - Infers the content type from the path
//!
//! Tiles are returned byte-for-byte; there is no re-encoding and no cache.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::error::TileError;
use crate::source::ImageSource;

use super::address::{content_type_for, TileAddress};

// =============================================================================
// Tile Response
// =============================================================================

/// Response from the tile service.
#[derive(Debug, Clone)]
pub struct TileResponse {
    /// Raw tile file contents
    pub data: Bytes,

    /// Content type inferred from the tile extension
    pub content_type: &'static str,

    /// Tile size the caller asked for
    pub tile_size: u32,
}

// =============================================================================
// Tile Service
// =============================================================================

/// Service for locating and reading tiles.
///
/// # Example
///
/// ```ignore
/// use spacezoom::source::LocalImageSource;
/// use spacezoom::tile::{TileAddress, TileService};
///
/// let service = TileService::new(LocalImageSource::new("images", "tiles"));
/// let tile = service.get_tile(&TileAddress::new("m31.jpg", 0, 0)).await?;
/// println!("{} bytes of {}", tile.data.len(), tile.content_type);
/// ```
pub struct TileService<S: ImageSource> {
    source: Arc<S>,
}

impl<S: ImageSource> TileService<S> {
    /// Create a new tile service that owns its source.
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Create a new tile service sharing a source with other services.
    pub fn with_shared_source(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Resolve and read a tile.
    ///
    /// # Errors
    ///
    /// - [`TileError::InvalidIdentifier`] / [`TileError::InvalidTileSize`] for a bad address
    /// - [`TileError::TileNotFound`] when nothing exists at the derived path,
    ///   including for out-of-range coordinates
    /// - [`TileError::Io`] for other storage failures
    pub async fn get_tile(&self, address: &TileAddress) -> Result<TileResponse, TileError> {
        address.validate()?;

        let path = address.relative_path();
        debug!(
            image_id = %address.image_id,
            x = address.x,
            y = address.y,
            tile_size = address.tile_size,
            path = %path,
            "Resolving tile"
        );

        let data = self
            .source
            .read_tile(&path)
            .await
            .map_err(|e| TileError::from_store(e, &address.image_id, address.x, address.y))?;

        Ok(TileResponse {
            data,
            content_type: content_type_for(&path),
            tile_size: address.tile_size,
        })
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }
}

// =============================================================================
// Tests
// =============================================================================
