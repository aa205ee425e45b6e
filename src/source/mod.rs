//! Image source layer.
//!
//! This module abstracts where full-resolution images and pre-cut tiles live.
//! The tile service and the analysis service only ever see bytes; they never
//! build filesystem paths themselves.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────────┐
//! │   TileService    │     │   AnalysisService    │
//! └────────┬─────────┘     └──────────┬───────────┘
//!          │ read_tile(rel path)      │ read_image(id)
//!          ▼                          ▼
//! ┌─────────────────────────────────────────────────┐
//! │              ImageSource trait                  │
//! └───────────────────────┬─────────────────────────┘
//!                         ▼
//! ┌─────────────────────────────────────────────────┐
//! │  LocalImageSource (image root + tile root)      │
//! └─────────────────────────────────────────────────┘
//! ```

mod local;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

pub use local::LocalImageSource;

/// Storage backend for images and tiles.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Read the full bytes of the image named `image_id`.
    ///
    /// Implementations must call [`validate_image_id`] before touching storage.
    async fn read_image(&self, image_id: &str) -> Result<Bytes, StoreError>;

    /// Read the bytes of a tile at a path relative to the tile root.
    ///
    /// The path comes from [`crate::tile::TileAddress::relative_path`].
    async fn read_tile(&self, relative_path: &str) -> Result<Bytes, StoreError>;
}

/// Check that an image identifier is a plain file name.
///
/// Rejects empty names, path separators, parent references, NUL bytes and
/// hidden files so that an identifier can never escape the image or tile root.
pub fn validate_image_id(image_id: &str) -> Result<(), StoreError> {
    let invalid = image_id.is_empty()
        || image_id.starts_with('.')
        || image_id.contains(['/', '\\', '\0'])
        || image_id.contains("..");

    if invalid {
        return Err(StoreError::InvalidIdentifier(image_id.to_string()));
    }
    Ok(())
}
