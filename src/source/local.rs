//! Filesystem-backed image source.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::StoreError;

use super::{validate_image_id, ImageSource};

/// Image source that reads from two local directories.
///
/// Full images live directly under `image_root`; tiles live under
/// `tile_root` in per-image subdirectories.
///
/// # Example
///
/// ```ignore
/// use spacezoom::source::{ImageSource, LocalImageSource};
///
/// let source = LocalImageSource::new("images", "tiles");
/// let bytes = source.read_image("m31.jpg").await?;
/// ```
#[derive(Debug, Clone)]
pub struct LocalImageSource {
    image_root: PathBuf,
    tile_root: PathBuf,
}

impl LocalImageSource {
    /// Create a new source rooted at the given directories.
    pub fn new(image_root: impl Into<PathBuf>, tile_root: impl Into<PathBuf>) -> Self {
        Self {
            image_root: image_root.into(),
            tile_root: tile_root.into(),
        }
    }

    /// Directory containing full-resolution images.
    pub fn image_root(&self) -> &Path {
        &self.image_root
    }

    /// Directory containing pre-cut tiles.
    pub fn tile_root(&self) -> &Path {
        &self.tile_root
    }
}

#[async_trait]
impl ImageSource for LocalImageSource {
    async fn read_image(&self, image_id: &str) -> Result<Bytes, StoreError> {
        validate_image_id(image_id)?;
        read_file(&self.image_root.join(image_id), image_id).await
    }

    async fn read_tile(&self, relative_path: &str) -> Result<Bytes, StoreError> {
        read_file(&self.tile_root.join(relative_path), relative_path).await
    }
}

/// Read a whole file, reporting errors against `label` rather than the full path.
async fn read_file(path: &Path, label: &str) -> Result<Bytes, StoreError> {
    // A directory at the expected location is treated as a missing file
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Err(StoreError::NotFound(label.to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(label, "No file at expected location");
            return Err(StoreError::NotFound(label.to_string()));
        }
        Err(e) => return Err(StoreError::Io(e.kind().to_string())),
    }

    match tokio::fs::read(path).await {
        Ok(data) => Ok(Bytes::from(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(label.to_string())),
        Err(e) => Err(StoreError::Io(e.kind().to_string())),
    }
}
