//! Image catalog.
//!
//! Metadata about served images and the point annotations users attach to
//! them. The rest of the crate only talks to the [`Catalog`] trait; the
//! SQLite implementation opens a short-lived session per operation.

mod seed;
mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

pub use seed::{is_seedable, seed_catalog, SeedReport, SEEDABLE_EXTENSIONS};
pub use sqlite::SqliteCatalog;

// =============================================================================
// Records
// =============================================================================

/// A catalogued image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Catalog-assigned id
    pub id: i64,

    /// Unique file name, also the image identifier used by tiles and analysis
    pub filename: String,

    /// Display title
    pub title: String,

    /// Free-text description
    pub description: String,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// When the image was registered
    pub created_at: DateTime<Utc>,
}

/// Payload for registering an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewImage {
    pub filename: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub width: u32,
    pub height: u32,
}

/// A point label placed on an image by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: i64,
    pub user_id: i64,
    pub image_filename: String,
    pub x: f64,
    pub y: f64,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnnotation {
    /// Image the annotation belongs to
    pub image_filename: String,

    /// Author of the annotation
    pub user_id: i64,

    /// Horizontal position (normalized 0..1 or pixels)
    pub x: f64,

    /// Vertical position (normalized 0..1 or pixels)
    pub y: f64,

    /// Optional label text
    #[serde(default)]
    pub label: Option<String>,
}

impl NewAnnotation {
    /// Reject payloads the database should never see.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(CatalogError::InvalidAnnotation {
                message: "coordinates must be finite numbers".to_string(),
            });
        }
        if self.image_filename.is_empty() {
            return Err(CatalogError::InvalidAnnotation {
                message: "image_filename is required".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Catalog Trait
// =============================================================================

/// Read/write access to image metadata and annotations.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// All catalogued images, ordered by filename.
    async fn list_images(&self) -> Result<Vec<ImageRecord>, CatalogError>;

    /// Look up one image by filename.
    async fn get_image(&self, filename: &str) -> Result<Option<ImageRecord>, CatalogError>;

    /// Register a new image. Fails with [`CatalogError::ImageExists`] on duplicates.
    async fn register_image(&self, image: NewImage) -> Result<ImageRecord, CatalogError>;

    /// Annotations of an image in creation order.
    ///
    /// Fails with [`CatalogError::ImageNotFound`] for an unknown image.
    async fn get_annotations(&self, filename: &str) -> Result<Vec<Annotation>, CatalogError>;

    /// Store a new annotation.
    ///
    /// Fails with [`CatalogError::ImageNotFound`] for an unknown image.
    async fn add_annotation(&self, annotation: NewAnnotation) -> Result<Annotation, CatalogError>;
}
