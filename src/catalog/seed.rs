//! Populate the catalog from images already on disk.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{CatalogError, SeedError};

use super::{Catalog, NewImage};

/// File extensions picked up by [`seed_catalog`] (case-insensitive).
pub const SEEDABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp", "gif"];

/// Outcome of a seeding pass, each list in file name order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    /// Newly registered images
    pub registered: Vec<String>,

    /// Images already in the catalog
    pub skipped: Vec<String>,

    /// Files with a known extension whose header could not be read
    pub unreadable: Vec<String>,
}

/// Whether `path` has one of the [`SEEDABLE_EXTENSIONS`].
pub fn is_seedable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SEEDABLE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Register every image in `image_dir` that the catalog does not know yet.
///
/// Dimensions come from the file header only; titles default to the file
/// stem. Subdirectories are not scanned.
pub async fn seed_catalog(
    catalog: &dyn Catalog,
    image_dir: &Path,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    for (filename, path) in list_candidates(image_dir).await? {
        if catalog.get_image(&filename).await?.is_some() {
            debug!(filename = %filename, "Already catalogued");
            report.skipped.push(filename);
            continue;
        }

        let (width, height) = match read_dimensions(path).await {
            Ok(dims) => dims,
            Err(e) => {
                warn!(filename = %filename, error = %e, "Skipping unreadable image");
                report.unreadable.push(filename);
                continue;
            }
        };

        let title = Path::new(&filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&filename)
            .to_string();

        let image = NewImage {
            filename: filename.clone(),
            title,
            description: String::new(),
            width,
            height,
        };

        match catalog.register_image(image).await {
            Ok(record) => {
                info!(
                    filename = %record.filename,
                    width = record.width,
                    height = record.height,
                    "Registered image"
                );
                report.registered.push(filename);
            }
            Err(CatalogError::ImageExists { .. }) => report.skipped.push(filename),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(report)
}

async fn list_candidates(image_dir: &Path) -> Result<Vec<(String, PathBuf)>, SeedError> {
    let mut entries = tokio::fs::read_dir(image_dir)
        .await
        .map_err(|e| SeedError::Io(e.kind().to_string()))?;

    let mut candidates = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SeedError::Io(e.kind().to_string()))?
    {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if !is_file || !is_seedable(&path) {
            continue;
        }
        // Non UTF-8 names cannot be addressed over HTTP
        if let Some(name) = entry.file_name().to_str() {
            candidates.push((name.to_string(), path));
        }
    }

    candidates.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(candidates)
}

async fn read_dimensions(path: PathBuf) -> Result<(u32, u32), String> {
    tokio::task::spawn_blocking(move || image::image_dimensions(&path))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}
