//! SQLite-backed catalog.
//!
//! Every operation opens its own connection on the blocking pool and drops
//! it before returning, on success and on error alike. Nothing holds a
//! connection between requests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::CatalogError;

use super::{Annotation, Catalog, ImageRecord, NewAnnotation, NewImage};

/// How long a session waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS images (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        filename        TEXT NOT NULL UNIQUE,
        title           TEXT NOT NULL,
        description     TEXT NOT NULL DEFAULT '',
        width           INTEGER NOT NULL,
        height          INTEGER NOT NULL,
        created_at      TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS annotations (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id         INTEGER NOT NULL,
        image_id        INTEGER NOT NULL,
        x               REAL NOT NULL,
        y               REAL NOT NULL,
        text            TEXT,
        created_at      TEXT NOT NULL,
        FOREIGN KEY(image_id) REFERENCES images(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_annotations_image_id ON annotations(image_id);
";

/// Catalog stored in a single SQLite file.
///
/// # Example
///
/// ```ignore
/// use spacezoom::catalog::{Catalog, SqliteCatalog};
///
/// let catalog = SqliteCatalog::open("spacezoom.db").await?;
/// for image in catalog.list_images().await? {
///     println!("{} ({}x{})", image.filename, image.width, image.height);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    path: PathBuf,
}

impl SqliteCatalog {
    /// Open (or create) the catalog at `path` and ensure the schema exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let catalog = Self { path: path.into() };
        catalog
            .with_session(|conn| {
                conn.execute_batch(SCHEMA)?;
                Ok(())
            })
            .await?;

        info!(path = %catalog.path.display(), "Catalog ready");
        Ok(catalog)
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `op` against a fresh connection on the blocking pool.
    ///
    /// The connection is dropped when `op` returns, whatever the outcome.
    async fn with_session<T, F>(&self, op: F) -> Result<T, CatalogError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, CatalogError> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = open_session(&path)?;
            op(&conn)
        })
        .await
        .map_err(|e| CatalogError::Database(format!("session task failed: {}", e)))?
    }
}

fn open_session(path: &Path) -> Result<Connection, CatalogError> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

fn image_from_row(row: &Row<'_>) -> rusqlite::Result<ImageRecord> {
    Ok(ImageRecord {
        id: row.get(0)?,
        filename: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        width: row.get(4)?,
        height: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn annotation_from_row(row: &Row<'_>) -> rusqlite::Result<Annotation> {
    Ok(Annotation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        image_filename: row.get(2)?,
        x: row.get(3)?,
        y: row.get(4)?,
        label: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn find_image_id(conn: &Connection, filename: &str) -> Result<i64, CatalogError> {
    conn.query_row(
        "SELECT id FROM images WHERE filename = ?1",
        [filename],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| CatalogError::ImageNotFound {
        filename: filename.to_string(),
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn list_images(&self) -> Result<Vec<ImageRecord>, CatalogError> {
        self.with_session(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, filename, title, description, width, height, created_at
                 FROM images ORDER BY filename",
            )?;
            let images = stmt
                .query_map([], image_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(images)
        })
        .await
    }

    async fn get_image(&self, filename: &str) -> Result<Option<ImageRecord>, CatalogError> {
        let filename = filename.to_string();
        self.with_session(move |conn| {
            let image = conn
                .query_row(
                    "SELECT id, filename, title, description, width, height, created_at
                     FROM images WHERE filename = ?1",
                    [&filename],
                    image_from_row,
                )
                .optional()?;
            Ok(image)
        })
        .await
    }

    async fn register_image(&self, image: NewImage) -> Result<ImageRecord, CatalogError> {
        self.with_session(move |conn| {
            let created_at = Utc::now();
            let inserted = conn.execute(
                "INSERT INTO images (filename, title, description, width, height, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    image.filename,
                    image.title,
                    image.description,
                    image.width,
                    image.height,
                    created_at
                ],
            );

            match inserted {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    return Err(CatalogError::ImageExists {
                        filename: image.filename,
                    })
                }
                Err(e) => return Err(e.into()),
            }

            debug!(filename = %image.filename, "Registered image");
            Ok(ImageRecord {
                id: conn.last_insert_rowid(),
                filename: image.filename,
                title: image.title,
                description: image.description,
                width: image.width,
                height: image.height,
                created_at,
            })
        })
        .await
    }

    async fn get_annotations(&self, filename: &str) -> Result<Vec<Annotation>, CatalogError> {
        let filename = filename.to_string();
        self.with_session(move |conn| {
            let image_id = find_image_id(conn, &filename)?;
            let mut stmt = conn.prepare(
                "SELECT a.id, a.user_id, i.filename, a.x, a.y, a.text, a.created_at
                 FROM annotations a JOIN images i ON i.id = a.image_id
                 WHERE a.image_id = ?1
                 ORDER BY a.id",
            )?;
            let annotations = stmt
                .query_map([image_id], annotation_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(annotations)
        })
        .await
    }

    async fn add_annotation(&self, annotation: NewAnnotation) -> Result<Annotation, CatalogError> {
        annotation.validate()?;

        self.with_session(move |conn| {
            let image_id = find_image_id(conn, &annotation.image_filename)?;
            let created_at = Utc::now();
            conn.execute(
                "INSERT INTO annotations (user_id, image_id, x, y, text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    annotation.user_id,
                    image_id,
                    annotation.x,
                    annotation.y,
                    annotation.label,
                    created_at
                ],
            )?;

            Ok(Annotation {
                id: conn.last_insert_rowid(),
                user_id: annotation.user_id,
                image_filename: annotation.image_filename,
                x: annotation.x,
                y: annotation.y,
                label: annotation.label,
                created_at,
            })
        })
        .await
    }
}

// =============================================================================
// Tests
// =============================================================================
