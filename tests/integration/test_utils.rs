//! Test utilities for integration tests.
//!
//! Builds a throwaway image directory, tile directory and catalog under a
//! temp dir, plus helpers for generating rasters and driving the router.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{GrayImage, ImageEncoder, Luma, Rgb, RgbImage};
use tempfile::TempDir;
use tower::ServiceExt;

use spacezoom::catalog::{Catalog, NewImage, SqliteCatalog};
use spacezoom::detect::{AnalysisService, DetectorConfig, RegionDetector};
use spacezoom::server::{create_router, AppState, RouterConfig};
use spacezoom::source::LocalImageSource;
use spacezoom::tile::tile_relative_path;

// =============================================================================
// Fixture
// =============================================================================

/// On-disk fixture: images, tiles and a SQLite catalog in one temp dir.
pub struct Fixture {
    _dir: TempDir,
    pub image_dir: PathBuf,
    pub tile_dir: PathBuf,
    pub catalog: Arc<SqliteCatalog>,
    pub detector: DetectorConfig,
    pub analysis_timeout: Duration,
    pub analysis_workers: usize,
}

impl Fixture {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let image_dir = dir.path().join("images");
        let tile_dir = dir.path().join("tiles");
        std::fs::create_dir(&image_dir).unwrap();
        std::fs::create_dir(&tile_dir).unwrap();

        let catalog = SqliteCatalog::open(dir.path().join("catalog.db"))
            .await
            .unwrap();

        Self {
            _dir: dir,
            image_dir,
            tile_dir,
            catalog: Arc::new(catalog),
            detector: DetectorConfig::default(),
            analysis_timeout: Duration::from_secs(30),
            analysis_workers: 2,
        }
    }

    /// Write an image file without cataloguing it.
    pub fn write_image(&self, filename: &str, data: &[u8]) {
        std::fs::write(self.image_dir.join(filename), data).unwrap();
    }

    /// Write an image file and register it in the catalog.
    pub async fn add_image(&self, filename: &str, data: &[u8], width: u32, height: u32) {
        self.write_image(filename, data);
        self.register(filename, width, height).await;
    }

    /// Register a catalog entry without writing a file.
    pub async fn register(&self, filename: &str, width: u32, height: u32) {
        self.catalog
            .register_image(NewImage {
                filename: filename.to_string(),
                title: filename.to_string(),
                description: String::new(),
                width,
                height,
            })
            .await
            .unwrap();
    }

    /// Write a tile at the canonical path for `(filename, x, y)`.
    pub fn add_tile(&self, filename: &str, x: i64, y: i64, data: &[u8]) -> PathBuf {
        let path = self.tile_dir.join(tile_relative_path(filename, x, y));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, data).unwrap();
        path
    }

    /// Build the application router over this fixture.
    pub fn router(&self) -> Router {
        self.router_with(RouterConfig::new().with_tracing(false))
    }

    pub fn router_with(&self, config: RouterConfig) -> Router {
        let source = Arc::new(LocalImageSource::new(&self.image_dir, &self.tile_dir));
        let analysis = AnalysisService::new(
            Arc::clone(&source),
            RegionDetector::new(self.detector.clone()),
        )
        .with_workers(self.analysis_workers)
        .with_timeout(self.analysis_timeout);

        let catalog: Arc<dyn Catalog> = self.catalog.clone();
        create_router(AppState::new(source, analysis, catalog), config)
    }
}

// =============================================================================
// Raster Builders
// =============================================================================

pub fn png_bytes(img: &GrayImage) -> Vec<u8> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::L8,
        )
        .unwrap();
    buf
}

pub fn jpeg_bytes(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 90)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    buf
}

/// A flat grey picture: no bright pixels and no edges.
pub fn uniform_gray(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([128]))
}

/// A dark field with one bright square.
pub fn dark_with_square(width: u32, height: u32, x0: u32, y0: u32, size: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        if (x0..x0 + size).contains(&x) && (y0..y0 + size).contains(&y) {
            Luma([255])
        } else {
            Luma([10])
        }
    })
}

/// A dark field scattered with `n * n` separated bright stars.
pub fn star_field(n: u32) -> GrayImage {
    let size = n * 20 + 10;
    GrayImage::from_fn(size, size, |x, y| {
        if x >= 10 && y >= 10 && (x - 10) % 20 < 3 && (y - 10) % 20 < 3 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// A small colour tile, JPEG encoded.
pub fn tile_jpeg(seed: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(32, 32, |x, y| {
        Rgb([seed, (x * 8) as u8, (y * 8) as u8])
    });
    jpeg_bytes(&img)
}

// =============================================================================
// Request Helpers
// =============================================================================

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub async fn send(router: Router, request: Request<Body>) -> TestResponse {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(router: Router, uri: &str) -> TestResponse {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

pub async fn post_json(router: Router, uri: &str, body: serde_json::Value) -> TestResponse {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}
