//! API integration tests for health, image listing and raw image delivery.
//!
//! Tests verify:
//! - Health endpoint
//! - Catalog listing
//! - Raw image bytes and content types
//! - Error bodies and CORS headers

use axum::body::Body;
use axum::http::{Request, StatusCode};

use spacezoom::server::RouterConfig;

use super::test_utils::{get, png_bytes, send, tile_jpeg, uniform_gray, Fixture};

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let fixture = Fixture::new().await;

    let response = get(fixture.router(), "/health").await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// Image Listing
// =============================================================================

#[tokio::test]
async fn test_list_images_empty() {
    let fixture = Fixture::new().await;

    let response = get(fixture.router(), "/images").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["images"], serde_json::json!([]));
}

#[tokio::test]
async fn test_list_images() {
    let fixture = Fixture::new().await;
    fixture.register("orion.png", 4000, 3000).await;
    fixture.register("andromeda.jpg", 12000, 8000).await;

    let response = get(fixture.router(), "/images").await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["filename"], "andromeda.jpg");
    assert_eq!(images[0]["width"], 12000);
    assert_eq!(images[0]["height"], 8000);
    assert_eq!(images[1]["filename"], "orion.png");
    assert!(images[1]["id"].is_i64());
    assert!(images[1]["created_at"].is_string());
}

// =============================================================================
// Raw Images
// =============================================================================

#[tokio::test]
async fn test_get_image_bytes() {
    let fixture = Fixture::new().await;
    let data = png_bytes(&uniform_gray(16, 16));
    fixture.add_image("flat.png", &data, 16, 16).await;

    let response = get(fixture.router(), "/images/flat.png").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers.get("content-type").unwrap(), "image/png");
    assert_eq!(
        response.headers.get("cache-control").unwrap(),
        "public, max-age=3600"
    );
    assert_eq!(response.body.as_ref(), data.as_slice());
}

#[tokio::test]
async fn test_get_jpeg_content_type() {
    let fixture = Fixture::new().await;
    let data = tile_jpeg(40);
    fixture.add_image("m31.jpg", &data, 32, 32).await;

    let response = get(fixture.router(), "/images/m31.jpg").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers.get("content-type").unwrap(), "image/jpeg");
}

#[tokio::test]
async fn test_get_image_not_in_catalog() {
    let fixture = Fixture::new().await;
    fixture.write_image("stray.png", &png_bytes(&uniform_gray(8, 8)));

    let response = get(fixture.router(), "/images/stray.png").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "not_found");
}

#[tokio::test]
async fn test_get_image_missing_on_disk() {
    let fixture = Fixture::new().await;
    fixture.register("ghost.png", 10, 10).await;

    let response = get(fixture.router(), "/images/ghost.png").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let body = response.json();
    assert_eq!(body["status"], 404);
    let image_dir = fixture.image_dir.display().to_string();
    assert!(!response.text().contains(&image_dir));
}

#[tokio::test]
async fn test_get_image_rejects_traversal() {
    let fixture = Fixture::new().await;

    // Encoded "../catalog.db" stays a single path segment
    let response = get(fixture.router(), "/images/..%2Fcatalog.db").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "invalid_identifier");
}

#[tokio::test]
async fn test_cache_max_age_is_configurable() {
    let fixture = Fixture::new().await;
    let data = png_bytes(&uniform_gray(8, 8));
    fixture.add_image("flat.png", &data, 8, 8).await;

    let router = fixture.router_with(
        RouterConfig::new()
            .with_tracing(false)
            .with_cache_max_age(60),
    );
    let response = get(router, "/images/flat.png").await;
    assert_eq!(
        response.headers.get("cache-control").unwrap(),
        "public, max-age=60"
    );
}

// =============================================================================
// Routing and CORS
// =============================================================================

#[tokio::test]
async fn test_unknown_route() {
    let fixture = Fixture::new().await;

    let response = get(fixture.router(), "/does-not-exist").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_any_origin() {
    let fixture = Fixture::new().await;

    let request = Request::builder()
        .uri("/health")
        .header("origin", "https://viewer.example")
        .body(Body::empty())
        .unwrap();
    let response = send(fixture.router(), request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response
            .headers
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_restricted_origin() {
    let fixture = Fixture::new().await;
    let router = fixture.router_with(
        RouterConfig::new()
            .with_tracing(false)
            .with_cors_origins(vec!["https://viewer.example".to_string()]),
    );

    let request = Request::builder()
        .uri("/health")
        .header("origin", "https://elsewhere.example")
        .body(Body::empty())
        .unwrap();
    let response = send(router, request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .headers
        .get("access-control-allow-origin")
        .is_none());
}
