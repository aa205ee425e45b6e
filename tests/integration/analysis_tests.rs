//! Region analysis integration tests.
//!
//! Tests verify:
//! - Response shape of `POST /analyze-image`
//! - Region count bound and determinism
//! - Uniform and single-feature images
//! - Error mapping (missing, undecodable, malformed, timeout)

use std::time::Duration;

use axum::http::StatusCode;
use image::{GrayImage, Luma};
use serde_json::json;

use spacezoom::detect::REGION_LABEL;
use spacezoom::server::AnalyzeResponse;

use super::test_utils::{
    dark_with_square, png_bytes, post_json, star_field, uniform_gray, Fixture,
};

async fn analyze(fixture: &Fixture, filename: &str) -> super::test_utils::TestResponse {
    post_json(
        fixture.router(),
        "/analyze-image",
        json!({ "image_filename": filename }),
    )
    .await
}

#[tokio::test]
async fn test_uniform_image_has_no_features() {
    let fixture = Fixture::new().await;
    fixture.write_image("flat.png", &png_bytes(&uniform_gray(64, 64)));

    let response = analyze(&fixture, "flat.png").await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["features_found"], 0);
    assert_eq!(body["regions"], json!([]));
}

#[tokio::test]
async fn test_single_square_found() {
    let fixture = Fixture::new().await;
    fixture.write_image("star.png", &png_bytes(&dark_with_square(96, 64, 40, 20, 10)));

    let response = analyze(&fixture, "star.png").await;
    assert_eq!(response.status, StatusCode::OK);

    let body: AnalyzeResponse = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body.features_found, 1);
    assert_eq!(body.regions.len(), 1);

    // Square spans 40..50 x 20..30, centre (45, 25)
    let region = &body.regions[0];
    assert_eq!((region.x, region.y), (45, 25));
    assert_eq!(region.desc, REGION_LABEL);
}

#[tokio::test]
async fn test_region_count_capped_and_in_bounds() {
    let fixture = Fixture::new().await;
    let field = star_field(5);
    let (width, height) = field.dimensions();
    fixture.write_image("field.png", &png_bytes(&field));

    let response = analyze(&fixture, "field.png").await;
    assert_eq!(response.status, StatusCode::OK);

    let body: AnalyzeResponse = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body.features_found, 10);
    assert_eq!(body.regions.len(), body.features_found);
    for region in &body.regions {
        assert!(region.x < width && region.y < height);
    }
}

#[tokio::test]
async fn test_analysis_is_deterministic() {
    let fixture = Fixture::new().await;
    let img = GrayImage::from_fn(120, 90, |x, y| Luma([((x * 7 + y * y) % 256) as u8]));
    fixture.write_image("noise.png", &png_bytes(&img));

    let first = analyze(&fixture, "noise.png").await;
    let second = analyze(&fixture, "noise.png").await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body, second.body);
    assert!(first.json()["features_found"].as_u64().unwrap() <= 10);
}

#[tokio::test]
async fn test_missing_image_is_404() {
    let fixture = Fixture::new().await;

    let response = analyze(&fixture, "nowhere.png").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "not_found");
}

#[tokio::test]
async fn test_zero_byte_file_is_422() {
    let fixture = Fixture::new().await;
    fixture.write_image("empty.jpg", b"");

    let response = analyze(&fixture, "empty.jpg").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json()["error"], "decode_failure");
}

#[tokio::test]
async fn test_non_image_file_is_422() {
    let fixture = Fixture::new().await;
    fixture.write_image("notes.jpg", b"observing log, not pixels");

    let response = analyze(&fixture, "notes.jpg").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let fixture = Fixture::new().await;

    let response = post_json(
        fixture.router(),
        "/analyze-image",
        json!({ "filename": "m31.jpg" }),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "invalid_request");
}

#[tokio::test]
async fn test_traversal_is_400() {
    let fixture = Fixture::new().await;

    let response = analyze(&fixture, "../catalog.db").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_timeout_is_504() {
    let mut fixture = Fixture::new().await;
    fixture.analysis_timeout = Duration::from_nanos(1);
    let img = GrayImage::from_fn(1500, 1500, |x, y| Luma([((x ^ y) % 256) as u8]));
    fixture.write_image("huge.png", &png_bytes(&img));

    let response = analyze(&fixture, "huge.png").await;
    assert_eq!(response.status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(response.json()["error"], "timeout");
}

#[tokio::test]
async fn test_configured_region_limit() {
    let mut fixture = Fixture::new().await;
    fixture.detector.max_regions = 4;
    fixture.write_image("field.png", &png_bytes(&star_field(4)));

    let response = analyze(&fixture, "field.png").await;
    assert_eq!(response.json()["features_found"], 4);
}
