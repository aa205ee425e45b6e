//! Tile delivery integration tests.
//!
//! Tests verify:
//! - Tiles are returned byte-for-byte from the canonical path
//! - Both `{y}` and `{y}.jpg` forms resolve
//! - Missing and out-of-range tiles are 404 with an empty body
//! - tile_size validation and echo

use axum::http::StatusCode;

use spacezoom::tile::tile_relative_path;

use super::test_utils::{get, tile_jpeg, Fixture};

#[tokio::test]
async fn test_tile_bytes_identical() {
    let fixture = Fixture::new().await;
    let data = tile_jpeg(7);
    fixture.add_tile("m31.jpg", 3, 5, &data);

    let response = get(fixture.router(), "/tiles/m31.jpg/3/5.jpg").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers.get("content-type").unwrap(), "image/jpeg");
    assert_eq!(
        response.headers.get("cache-control").unwrap(),
        "public, max-age=3600"
    );
    assert_eq!(response.headers.get("x-tile-size").unwrap(), "256");
    assert_eq!(response.body.as_ref(), data.as_slice());
}

#[tokio::test]
async fn test_tile_without_extension() {
    let fixture = Fixture::new().await;
    let data = tile_jpeg(9);
    fixture.add_tile("m31.jpg", 0, 0, &data);

    let response = get(fixture.router(), "/tiles/m31.jpg/0/0").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_ref(), data.as_slice());
}

#[tokio::test]
async fn test_tiles_are_distinct_per_coordinate() {
    let fixture = Fixture::new().await;
    let a = tile_jpeg(10);
    let b = tile_jpeg(200);
    fixture.add_tile("orion.png", 1, 2, &a);
    fixture.add_tile("orion.png", 2, 1, &b);

    let first = get(fixture.router(), "/tiles/orion.png/1/2.jpg").await;
    let second = get(fixture.router(), "/tiles/orion.png/2/1.jpg").await;
    assert_eq!(first.body.as_ref(), a.as_slice());
    assert_eq!(second.body.as_ref(), b.as_slice());
}

#[tokio::test]
async fn test_tile_path_scheme() {
    let fixture = Fixture::new().await;
    let path = fixture.add_tile("crab.tif", 4, 2, &tile_jpeg(1));

    assert_eq!(tile_relative_path("crab.tif", 4, 2), "crab/crab_tile_4_2.jpg");
    assert!(path.ends_with("crab/crab_tile_4_2.jpg"));
}

#[tokio::test]
async fn test_missing_tile_is_empty_404() {
    let fixture = Fixture::new().await;
    fixture.add_tile("m31.jpg", 0, 0, &tile_jpeg(1));

    let response = get(fixture.router(), "/tiles/m31.jpg/99/99.jpg").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.is_empty(), "body: {}", response.text());
    assert!(response.headers.get("content-type").is_none());
}

#[tokio::test]
async fn test_negative_coordinates_are_404() {
    let fixture = Fixture::new().await;
    fixture.add_tile("m31.jpg", 0, 0, &tile_jpeg(1));

    let response = get(fixture.router(), "/tiles/m31.jpg/-1/0.jpg").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_image_tile_is_404() {
    let fixture = Fixture::new().await;

    let response = get(fixture.router(), "/tiles/nebula.jpg/0/0.jpg").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_malformed_row_is_400() {
    let fixture = Fixture::new().await;

    let response = get(fixture.router(), "/tiles/m31.jpg/0/zero.jpg").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "invalid_request");
}

#[tokio::test]
async fn test_tile_size_echoed() {
    let fixture = Fixture::new().await;
    fixture.add_tile("m31.jpg", 0, 0, &tile_jpeg(1));

    let response = get(fixture.router(), "/tiles/m31.jpg/0/0.jpg?tile_size=512").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers.get("x-tile-size").unwrap(), "512");
}

#[tokio::test]
async fn test_invalid_tile_size_is_400() {
    let fixture = Fixture::new().await;
    fixture.add_tile("m31.jpg", 0, 0, &tile_jpeg(1));

    for size in ["0", "4097"] {
        let uri = format!("/tiles/m31.jpg/0/0.jpg?tile_size={}", size);
        let response = get(fixture.router(), &uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "tile_size={}", size);
        assert_eq!(response.json()["error"], "invalid_tile_size");
    }
}

#[tokio::test]
async fn test_tile_traversal_rejected() {
    let fixture = Fixture::new().await;

    let response = get(fixture.router(), "/tiles/..%2F..%2Fetc/0/0.jpg").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
