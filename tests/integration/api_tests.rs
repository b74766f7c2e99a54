//! API integration tests for uploads, exports, and error handling.
//!
//! Tests verify:
//! - Upload and export round trip over HTTP
//! - HTTP response codes, headers, and JSON error bodies
//! - Static artifact serving under `/images`

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use tile_puzzler::catalog::Catalog;
use tile_puzzler::puzzle::{PuzzleService, ServiceSettings};
use tile_puzzler::store::FsTileStore;
use tile_puzzler::{create_router, RouterConfig};

use super::test_utils::{decode_rgba, gradient_png, is_valid_jpeg, is_valid_png, MultipartBody};

// =============================================================================
// Helpers
// =============================================================================

fn test_router(dir: &tempfile::TempDir) -> Router {
    test_router_with(dir, RouterConfig::new())
}

fn test_router_with(dir: &tempfile::TempDir, config: RouterConfig) -> Router {
    let service = PuzzleService::with_settings(
        FsTileStore::new(dir.path()),
        Catalog::in_dir(dir.path()),
        ServiceSettings {
            tile_size: 16,
            ..ServiceSettings::default()
        },
    );
    create_router(
        service,
        config.with_static_dir(dir.path()).with_tracing(false),
    )
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/uploadPuzzle")
        .header("content-type", MultipartBody::content_type())
        .body(Body::from(body))
        .unwrap()
}

fn export_request(json: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/exportPuzzle")
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn upload_body(name: &str, columns: &str, image: &[u8]) -> Vec<u8> {
    MultipartBody::new()
        .text("name", name)
        .text("columns", columns)
        .file("image", "photo.png", "image/png", image)
        .finish()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn upload(router: &Router, name: &str, columns: &str) -> serde_json::Value {
    let response = router
        .clone()
        .oneshot(upload_request(upload_body(
            name,
            columns,
            &gradient_png(48, 32),
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_upload_success() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let json = upload(&router, "Sunset Beach", "3").await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["folder"], "sunset__beach");
    assert_eq!(json["rows"], 2);
    assert_eq!(json["cols"], 3);
    assert_eq!(json["pieces"], 6);

    let request = Request::builder()
        .uri("/puzzles")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let catalog = json_body(response).await;
    assert_eq!(catalog["images"][0]["name"], "Sunset Beach");
    assert_eq!(catalog["images"][0]["folder"], "sunset__beach");
    assert_eq!(catalog["images"][0]["tl"], "image_0000.png");
}

#[tokio::test]
async fn test_upload_missing_name() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let body = MultipartBody::new()
        .text("columns", "3")
        .file("image", "photo.png", "image/png", &gradient_png(16, 16))
        .finish();
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "missing_field");
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_upload_blank_name_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let response = router
        .oneshot(upload_request(upload_body("  ", "3", &gradient_png(16, 16))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_invalid_columns() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    for columns in ["0", "-2", "four"] {
        let response = router
            .clone()
            .oneshot(upload_request(upload_body(
                "Sunset",
                columns,
                &gradient_png(16, 16),
            )))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{columns}");
        let json = json_body(response).await;
        assert_eq!(json["error"], "invalid_columns");
    }
}

#[tokio::test]
async fn test_upload_undecodable_image() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let response = router
        .oneshot(upload_request(upload_body("Sunset", "2", b"plain text")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "decode_error");

    // Nothing recorded
    assert!(!dir.path().join("imageIndex.json").exists());
}

#[tokio::test]
async fn test_upload_over_body_limit() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router_with(&dir, RouterConfig::new().with_max_upload_bytes(256));

    let response = router
        .oneshot(upload_request(upload_body(
            "Big",
            "2",
            &gradient_png(64, 64),
        )))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert!(!dir.path().join("imageIndex.json").exists());
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_success() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);
    upload(&router, "Sunset", "3").await;

    let response = router
        .oneshot(export_request(
            r#"{"folder": "sunset", "placements": {"0,0": "image_0000.png", "1,2": "image_0005.png"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");
    assert_eq!(
        response.headers().get("content-disposition").unwrap(),
        "attachment; filename=\"puzzle.png\""
    );
    assert_eq!(
        response.headers().get("x-puzzle-skipped-tiles").unwrap(),
        "0"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(is_valid_png(&body));
    assert_eq!(decode_rgba(&body).dimensions(), (48, 32));
}

#[tokio::test]
async fn test_export_reports_skipped_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);
    upload(&router, "Sunset", "3").await;

    let response = router
        .oneshot(export_request(
            r#"{"folder": "sunset", "placements": {"0,0": "image_0000.png", "0,1": "missing.png", "0,2": "../../etc/passwd"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-puzzle-skipped-tiles").unwrap(),
        "2"
    );
}

#[tokio::test]
async fn test_export_empty_placements() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let response = router
        .oneshot(export_request(r#"{"folder": "sunset", "placements": {}}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "empty_placements");
}

#[tokio::test]
async fn test_export_malformed_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    for body in [
        "{ not json",
        r#"{"placements": {"0,0": "a.png"}}"#,
        r#"{"folder": "sunset", "placements": {"x,y": "a.png"}}"#,
        r#"{"folder": "sunset", "placements": {"-1,0": "a.png"}}"#,
    ] {
        let response = router.clone().oneshot(export_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let json = json_body(response).await;
        assert_eq!(json["error"], "invalid_request", "{body}");
    }
}

#[tokio::test]
async fn test_export_canvas_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let response = router
        .oneshot(export_request(
            r#"{"folder": "sunset", "placements": {"4000000000,4000000000": "a.png"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "canvas_too_large");
}

#[tokio::test]
async fn test_export_unsafe_folder() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let response = router
        .oneshot(export_request(
            r#"{"folder": "..", "placements": {"0,0": "a.png"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "invalid_name");
}

// =============================================================================
// Static Files
// =============================================================================

#[tokio::test]
async fn test_static_artifacts_served() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);
    upload(&router, "Sunset", "3").await;

    let request = Request::builder()
        .uri("/images/sunset/index.jpg")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(is_valid_jpeg(&body));

    let request = Request::builder()
        .uri("/images/sunset/pieces/image_0003.png")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/images/imageIndex.json")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
