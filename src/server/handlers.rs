//! HTTP request handlers for the puzzle API.
//!
//! # Endpoints
//!
//! - `POST /uploadPuzzle` - Slice an uploaded image into a new puzzle
//! - `POST /exportPuzzle` - Compose a placement map into a PNG
//! - `GET /puzzles` - List the catalog
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::catalog::CatalogDocument;
use crate::error::{PuzzleError, StoreError};
use crate::puzzle::{parse_columns, PlacementMap, PuzzleService};
use crate::store::TileStore;

/// Header carrying the number of placements left out of an export.
pub const SKIPPED_TILES_HEADER: HeaderName = HeaderName::from_static("x-puzzle-skipped-tiles");

/// File name offered to browsers for exported images.
pub const EXPORT_FILE_NAME: &str = "puzzle.png";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the puzzle service.
pub struct AppState<S: TileStore> {
    pub puzzle_service: Arc<PuzzleService<S>>,
}

impl<S: TileStore> AppState<S> {
    pub fn new(puzzle_service: PuzzleService<S>) -> Self {
        Self {
            puzzle_service: Arc::new(puzzle_service),
        }
    }
}

impl<S: TileStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            puzzle_service: Arc::clone(&self.puzzle_service),
        }
    }
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Body of `POST /exportPuzzle`.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    /// Folder identifier of the puzzle
    pub folder: String,

    /// `"row,col"` -> tile file name
    #[serde(default)]
    pub placements: PlacementMap,
}

/// Successful upload response.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Always `"ok"`
    pub status: String,
    pub folder: String,
    pub rows: u32,
    pub cols: u32,

    /// Number of tiles written
    pub pieces: usize,
}

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "invalid_columns", "storage_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Status code and error type identifier for a puzzle error.
fn classify(err: &PuzzleError) -> (StatusCode, &'static str) {
    match err {
        PuzzleError::Decode { .. } => (StatusCode::BAD_REQUEST, "decode_error"),
        PuzzleError::InvalidColumns { .. } => (StatusCode::BAD_REQUEST, "invalid_columns"),
        PuzzleError::InvalidDimensions { .. } => (StatusCode::BAD_REQUEST, "invalid_dimensions"),
        PuzzleError::InvalidName { .. } => (StatusCode::BAD_REQUEST, "invalid_name"),
        PuzzleError::MissingField(_) => (StatusCode::BAD_REQUEST, "missing_field"),
        PuzzleError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
        PuzzleError::EmptyPlacements => (StatusCode::BAD_REQUEST, "empty_placements"),
        PuzzleError::CanvasTooLarge { .. } => (StatusCode::BAD_REQUEST, "canvas_too_large"),
        PuzzleError::Store(StoreError::InvalidKey(_)) => (StatusCode::BAD_REQUEST, "invalid_key"),
        PuzzleError::Store(StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
        PuzzleError::Store(StoreError::Io { .. }) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "storage_error")
        }
        PuzzleError::Catalog(_) => (StatusCode::INTERNAL_SERVER_ERROR, "catalog_error"),
        PuzzleError::Encode { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "encode_error"),
        PuzzleError::CorruptManifest { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "corrupt_manifest")
        }
    }
}

/// Convert PuzzleError to HTTP response.
///
/// - 5xx errors are logged at ERROR level
/// - 404 is logged at DEBUG level
/// - other 4xx errors are logged at WARN level
impl IntoResponse for PuzzleError {
    fn into_response(self) -> Response {
        let (status, error_type) = classify(&self);
        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

fn multipart_error(err: MultipartError) -> PuzzleError {
    PuzzleError::InvalidRequest {
        message: err.body_text(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle puzzle uploads.
///
/// # Endpoint
///
/// `POST /uploadPuzzle` (multipart/form-data)
///
/// # Fields
///
/// - `name`: display name, required and non-empty
/// - `columns`: positive integer
/// - `image`: the source image file
///
/// # Response
///
/// - `200 OK`: `{"status":"ok","folder":..,"rows":..,"cols":..,"pieces":..}`
/// - `400 Bad Request`: missing or invalid field, undecodable image
/// - `500 Internal Server Error`: storage or catalog failure
pub async fn upload_handler<S: TileStore + 'static>(
    State(state): State<AppState<S>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, PuzzleError> {
    let mut name: Option<String> = None;
    let mut columns: Option<String> = None;
    let mut image: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("name") => name = Some(field.text().await.map_err(multipart_error)?),
            Some("columns") => columns = Some(field.text().await.map_err(multipart_error)?),
            Some("image") => image = Some(field.bytes().await.map_err(multipart_error)?),
            other => debug!(field = ?other, "Ignoring unknown upload field"),
        }
    }

    let name = name
        .filter(|n| !n.trim().is_empty())
        .ok_or(PuzzleError::MissingField("name"))?;
    let columns = parse_columns(&columns.ok_or(PuzzleError::MissingField("columns"))?)?;
    let image = image
        .filter(|data| !data.is_empty())
        .ok_or(PuzzleError::MissingField("image"))?;

    let created = state
        .puzzle_service
        .create_puzzle(&name, columns, &image)
        .await?;

    Ok(Json(UploadResponse {
        status: "ok".to_string(),
        folder: created.entry.folder,
        rows: created.entry.rows,
        cols: created.entry.cols,
        pieces: created.outcome.manifest.len(),
    }))
}

/// Handle exports of a placement map.
///
/// # Endpoint
///
/// `POST /exportPuzzle` with JSON `{"folder": .., "placements": {"r,c": file}}`
///
/// # Response
///
/// - `200 OK`: PNG attachment
/// - `400 Bad Request`: malformed body, empty map, canvas out of bounds
///
/// # Headers
///
/// - `Content-Type: image/png`
/// - `Content-Disposition: attachment; filename="puzzle.png"`
/// - `X-Puzzle-Skipped-Tiles: <count>`
pub async fn export_handler<S: TileStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, PuzzleError> {
    let Json(request) = payload.map_err(|rejection| PuzzleError::InvalidRequest {
        message: rejection.body_text(),
    })?;

    let composition = state
        .puzzle_service
        .export(&request.folder, &request.placements)
        .await?;
    let png = composition.to_png()?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
            (SKIPPED_TILES_HEADER, composition.skipped.len().to_string()),
        ],
        png,
    )
        .into_response())
}

/// Handle catalog listing.
///
/// `GET /puzzles` returns the catalog document.
pub async fn catalog_handler<S: TileStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<CatalogDocument>, PuzzleError> {
    Ok(Json(state.puzzle_service.list_puzzles().await?))
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
