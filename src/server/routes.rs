//! Router configuration for the puzzle server.
//!
//! # Route Structure
//!
//! ```text
//! /health          - Health check
//! /uploadPuzzle    - Multipart upload, slices a new puzzle
//! /exportPuzzle    - JSON placement map in, PNG out
//! /puzzles         - Catalog listing
//! /images/...      - Static puzzle artifacts (when a static dir is set)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tile_puzzler::catalog::Catalog;
//! use tile_puzzler::puzzle::PuzzleService;
//! use tile_puzzler::server::{create_router, RouterConfig};
//! use tile_puzzler::store::FsTileStore;
//!
//! let service = PuzzleService::new(FsTileStore::new("images"), Catalog::in_dir("images"));
//! let config = RouterConfig::new().with_static_dir("images");
//! let router = create_router(service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{
    catalog_handler, export_handler, health_handler, upload_handler, AppState,
    SKIPPED_TILES_HEADER,
};
use crate::puzzle::PuzzleService;
use crate::store::TileStore;

/// Default request body limit for uploads (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,

    /// Directory served under `/images`
    pub static_dir: Option<PathBuf>,

    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Tracing is enabled
    /// - No static directory is served
    /// - Uploads are limited to 10 MiB
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
            static_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    /// Serve the files under `dir` at `/images`.
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// # Arguments
///
/// * `puzzle_service` - The service handling uploads, exports, and listings
/// * `config` - Router configuration
pub fn create_router<S>(puzzle_service: PuzzleService<S>, config: RouterConfig) -> Router
where
    S: TileStore + 'static,
{
    let app_state = AppState::new(puzzle_service);
    let cors = build_cors_layer(&config);

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/uploadPuzzle", post(upload_handler::<S>))
        .route("/exportPuzzle", post(export_handler::<S>))
        .route("/puzzles", get(catalog_handler::<S>))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(app_state);

    if let Some(dir) = &config.static_dir {
        router = router.nest_service("/images", ServeDir::new(dir));
    }

    let router = router.layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([CONTENT_DISPOSITION, SKIPPED_TILES_HEADER])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

/// Create a router with default configuration.
pub fn create_dev_router<S>(puzzle_service: PuzzleService<S>) -> Router
where
    S: TileStore + 'static,
{
    create_router(puzzle_service, RouterConfig::new())
}

// =============================================================================
// Tests
// =============================================================================
