//! HTTP server layer for the tile puzzler.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   POST /uploadPuzzle   POST /exportPuzzle   GET /puzzles        │
//! │                                                                 │
//! │  ┌──────────────────────────┐  ┌─────────────────────────────┐  │
//! │  │        handlers          │  │          routes             │  │
//! │  │ (requests, error map)    │  │ (router config, CORS, body) │  │
//! │  └──────────────────────────┘  └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    catalog_handler, export_handler, health_handler, upload_handler, AppState, ErrorResponse,
    ExportRequest, HealthResponse, UploadResponse, EXPORT_FILE_NAME, SKIPPED_TILES_HEADER,
};
pub use routes::{create_dev_router, create_router, RouterConfig, DEFAULT_MAX_UPLOAD_BYTES};
