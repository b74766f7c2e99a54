//! # Tile Puzzler
//!
//! Slices images into grid jigsaw puzzles and composes solved or partial
//! puzzles back into a single image.
//!
//! ## Features
//!
//! - **Slicing**: resize to a whole number of tile columns (Lanczos3), cut
//!   row-major tiles, write a preview and a manifest with the canonical solution
//! - **Composing**: paint any sparse placement map onto a transparent canvas,
//!   reporting tiles that could not be placed
//! - **Catalog**: a JSON index of every puzzle, safe under concurrent uploads
//! - **Bounded work**: grid and canvas limits are checked before allocating
//! - **HTTP API**: Axum server with upload, export, listing, and static files
//!
//! ## Architecture
//!
//! - [`grid`] - Cells, grid geometry, and canvas limits
//! - [`puzzle`] - Slicer, composer, manifest, and the puzzle service
//! - [`store`] - Tile store trait with disk, memory, and caching backends
//! - [`catalog`] - The persisted puzzle catalog
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use tile_puzzler::{create_router, Catalog, FsTileStore, PuzzleService, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = PuzzleService::new(FsTileStore::new("images"), Catalog::in_dir("images"));
//!     let router = create_router(service, RouterConfig::new().with_static_dir("images"));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod grid;
pub mod puzzle;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogDocument, CatalogEntry, CATALOG_FILE};
pub use config::{Cli, Command, EngineOptions, ExportConfig, ServeConfig, SliceConfig};
pub use error::{CatalogError, PuzzleError, StoreError};
pub use grid::{CanvasLimits, Cell, GridGeometry, TileRect, DEFAULT_TILE_SIZE};
pub use puzzle::{
    parse_columns, to_folder_name, Composer, Composition, CreatedPuzzle, Manifest, PieceInfo,
    PlacementMap, PuzzleId, PuzzleService, ServiceSettings, SkipReason, SkippedTile, SliceOutcome,
    Slicer,
};
pub use server::{
    create_dev_router, create_router, AppState, ErrorResponse, ExportRequest, HealthResponse,
    RouterConfig, UploadResponse,
};
pub use store::{
    Artifact, CachingTileStore, FsTileStore, MemoryTileStore, TileCache, TileStore,
    DEFAULT_TILE_CACHE_CAPACITY,
};
