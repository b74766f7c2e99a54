//! Tile store: persisted artifacts of each puzzle.
//!
//! # Layout
//!
//! Each puzzle owns a namespace keyed by its [`PuzzleId`]:
//!
//! ```text
//! <puzzle>/
//! ├── index.jpg          preview (Artifact::Preview)
//! ├── manifest.json      manifest (Artifact::Manifest)
//! └── pieces/
//!     ├── image_0000.png tiles (Artifact::Tile)
//!     └── ...
//! ```
//!
//! Artifacts are addressed purely by name. There is no content addressing,
//! integrity check, deduplication, or garbage collection of orphaned tiles.
//!
//! # Implementations
//!
//! - [`FsTileStore`]: directory tree on local disk
//! - [`MemoryTileStore`]: in-process map
//! - [`CachingTileStore`]: LRU cache of encoded tiles in front of another store

mod cache;
mod fs;
mod memory;

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;
use crate::puzzle::PuzzleId;

pub use cache::{CachingTileStore, TileCache, TileCacheKey, DEFAULT_TILE_CACHE_CAPACITY};
pub use fs::FsTileStore;
pub use memory::MemoryTileStore;

/// Preview image name inside a puzzle namespace.
pub const PREVIEW_FILE: &str = "index.jpg";

/// Manifest name inside a puzzle namespace.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Sub-namespace holding the tiles.
pub const PIECES_DIR: &str = "pieces";

// =============================================================================
// Artifact
// =============================================================================

/// A named artifact within a puzzle namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// Resized lossy preview of the whole image
    Preview,

    /// Manifest document
    Manifest,

    /// One tile, by filename
    Tile(String),
}

impl Artifact {
    /// Tile artifact, validating that `name` is a single safe path component.
    pub fn tile(name: impl Into<String>) -> Result<Self, StoreError> {
        let name = name.into();
        if crate::puzzle::is_safe_component(&name) {
            Ok(Artifact::Tile(name))
        } else {
            Err(StoreError::InvalidKey(name))
        }
    }

    /// Path of the artifact relative to its puzzle namespace.
    pub fn relative_path(&self) -> String {
        match self {
            Artifact::Preview => PREVIEW_FILE.to_string(),
            Artifact::Manifest => MANIFEST_FILE.to_string(),
            Artifact::Tile(name) => format!("{}/{}", PIECES_DIR, name),
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative_path())
    }
}

// =============================================================================
// TileStore Trait
// =============================================================================

/// Storage backend for puzzle artifacts.
///
/// Writes of different artifacts are independent; there is no multi-artifact
/// transaction.
#[async_trait]
pub trait TileStore: Send + Sync {
    /// Store `data` as `artifact` of `puzzle`, replacing any previous content.
    async fn put(&self, puzzle: &PuzzleId, artifact: &Artifact, data: Bytes)
        -> Result<(), StoreError>;

    /// Load `artifact` of `puzzle`.
    ///
    /// Returns [`StoreError::NotFound`] if it was never written.
    async fn get(&self, puzzle: &PuzzleId, artifact: &Artifact) -> Result<Bytes, StoreError>;

    /// Store an encoded tile.
    async fn save_tile(&self, puzzle: &PuzzleId, file: &str, data: Bytes) -> Result<(), StoreError> {
        self.put(puzzle, &Artifact::tile(file)?, data).await
    }

    /// Load an encoded tile.
    async fn load_tile(&self, puzzle: &PuzzleId, file: &str) -> Result<Bytes, StoreError> {
        self.get(puzzle, &Artifact::tile(file)?).await
    }
}
