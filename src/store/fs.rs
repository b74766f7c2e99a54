//! Local filesystem tile store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::StoreError;
use crate::puzzle::PuzzleId;

use super::{Artifact, TileStore};

/// Tile store rooted at a directory on local disk.
///
/// Puzzle namespaces are sub-directories of the root and are created on the
/// first write.
///
/// # Example
///
/// ```ignore
/// use tile_puzzler::store::{FsTileStore, TileStore};
///
/// let store = FsTileStore::new("images");
/// let puzzle = PuzzleId::from_name("Sunset")?;
/// let tile = store.load_tile(&puzzle, "image_0000.png").await?;
/// ```
#[derive(Debug, Clone)]
pub struct FsTileStore {
    root: PathBuf,
}

impl FsTileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a puzzle's namespace.
    pub fn puzzle_dir(&self, puzzle: &PuzzleId) -> PathBuf {
        self.root.join(puzzle.as_str())
    }

    /// Location of an artifact on disk.
    pub fn path_for(&self, puzzle: &PuzzleId, artifact: &Artifact) -> PathBuf {
        let dir = self.puzzle_dir(puzzle);
        match artifact {
            Artifact::Preview => dir.join(super::PREVIEW_FILE),
            Artifact::Manifest => dir.join(super::MANIFEST_FILE),
            Artifact::Tile(name) => dir.join(super::PIECES_DIR).join(name),
        }
    }
}

#[async_trait]
impl TileStore for FsTileStore {
    async fn put(
        &self,
        puzzle: &PuzzleId,
        artifact: &Artifact,
        data: Bytes,
    ) -> Result<(), StoreError> {
        let path = self.path_for(puzzle, artifact);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::from_io(parent.display().to_string(), e))?;
        }

        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| match StoreError::from_io(path.display().to_string(), e) {
                // A missing parent after create_dir_all is a write failure, not a lookup miss
                StoreError::NotFound(p) => StoreError::Io {
                    path: p,
                    message: "parent directory disappeared".to_string(),
                },
                other => other,
            })?;

        debug!(path = %path.display(), bytes = data.len(), "Wrote artifact");
        Ok(())
    }

    async fn get(&self, puzzle: &PuzzleId, artifact: &Artifact) -> Result<Bytes, StoreError> {
        let path = self.path_for(puzzle, artifact);

        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| StoreError::from_io(path.display().to_string(), e))?;

        Ok(Bytes::from(data))
    }
}
