//! In-process tile store.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::puzzle::PuzzleId;

use super::{Artifact, TileStore};

/// Tile store that keeps every artifact in memory.
///
/// Nothing survives the process. Useful for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryTileStore {
    artifacts: RwLock<HashMap<(PuzzleId, Artifact), Bytes>>,
}

impl MemoryTileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts across all puzzles.
    pub async fn len(&self) -> usize {
        self.artifacts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.artifacts.read().await.is_empty()
    }

    /// Remove an artifact, returning whether it existed.
    pub async fn remove(&self, puzzle: &PuzzleId, artifact: &Artifact) -> bool {
        self.artifacts
            .write()
            .await
            .remove(&(puzzle.clone(), artifact.clone()))
            .is_some()
    }

    /// Tile names stored for `puzzle`, sorted.
    pub async fn tile_names(&self, puzzle: &PuzzleId) -> Vec<String> {
        let mut names: Vec<String> = self
            .artifacts
            .read()
            .await
            .keys()
            .filter(|(p, _)| p == puzzle)
            .filter_map(|(_, artifact)| match artifact {
                Artifact::Tile(name) => Some(name.clone()),
                _ => None,
            })
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl TileStore for MemoryTileStore {
    async fn put(
        &self,
        puzzle: &PuzzleId,
        artifact: &Artifact,
        data: Bytes,
    ) -> Result<(), StoreError> {
        self.artifacts
            .write()
            .await
            .insert((puzzle.clone(), artifact.clone()), data);
        Ok(())
    }

    async fn get(&self, puzzle: &PuzzleId, artifact: &Artifact) -> Result<Bytes, StoreError> {
        self.artifacts
            .read()
            .await
            .get(&(puzzle.clone(), artifact.clone()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", puzzle, artifact)))
    }
}
