//! Cache of encoded tiles.
//!
//! Exports of the same puzzle read the same tile files over and over. The
//! [`CachingTileStore`] keeps recently loaded tiles in an LRU cache bounded by
//! total byte size, in front of any other [`TileStore`].
//!
//! Only tiles are cached. Writing a tile through the caching store drops the
//! cached copy, so a re-sliced puzzle never serves stale pieces.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use tokio::sync::Mutex;
use tracing::trace;

use crate::error::StoreError;
use crate::puzzle::PuzzleId;

use super::{Artifact, TileStore};

/// Default cache capacity: 64MB
pub const DEFAULT_TILE_CACHE_CAPACITY: usize = 64 * 1024 * 1024;

/// Default maximum number of entries (bounds LRU bookkeeping)
const DEFAULT_MAX_ENTRIES: usize = 10_000;

// =============================================================================
// Cache Key
// =============================================================================

/// Identifies one tile file of one puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileCacheKey {
    pub puzzle: Arc<str>,
    pub file: Arc<str>,
}

impl TileCacheKey {
    pub fn new(puzzle: impl Into<Arc<str>>, file: impl Into<Arc<str>>) -> Self {
        Self {
            puzzle: puzzle.into(),
            file: file.into(),
        }
    }
}

// =============================================================================
// Tile Cache
// =============================================================================

struct CacheState {
    entries: LruCache<TileCacheKey, Bytes>,
    size: usize,
}

/// LRU cache of encoded tiles with a byte-size capacity.
///
/// Least-recently-used entries are evicted once the total cached size exceeds
/// the capacity. A single entry larger than the capacity is not retained.
pub struct TileCache {
    state: Mutex<CacheState>,
    max_size: usize,
}

impl TileCache {
    /// Create a cache with the default capacity (64MB).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TILE_CACHE_CAPACITY)
    }

    /// Create a cache holding at most `max_size` bytes.
    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_MAX_ENTRIES)
    }

    /// Create a cache bounded by both bytes and entry count.
    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        let max_entries = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(max_entries),
                size: 0,
            }),
            max_size,
        }
    }

    /// Look up a tile, marking it as recently used.
    pub async fn get(&self, key: &TileCacheKey) -> Option<Bytes> {
        self.state.lock().await.entries.get(key).cloned()
    }

    /// Whether `key` is cached, without touching LRU order.
    pub async fn contains(&self, key: &TileCacheKey) -> bool {
        self.state.lock().await.entries.contains(key)
    }

    /// Insert or replace a tile, then evict until within capacity.
    pub async fn put(&self, key: TileCacheKey, data: Bytes) {
        let mut state = self.state.lock().await;
        let data_size = data.len();

        // push returns the replaced entry or the one evicted by the entry bound
        if let Some((_, old)) = state.entries.push(key, data) {
            state.size = state.size.saturating_sub(old.len());
        }
        state.size += data_size;

        while state.size > self.max_size {
            match state.entries.pop_lru() {
                Some((_, evicted)) => state.size = state.size.saturating_sub(evicted.len()),
                None => break,
            }
        }
    }

    /// Drop a tile, returning it if it was cached.
    pub async fn remove(&self, key: &TileCacheKey) -> Option<Bytes> {
        let mut state = self.state.lock().await;
        let data = state.entries.pop(key)?;
        state.size = state.size.saturating_sub(data.len());
        Some(data)
    }

    /// Drop every cached tile of `puzzle`.
    pub async fn invalidate_puzzle(&self, puzzle: &str) -> usize {
        let mut state = self.state.lock().await;
        let keys: Vec<TileCacheKey> = state
            .entries
            .iter()
            .filter(|(key, _)| &*key.puzzle == puzzle)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &keys {
            if let Some(data) = state.entries.pop(key) {
                state.size = state.size.saturating_sub(data.len());
            }
        }
        keys.len()
    }

    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.size = 0;
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }

    /// Current total size of cached tiles in bytes.
    pub async fn size(&self) -> usize {
        self.state.lock().await.size
    }

    /// Maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Caching Store
// =============================================================================

/// A [`TileStore`] that caches tile reads of an inner store.
pub struct CachingTileStore<S> {
    inner: S,
    cache: TileCache,
}

impl<S: TileStore> CachingTileStore<S> {
    /// Wrap `inner` with a cache of the default capacity.
    pub fn new(inner: S) -> Self {
        Self::with_cache(inner, TileCache::new())
    }

    /// Wrap `inner` with a cache of `capacity` bytes.
    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        Self::with_cache(inner, TileCache::with_capacity(capacity))
    }

    pub fn with_cache(inner: S, cache: TileCache) -> Self {
        Self { inner, cache }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }
}

#[async_trait]
impl<S: TileStore> TileStore for CachingTileStore<S> {
    async fn put(
        &self,
        puzzle: &PuzzleId,
        artifact: &Artifact,
        data: Bytes,
    ) -> Result<(), StoreError> {
        if let Artifact::Tile(file) = artifact {
            self.cache
                .remove(&TileCacheKey::new(puzzle.as_str(), file.as_str()))
                .await;
        }
        self.inner.put(puzzle, artifact, data).await
    }

    async fn get(&self, puzzle: &PuzzleId, artifact: &Artifact) -> Result<Bytes, StoreError> {
        let Artifact::Tile(file) = artifact else {
            return self.inner.get(puzzle, artifact).await;
        };

        let key = TileCacheKey::new(puzzle.as_str(), file.as_str());
        if let Some(data) = self.cache.get(&key).await {
            trace!(puzzle = %puzzle, file = %file, "Tile cache hit");
            return Ok(data);
        }

        let data = self.inner.get(puzzle, artifact).await?;
        self.cache.put(key, data.clone()).await;
        Ok(data)
    }
}

// =============================================================================
// Tests
// =============================================================================
