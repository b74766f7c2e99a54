//! Puzzle service: orchestrates slicing, composing, and the catalog.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        PuzzleService                         │
//! │                                                              │
//! │  create_puzzle()                     export()                │
//! │   1. name -> PuzzleId                 1. folder -> PuzzleId   │
//! │   2. Slicer::slice                    2. Composer::compose    │
//! │   3. Catalog::append                                         │
//! │        │            │                     │                  │
//! │        ▼            ▼                     ▼                  │
//! │   ┌─────────┐  ┌───────────┐        ┌───────────┐            │
//! │   │ Catalog │  │ TileStore │◄───────│ TileStore │            │
//! │   └─────────┘  └───────────┘        └───────────┘            │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::info;

use crate::catalog::{Catalog, CatalogDocument, CatalogEntry};
use crate::error::PuzzleError;
use crate::grid::{CanvasLimits, DEFAULT_TILE_SIZE};
use crate::store::{Artifact, TileStore};

use super::codec::DEFAULT_JPEG_QUALITY;
use super::composer::{Composer, Composition, PlacementMap};
use super::id::PuzzleId;
use super::manifest::{tile_file_name, Manifest};
use super::slicer::{SliceOutcome, Slicer};

// =============================================================================
// Settings
// =============================================================================

/// Parameters shared by the slicer and the composer of one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Tile edge length in pixels
    pub tile_size: u32,

    /// Bounds on resized images and composite canvases
    pub limits: CanvasLimits,

    /// JPEG quality of the preview image
    pub preview_quality: u8,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            limits: CanvasLimits::default(),
            preview_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// A puzzle that was sliced and registered.
#[derive(Debug, Clone)]
pub struct CreatedPuzzle {
    /// Entry appended to the catalog
    pub entry: CatalogEntry,

    /// Slicing result
    pub outcome: SliceOutcome,
}

/// Parse a column count supplied as text.
///
/// Anything that is not a positive integer is rejected.
pub fn parse_columns(value: &str) -> Result<u32, PuzzleError> {
    match value.trim().parse::<i64>() {
        Ok(columns) if columns > 0 => u32::try_from(columns).map_err(|_| {
            PuzzleError::InvalidColumns {
                value: value.to_string(),
            }
        }),
        _ => Err(PuzzleError::InvalidColumns {
            value: value.to_string(),
        }),
    }
}

// =============================================================================
// Puzzle Service
// =============================================================================

/// Entry point for creating and exporting puzzles.
///
/// # Type Parameters
///
/// * `S` - The tile store backing every puzzle
pub struct PuzzleService<S: TileStore> {
    store: Arc<S>,
    catalog: Arc<Catalog>,
    slicer: Slicer,
    composer: Composer,
}

impl<S: TileStore> PuzzleService<S> {
    /// Create a service with default settings.
    pub fn new(store: S, catalog: Catalog) -> Self {
        Self::with_settings(store, catalog, ServiceSettings::default())
    }

    pub fn with_settings(store: S, catalog: Catalog, settings: ServiceSettings) -> Self {
        Self::from_shared(Arc::new(store), Arc::new(catalog), settings)
    }

    /// Create a service over a store and catalog shared with other components.
    pub fn from_shared(store: Arc<S>, catalog: Arc<Catalog>, settings: ServiceSettings) -> Self {
        Self {
            store,
            catalog,
            slicer: Slicer::new(settings.tile_size)
                .with_limits(settings.limits)
                .with_preview_quality(settings.preview_quality),
            composer: Composer::new(settings.tile_size).with_limits(settings.limits),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn tile_size(&self) -> u32 {
        self.slicer.tile_size()
    }

    /// Slice `image` into a new puzzle named `name` and register it in the catalog.
    ///
    /// The catalog is only touched after every artifact was written.
    ///
    /// # Errors
    ///
    /// - [`PuzzleError::MissingField`] if `name` is blank
    /// - [`PuzzleError::InvalidName`] if `name` maps to an unusable folder
    /// - any error of [`Slicer::slice`]
    /// - [`PuzzleError::Catalog`] if the catalog cannot be updated
    pub async fn create_puzzle(
        &self,
        name: &str,
        columns: u32,
        image: &[u8],
    ) -> Result<CreatedPuzzle, PuzzleError> {
        if name.trim().is_empty() {
            return Err(PuzzleError::MissingField("name"));
        }
        if image.is_empty() {
            return Err(PuzzleError::MissingField("image"));
        }

        let puzzle = PuzzleId::from_name(name)?;
        let outcome = self
            .slicer
            .slice(self.store.as_ref(), &puzzle, image, columns)
            .await?;

        let entry = CatalogEntry {
            name: name.to_string(),
            folder: puzzle.to_string(),
            rows: outcome.rows(),
            cols: outcome.cols(),
            top_left: outcome
                .manifest
                .top_left()
                .map(str::to_string)
                .unwrap_or_else(|| tile_file_name(0)),
        };
        self.catalog.append(entry.clone()).await?;

        info!(
            name = %entry.name,
            folder = %entry.folder,
            pieces = outcome.manifest.len(),
            "Puzzle created"
        );

        Ok(CreatedPuzzle { entry, outcome })
    }

    /// Compose `placements` from the tiles of `folder`.
    ///
    /// The folder is not required to exist: unknown tiles are skipped.
    pub async fn export(
        &self,
        folder: &str,
        placements: &PlacementMap,
    ) -> Result<Composition, PuzzleError> {
        let puzzle = PuzzleId::parse(folder)?;
        let composition = self
            .composer
            .compose(self.store.as_ref(), &puzzle, placements)
            .await?;

        info!(
            folder = %puzzle,
            placements = placements.len(),
            skipped = composition.skipped.len(),
            width = composition.image.width(),
            height = composition.image.height(),
            "Puzzle exported"
        );

        Ok(composition)
    }

    /// Load the stored manifest of `folder`.
    pub async fn manifest(&self, folder: &str) -> Result<Manifest, PuzzleError> {
        let puzzle = PuzzleId::parse(folder)?;
        let data = self.store.get(&puzzle, &Artifact::Manifest).await?;
        Manifest::from_json(&data)
    }

    /// Canonical solution of `folder` as a placement map.
    pub async fn solution(&self, folder: &str) -> Result<PlacementMap, PuzzleError> {
        Ok(self.manifest(folder).await?.solution.into_iter().collect())
    }

    /// Current catalog contents.
    pub async fn list_puzzles(&self) -> Result<CatalogDocument, PuzzleError> {
        Ok(self.catalog.list().await?)
    }
}

// =============================================================================
// Tests
// =============================================================================
