//! Slicing a source image into puzzle tiles.
//!
//! ```text
//! image bytes ──► decode ──► resize to tile_size * columns wide (Lanczos3)
//!                               │
//!                               ├──► index.jpg (preview)
//!                               ├──► pieces/image_0000.png ... (row-major)
//!                               └──► manifest.json
//! ```
//!
//! Writes are independent per artifact. A failure partway through leaves the
//! tiles written so far and no manifest; nothing is rolled back or retried.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};
use tracing::{debug, info};

use crate::error::PuzzleError;
use crate::grid::{CanvasLimits, GridGeometry, DEFAULT_TILE_SIZE};
use crate::store::{Artifact, TileStore};

use super::codec::{self, DEFAULT_JPEG_QUALITY};
use super::id::PuzzleId;
use super::manifest::{tile_file_name, Manifest};

/// Result of a successful slice.
#[derive(Debug, Clone)]
pub struct SliceOutcome {
    /// Namespace the artifacts were written to
    pub puzzle: PuzzleId,

    /// Geometry of the resized image
    pub geometry: GridGeometry,

    /// Manifest as persisted
    pub manifest: Manifest,

    /// The resized image the tiles were cut from
    pub image: RgbaImage,
}

impl SliceOutcome {
    pub fn rows(&self) -> u32 {
        self.geometry.rows()
    }

    pub fn cols(&self) -> u32 {
        self.geometry.cols()
    }
}

/// Cuts images into fixed-size tiles and persists them.
#[derive(Debug, Clone)]
pub struct Slicer {
    tile_size: u32,
    limits: CanvasLimits,
    preview_quality: u8,
}

impl Default for Slicer {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}

impl Slicer {
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size,
            limits: CanvasLimits::default(),
            preview_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_limits(mut self, limits: CanvasLimits) -> Self {
        self.limits = limits;
        self
    }

    /// JPEG quality of the preview image.
    pub fn with_preview_quality(mut self, quality: u8) -> Self {
        self.preview_quality = codec::clamp_quality(quality);
        self
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Decode `source`, slice it into `columns` tile columns, and persist the
    /// preview, every tile, and the manifest under `puzzle`.
    ///
    /// # Errors
    ///
    /// - [`PuzzleError::InvalidColumns`] if `columns` is zero
    /// - [`PuzzleError::Decode`] if `source` is not a supported image
    /// - [`PuzzleError::CanvasTooLarge`] if the resized image exceeds the limits
    /// - [`PuzzleError::Store`] if any write fails
    pub async fn slice<S>(
        &self,
        store: &S,
        puzzle: &PuzzleId,
        source: &[u8],
        columns: u32,
    ) -> Result<SliceOutcome, PuzzleError>
    where
        S: TileStore + ?Sized,
    {
        if columns == 0 {
            return Err(PuzzleError::InvalidColumns {
                value: columns.to_string(),
            });
        }

        let decoded = codec::decode_image(source)?;
        let (geometry, resized) = self.resize(&decoded, columns)?;

        info!(
            puzzle = %puzzle,
            source_width = decoded.width(),
            source_height = decoded.height(),
            width = geometry.width(),
            height = geometry.height(),
            rows = geometry.rows(),
            cols = geometry.cols(),
            "Slicing puzzle"
        );
        drop(decoded);

        let preview = codec::encode_jpeg(&resized, self.preview_quality)?;
        store.put(puzzle, &Artifact::Preview, preview).await?;

        let mut manifest = Manifest::new();
        for cell in geometry.cells() {
            let Some(rect) = geometry.tile_rect(cell) else {
                continue;
            };

            let tile = imageops::crop_imm(&resized, rect.x, rect.y, rect.width, rect.height)
                .to_image();
            let encoded = codec::encode_png(&tile)?;

            let file = tile_file_name(manifest.len());
            store.save_tile(puzzle, &file, encoded).await?;
            debug!(puzzle = %puzzle, cell = %cell, file = %file, "Wrote tile");

            manifest.push(cell, file);
        }

        store
            .put(puzzle, &Artifact::Manifest, manifest.to_json()?)
            .await?;

        info!(puzzle = %puzzle, pieces = manifest.len(), "Puzzle sliced");

        Ok(SliceOutcome {
            puzzle: puzzle.clone(),
            geometry,
            manifest,
            image: resized,
        })
    }

    /// Resize `image` to `tile_size * columns` wide, keeping its aspect ratio.
    pub fn resize(
        &self,
        image: &DynamicImage,
        columns: u32,
    ) -> Result<(GridGeometry, RgbaImage), PuzzleError> {
        let (source_width, source_height) = image.dimensions();
        let geometry =
            GridGeometry::for_columns(self.tile_size, columns, source_width, source_height)?;

        self.limits.check_image(
            geometry.width(),
            geometry.height(),
            geometry.rows(),
            geometry.cols(),
        )?;

        let resized = imageops::resize(
            &image.to_rgba8(),
            geometry.width(),
            geometry.height(),
            FilterType::Lanczos3,
        );

        Ok((geometry, resized))
    }
}
