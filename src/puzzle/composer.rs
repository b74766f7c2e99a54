//! Composing a placement map back into one image.
//!
//! The canvas spans `(max_col + 1) * tile_size` by `(max_row + 1) * tile_size`
//! pixels, where the maxima are taken over the placement keys, and starts
//! fully transparent. Each referenced tile is painted at
//! `(col * tile_size, row * tile_size)` with source-over blending.
//!
//! Placements are best effort: a tile that cannot be loaded or decoded leaves
//! its cell blank and is reported in [`Composition::skipped`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use image::imageops;
use image::RgbaImage;
use tracing::{debug, warn};

use crate::error::PuzzleError;
use crate::grid::{CanvasLimits, Cell, DEFAULT_TILE_SIZE};
use crate::store::TileStore;

use super::codec;
use super::id::PuzzleId;

/// Caller-supplied assignment of tile files to grid cells.
///
/// Need not be the canonical solution, complete, or free of repeated files.
pub type PlacementMap = HashMap<Cell, String>;

/// Why a placement was left blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Tile could not be read from the store
    Unavailable(String),

    /// Tile bytes are not a decodable image
    Undecodable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unavailable(msg) => write!(f, "unavailable: {}", msg),
            SkipReason::Undecodable(msg) => write!(f, "undecodable: {}", msg),
        }
    }
}

/// A placement that could not be painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTile {
    pub cell: Cell,
    pub file: String,
    pub reason: SkipReason,
}

/// Composite image plus the placements that were left blank.
#[derive(Debug, Clone)]
pub struct Composition {
    pub image: RgbaImage,
    /// Skipped placements in row-major cell order
    pub skipped: Vec<SkippedTile>,
}

impl Composition {
    /// Whether every placement was painted.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Encode the composite as PNG.
    pub fn to_png(&self) -> Result<bytes::Bytes, PuzzleError> {
        codec::encode_png(&self.image)
    }
}

/// Paints tiles from a store onto a canvas.
#[derive(Debug, Clone)]
pub struct Composer {
    tile_size: u32,
    limits: CanvasLimits,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}

impl Composer {
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size,
            limits: CanvasLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: CanvasLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Canvas size in pixels for `placements`, checked against the limits.
    ///
    /// # Errors
    ///
    /// - [`PuzzleError::EmptyPlacements`] for an empty map
    /// - [`PuzzleError::CanvasTooLarge`] if the extent exceeds the limits
    pub fn canvas_size(&self, placements: &PlacementMap) -> Result<(u32, u32), PuzzleError> {
        if placements.is_empty() {
            return Err(PuzzleError::EmptyPlacements);
        }
        if self.tile_size == 0 {
            return Err(PuzzleError::InvalidDimensions {
                width: 0,
                height: 0,
                tile_size: 0,
            });
        }

        let (max_row, max_col) = placements
            .keys()
            .fold((0u32, 0u32), |(r, c), cell| (r.max(cell.row), c.max(cell.col)));

        self.limits
            .check_grid(max_row as u64 + 1, max_col as u64 + 1, self.tile_size)
    }

    /// Compose `placements` for `puzzle` into one image.
    ///
    /// Tiles are painted in row-major cell order and clipped to their own
    /// cell, so the result does not depend on map iteration order.
    pub async fn compose<S>(
        &self,
        store: &S,
        puzzle: &PuzzleId,
        placements: &PlacementMap,
    ) -> Result<Composition, PuzzleError>
    where
        S: TileStore + ?Sized,
    {
        let (width, height) = self.canvas_size(placements)?;
        let mut canvas = RgbaImage::new(width, height);
        let mut skipped = Vec::new();

        debug!(
            puzzle = %puzzle,
            placements = placements.len(),
            width,
            height,
            "Composing puzzle"
        );

        let ordered: BTreeMap<&Cell, &String> = placements.iter().collect();
        for (&cell, file) in ordered {
            match self.load_tile(store, puzzle, file).await {
                Ok(tile) => self.paint(&mut canvas, cell, &tile),
                Err(reason) => {
                    warn!(
                        puzzle = %puzzle,
                        cell = %cell,
                        file = %file,
                        reason = %reason,
                        "Skipping tile"
                    );
                    skipped.push(SkippedTile {
                        cell,
                        file: file.clone(),
                        reason,
                    });
                }
            }
        }

        Ok(Composition {
            image: canvas,
            skipped,
        })
    }

    async fn load_tile<S>(
        &self,
        store: &S,
        puzzle: &PuzzleId,
        file: &str,
    ) -> Result<RgbaImage, SkipReason>
    where
        S: TileStore + ?Sized,
    {
        let data = store
            .load_tile(puzzle, file)
            .await
            .map_err(|e| SkipReason::Unavailable(e.to_string()))?;

        codec::decode_image(&data)
            .map(|image| image.to_rgba8())
            .map_err(|e| SkipReason::Undecodable(e.to_string()))
    }

    fn paint(&self, canvas: &mut RgbaImage, cell: Cell, tile: &RgbaImage) {
        let x = cell.col * self.tile_size;
        let y = cell.row * self.tile_size;

        let width = tile.width().min(self.tile_size);
        let height = tile.height().min(self.tile_size);

        // Cells never overlap, so tile pixels are copied verbatim.
        if width == tile.width() && height == tile.height() {
            imageops::replace(canvas, tile, x as i64, y as i64);
        } else {
            let clipped = imageops::crop_imm(tile, 0, 0, width, height).to_image();
            imageops::replace(canvas, &clipped, x as i64, y as i64);
        }
    }
}
