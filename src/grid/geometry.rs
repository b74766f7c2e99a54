//! Tile geometry for a resized puzzle image.

use crate::error::PuzzleError;

use super::cell::Cell;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 512;

// =============================================================================
// Tile Rectangle
// =============================================================================

/// A tile's pixel rectangle, clipped to the image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TileRect {
    /// Exclusive right edge.
    pub fn x1(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn y1(&self) -> u32 {
        self.y + self.height
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

// =============================================================================
// Grid Geometry
// =============================================================================

/// Tiling parameters for an image of a given size.
///
/// Every tile rectangle lies inside `[0, width) x [0, height)`. Tiles in the
/// last row or column may be smaller than `tile_size` but are never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    tile_size: u32,
    width: u32,
    height: u32,
}

impl GridGeometry {
    /// Create a geometry for an image that is already at its final size.
    pub fn new(tile_size: u32, width: u32, height: u32) -> Result<Self, PuzzleError> {
        if tile_size == 0 || width == 0 || height == 0 {
            return Err(PuzzleError::InvalidDimensions {
                width,
                height,
                tile_size,
            });
        }

        Ok(Self {
            tile_size,
            width,
            height,
        })
    }

    /// Compute the geometry a source image takes once resized to `columns` tiles wide.
    ///
    /// The width becomes `tile_size * columns`; the height keeps the source
    /// aspect ratio, rounded to the nearest pixel.
    pub fn for_columns(
        tile_size: u32,
        columns: u32,
        source_width: u32,
        source_height: u32,
    ) -> Result<Self, PuzzleError> {
        if columns == 0 {
            return Err(PuzzleError::InvalidColumns {
                value: columns.to_string(),
            });
        }
        if source_width == 0 || source_height == 0 {
            return Err(PuzzleError::InvalidDimensions {
                width: source_width,
                height: source_height,
                tile_size,
            });
        }

        let target_width = tile_size.checked_mul(columns).ok_or_else(|| {
            PuzzleError::CanvasTooLarge {
                width: tile_size as u64 * columns as u64,
                height: 0,
                rows: 0,
                cols: columns as u64,
            }
        })?;
        let target_height = scaled_height(target_width, source_width, source_height)?;

        Self::new(tile_size, target_width, target_height)
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of tile columns.
    pub fn cols(&self) -> u32 {
        self.width.div_ceil(self.tile_size)
    }

    /// Number of tile rows.
    pub fn rows(&self) -> u32 {
        self.height.div_ceil(self.tile_size)
    }

    /// Total number of tiles.
    pub fn tile_count(&self) -> u64 {
        self.rows() as u64 * self.cols() as u64
    }

    /// Whether `cell` lies inside the grid.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows() && cell.col < self.cols()
    }

    /// Clipped pixel rectangle of `cell`, or `None` if the cell is outside the grid.
    pub fn tile_rect(&self, cell: Cell) -> Option<TileRect> {
        if !self.contains(cell) {
            return None;
        }

        let x0 = cell.col * self.tile_size;
        let y0 = cell.row * self.tile_size;
        let x1 = x0.saturating_add(self.tile_size).min(self.width);
        let y1 = y0.saturating_add(self.tile_size).min(self.height);

        Some(TileRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let rows = self.rows();
        let cols = self.cols();
        (0..rows).flat_map(move |row| (0..cols).map(move |col| Cell::new(row, col)))
    }
}

/// Height of an image scaled to `target_width` while keeping its aspect ratio.
///
/// Rounds to the nearest pixel and never returns zero.
pub fn scaled_height(
    target_width: u32,
    source_width: u32,
    source_height: u32,
) -> Result<u32, PuzzleError> {
    if source_width == 0 || source_height == 0 {
        return Err(PuzzleError::InvalidDimensions {
            width: source_width,
            height: source_height,
            tile_size: 0,
        });
    }

    let aspect_ratio = source_width as f64 / source_height as f64;
    let height = (target_width as f64 / aspect_ratio).round();

    if height > u32::MAX as f64 {
        return Err(PuzzleError::CanvasTooLarge {
            width: target_width as u64,
            height: height as u64,
            rows: 0,
            cols: 0,
        });
    }

    Ok((height as u32).max(1))
}

// =============================================================================
// Tests
// =============================================================================
