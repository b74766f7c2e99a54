use crate::error::PuzzleError;

/// Default maximum number of grid cells along either axis.
pub const DEFAULT_MAX_GRID_CELLS: u32 = 64;

/// Default maximum canvas area in pixels (8192 x 8192).
pub const DEFAULT_MAX_CANVAS_PIXELS: u64 = 8192 * 8192;

/// Upper bounds applied before allocating a canvas.
///
/// Both the slicer's resized image and the composer's output canvas are
/// checked against these limits, so a request cannot force an arbitrarily
/// large allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasLimits {
    /// Maximum rows and maximum columns (each)
    pub max_grid_cells: u32,

    /// Maximum `width * height`
    pub max_canvas_pixels: u64,
}

impl Default for CanvasLimits {
    fn default() -> Self {
        Self {
            max_grid_cells: DEFAULT_MAX_GRID_CELLS,
            max_canvas_pixels: DEFAULT_MAX_CANVAS_PIXELS,
        }
    }
}

impl CanvasLimits {
    /// Limits that accept everything addressable in `u32` pixels.
    pub fn unbounded() -> Self {
        Self {
            max_grid_cells: u32::MAX,
            max_canvas_pixels: u64::MAX,
        }
    }

    /// Check a grid of `rows x cols` tiles and return its canvas size in pixels.
    pub fn check_grid(&self, rows: u64, cols: u64, tile_size: u32) -> Result<(u32, u32), PuzzleError> {
        let width = cols.saturating_mul(tile_size as u64);
        let height = rows.saturating_mul(tile_size as u64);

        let too_large = || PuzzleError::CanvasTooLarge {
            width,
            height,
            rows,
            cols,
        };

        if rows > self.max_grid_cells as u64 || cols > self.max_grid_cells as u64 {
            return Err(too_large());
        }
        self.check_area(width, height).map_err(|_| too_large())?;

        let width = u32::try_from(width).map_err(|_| too_large())?;
        let height = u32::try_from(height).map_err(|_| too_large())?;
        Ok((width, height))
    }

    /// Check an image of `width x height` pixels split into `rows x cols` tiles.
    pub fn check_image(&self, width: u32, height: u32, rows: u32, cols: u32) -> Result<(), PuzzleError> {
        let too_large = || PuzzleError::CanvasTooLarge {
            width: width as u64,
            height: height as u64,
            rows: rows as u64,
            cols: cols as u64,
        };

        if rows > self.max_grid_cells || cols > self.max_grid_cells {
            return Err(too_large());
        }
        self.check_area(width as u64, height as u64)
            .map_err(|_| too_large())
    }

    fn check_area(&self, width: u64, height: u64) -> Result<(), ()> {
        match width.checked_mul(height) {
            Some(area) if area <= self.max_canvas_pixels => Ok(()),
            _ => Err(()),
        }
    }
}
