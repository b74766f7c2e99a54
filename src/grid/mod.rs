//! Grid geometry shared by the slicer and the composer.
//!
//! - [`GridGeometry`]: rows, columns and clipped tile rectangles for an image
//! - [`Cell`]: a `(row, col)` grid position, serialized as `"row,col"`
//! - [`CanvasLimits`]: upper bounds on grids and canvases built from untrusted input

mod cell;
mod geometry;
mod limits;

pub use cell::{Cell, ParseCellError};
pub use geometry::{scaled_height, GridGeometry, TileRect, DEFAULT_TILE_SIZE};
pub use limits::{CanvasLimits, DEFAULT_MAX_CANVAS_PIXELS, DEFAULT_MAX_GRID_CELLS};
