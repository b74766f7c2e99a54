//! Puzzle manifest: the ordered piece list and the canonical solution.
//!
//! Serialized as
//!
//! ```json
//! {
//!   "pieces": [{"file": "image_0000.png"}, {"file": "image_0001.png"}],
//!   "solution": {"0,0": "image_0000.png", "0,1": "image_0001.png"}
//! }
//! ```

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::PuzzleError;
use crate::grid::Cell;

/// Filename of the tile created at position `index` in slicing order.
pub fn tile_file_name(index: usize) -> String {
    format!("image_{:04}.png", index)
}

/// One entry of the piece list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceInfo {
    pub file: String,
}

/// Per-puzzle record of every tile and its correct cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Tiles in creation order
    pub pieces: Vec<PieceInfo>,

    /// Correct cell for each tile
    pub solution: BTreeMap<Cell, String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tile and its correct cell.
    pub fn push(&mut self, cell: Cell, file: impl Into<String>) {
        let file = file.into();
        self.pieces.push(PieceInfo { file: file.clone() });
        self.solution.insert(cell, file);
    }

    /// File of the tile that belongs at `(0, 0)`.
    pub fn top_left(&self) -> Option<&str> {
        self.solution.get(&Cell::new(0, 0)).map(String::as_str)
    }

    /// `(rows, cols)` spanned by the solution.
    pub fn grid_extent(&self) -> (u32, u32) {
        self.solution.keys().fold((0, 0), |(rows, cols), cell| {
            (
                rows.max(cell.row.saturating_add(1)),
                cols.max(cell.col.saturating_add(1)),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn to_json(&self) -> Result<Bytes, PuzzleError> {
        serde_json::to_vec(self)
            .map(Bytes::from)
            .map_err(|e| PuzzleError::Encode {
                message: format!("manifest: {}", e),
            })
    }

    pub fn from_json(data: &[u8]) -> Result<Self, PuzzleError> {
        serde_json::from_slice(data).map_err(|e| PuzzleError::CorruptManifest {
            message: e.to_string(),
        })
    }
}
