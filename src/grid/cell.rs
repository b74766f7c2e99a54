//! Grid cell coordinates.
//!
//! A [`Cell`] is used directly as a map key inside the crate. On the wire it
//! keeps the `"row,col"` string form used by manifests and placement maps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A `(row, col)` position in a puzzle grid.
///
/// Ordering is row-major, so a sorted map of cells iterates in scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cell {
    /// Row index (0 = top)
    pub row: u32,

    /// Column index (0 = left)
    pub col: u32,
}

impl Cell {
    /// Create a new cell.
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Linear index of this cell in row-major order for a grid with `cols` columns.
    pub fn index(&self, cols: u32) -> u64 {
        self.row as u64 * cols as u64 + self.col as u64
    }
}

/// Error returned when a `"row,col"` key cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCellError {
    key: String,
}

impl fmt::Display for ParseCellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid cell key {:?}: expected \"<row>,<col>\" with non-negative integers",
            self.key
        )
    }
}

impl std::error::Error for ParseCellError {}

impl FromStr for Cell {
    type Err = ParseCellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCellError { key: s.to_string() };

        let (row, col) = s.split_once(',').ok_or_else(err)?;
        let row = row.trim().parse::<u32>().map_err(|_| err())?;
        let col = col.trim().parse::<u32>().map_err(|_| err())?;

        Ok(Cell { row, col })
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

impl TryFrom<String> for Cell {
    type Error = ParseCellError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cell> for String {
    fn from(cell: Cell) -> Self {
        cell.to_string()
    }
}
