//! Puzzle engine: slicing images into tiles and composing tiles back.
//!
//! # Components
//!
//! - [`PuzzleService`]: creates puzzles (slice + catalog) and exports placements
//! - [`Slicer`]: resizes a source image and cuts it into row-major tiles
//! - [`Composer`]: paints a placement map onto a transparent canvas
//! - [`Manifest`]: piece list and canonical solution of one puzzle
//! - [`PuzzleId`]: folder identifier derived from a puzzle name
//! - [`codec`]: PNG/JPEG encoding and format-sniffing decode

pub mod codec;
mod composer;
mod id;
mod manifest;
mod service;
mod slicer;

pub(crate) use id::is_safe_component;

pub use composer::{Composer, Composition, PlacementMap, SkipReason, SkippedTile};
pub use id::{to_folder_name, PuzzleId};
pub use manifest::{tile_file_name, Manifest, PieceInfo};
pub use service::{parse_columns, CreatedPuzzle, PuzzleService, ServiceSettings};
pub use slicer::{SliceOutcome, Slicer};
