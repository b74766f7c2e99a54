//! Configuration management for the tile puzzler.
//!
//! Settings come from command-line arguments via clap, with environment
//! variable fallbacks using the `PUZZLE_` prefix.
//!
//! # Subcommands
//!
//! - `serve` - run the HTTP server
//! - `slice` - slice a local image into the data directory
//! - `export` - compose a placement map (or the stored solution) into a PNG
//!
//! # Environment Variables
//!
//! - `PUZZLE_HOST` - Server bind address (default: 0.0.0.0)
//! - `PUZZLE_PORT` - Server port (default: 8080)
//! - `PUZZLE_DATA_DIR` - Root of the tile store and catalog (default: images)
//! - `PUZZLE_TILE_SIZE` - Tile edge length in pixels (default: 512)
//! - `PUZZLE_JPEG_QUALITY` - Preview JPEG quality (default: 80)
//! - `PUZZLE_MAX_GRID_CELLS` - Max rows and max columns of a grid (default: 64)
//! - `PUZZLE_MAX_CANVAS_PIXELS` - Max canvas area (default: 8192 * 8192)
//! - `PUZZLE_MAX_UPLOAD_BYTES` - Request body limit (default: 10 MiB)
//! - `PUZZLE_CACHE_TILES` - Tile cache size in bytes (default: 64 MiB)
//! - `PUZZLE_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::grid::{CanvasLimits, DEFAULT_MAX_CANVAS_PIXELS, DEFAULT_MAX_GRID_CELLS, DEFAULT_TILE_SIZE};
use crate::puzzle::codec::{self, DEFAULT_JPEG_QUALITY};
use crate::puzzle::ServiceSettings;
use crate::server::DEFAULT_MAX_UPLOAD_BYTES;
use crate::store::DEFAULT_TILE_CACHE_CAPACITY;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = "images";

/// Default output file of the `export` command.
pub const DEFAULT_EXPORT_OUTPUT: &str = "puzzle.png";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Tile Puzzler - slices images into puzzle tiles and composes them back.
#[derive(Parser, Debug, Clone)]
#[command(name = "tile-puzzler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeConfig),

    /// Slice a local image into a new puzzle
    Slice(SliceConfig),

    /// Compose a placement map into a PNG file
    Export(ExportConfig),
}

// =============================================================================
// Engine Options
// =============================================================================

/// Options shared by every subcommand that touches puzzle data.
#[derive(Args, Debug, Clone)]
pub struct EngineOptions {
    /// Root directory of the tile store and the catalog.
    #[arg(long, default_value = DEFAULT_DATA_DIR, env = "PUZZLE_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Tile edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "PUZZLE_TILE_SIZE")]
    pub tile_size: u32,

    /// JPEG quality of the preview image (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "PUZZLE_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// Maximum number of rows, and of columns, in any grid.
    #[arg(long, default_value_t = DEFAULT_MAX_GRID_CELLS, env = "PUZZLE_MAX_GRID_CELLS")]
    pub max_grid_cells: u32,

    /// Maximum area in pixels of a resized image or exported canvas.
    #[arg(long, default_value_t = DEFAULT_MAX_CANVAS_PIXELS, env = "PUZZLE_MAX_CANVAS_PIXELS")]
    pub max_canvas_pixels: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            tile_size: DEFAULT_TILE_SIZE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_grid_cells: DEFAULT_MAX_GRID_CELLS,
            max_canvas_pixels: DEFAULT_MAX_CANVAS_PIXELS,
        }
    }
}

impl EngineOptions {
    /// Validate the options and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.data_dir.as_os_str().is_empty() {
            return Err("data_dir must not be empty".to_string());
        }

        if self.tile_size == 0 {
            return Err("tile_size must be greater than 0".to_string());
        }

        if !codec::is_valid_quality(self.jpeg_quality) {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }

        if self.max_grid_cells == 0 {
            return Err("max_grid_cells must be greater than 0".to_string());
        }

        let tile_area = self.tile_size as u64 * self.tile_size as u64;
        if self.max_canvas_pixels < tile_area {
            return Err(format!(
                "max_canvas_pixels ({}) must fit at least one {}x{} tile",
                self.max_canvas_pixels, self.tile_size, self.tile_size
            ));
        }

        Ok(())
    }

    pub fn limits(&self) -> CanvasLimits {
        CanvasLimits {
            max_grid_cells: self.max_grid_cells,
            max_canvas_pixels: self.max_canvas_pixels,
        }
    }

    pub fn settings(&self) -> ServiceSettings {
        ServiceSettings {
            tile_size: self.tile_size,
            limits: self.limits(),
            preview_quality: self.jpeg_quality,
        }
    }
}

// =============================================================================
// Serve Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "PUZZLE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PUZZLE_PORT")]
    pub port: u16,

    #[command(flatten)]
    pub engine: EngineOptions,

    /// Maximum request body size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "PUZZLE_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,

    /// Tile cache size in bytes (0 disables the cache).
    #[arg(long, default_value_t = DEFAULT_TILE_CACHE_CAPACITY, env = "PUZZLE_CACHE_TILES")]
    pub cache_tiles: usize,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "PUZZLE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("host must not be empty".to_string());
        }

        self.engine.validate()?;

        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Slice Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct SliceConfig {
    /// Source image file.
    pub image: PathBuf,

    /// Display name of the puzzle.
    #[arg(short, long)]
    pub name: String,

    /// Number of tile columns.
    #[arg(short, long)]
    pub columns: u32,

    #[command(flatten)]
    pub engine: EngineOptions,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl SliceConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }

        if self.columns == 0 {
            return Err("columns must be greater than 0".to_string());
        }

        self.engine.validate()
    }
}

// =============================================================================
// Export Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ExportConfig {
    /// Folder identifier of the puzzle.
    pub folder: String,

    /// JSON file mapping "row,col" keys to tile file names.
    #[arg(long, conflicts_with = "solution")]
    pub placements: Option<PathBuf>,

    /// Export the stored canonical solution instead of a placements file.
    #[arg(long, default_value_t = false)]
    pub solution: bool,

    /// Output PNG file.
    #[arg(short, long, default_value = DEFAULT_EXPORT_OUTPUT)]
    pub output: PathBuf,

    #[command(flatten)]
    pub engine: EngineOptions,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), String> {
        match (&self.placements, self.solution) {
            (None, false) => {
                return Err("either --placements <file> or --solution is required".to_string())
            }
            (Some(_), true) => {
                return Err("--placements and --solution are mutually exclusive".to_string())
            }
            _ => {}
        }

        self.engine.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
