use thiserror::Error;

/// Errors raised by a tile store while reading or writing puzzle artifacts.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Artifact does not exist in the store
    #[error("Artifact not found: {0}")]
    NotFound(String),

    /// Underlying read or write failed (permissions, disk full, ...)
    #[error("Storage I/O error at {path}: {message}")]
    Io { path: String, message: String },

    /// Artifact name is not a single safe path component
    #[error("Invalid artifact name: {0:?}")]
    InvalidKey(String),
}

impl StoreError {
    /// Build an I/O error from a `std::io::Error`, mapping `NotFound` to its own variant.
    pub fn from_io(path: impl Into<String>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound(path)
        } else {
            StoreError::Io {
                path,
                message: err.to_string(),
            }
        }
    }
}

/// Errors from the persisted puzzle catalog.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// Existing document could not be read
    #[error("Failed to read catalog {path}: {message}")]
    Read { path: String, message: String },

    /// Existing document is not a valid catalog
    #[error("Malformed catalog {path}: {message}")]
    Parse { path: String, message: String },

    /// Updated document could not be written
    #[error("Failed to write catalog {path}: {message}")]
    Write { path: String, message: String },
}

/// Errors from slicing, composing, and the puzzle service.
#[derive(Debug, Clone, Error)]
pub enum PuzzleError {
    /// Source bytes are not a decodable raster image
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// Raster encoding failed
    #[error("Failed to encode image: {message}")]
    Encode { message: String },

    /// Column count is zero, negative, or not a number
    #[error("Invalid number of columns: {value}")]
    InvalidColumns { value: String },

    /// Geometry with a zero dimension
    #[error("Invalid grid dimensions: {width}x{height} with tile size {tile_size}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        tile_size: u32,
    },

    /// Puzzle name or folder does not map to a usable folder identifier
    #[error("Invalid puzzle name: {name:?}")]
    InvalidName { name: String },

    /// Required request field was absent or empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Request payload could not be parsed
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Placement map has no entries
    #[error("Placement map is empty")]
    EmptyPlacements,

    /// Requested canvas exceeds the configured bounds
    #[error("Canvas {width}x{height} ({rows} rows, {cols} cols) exceeds configured limits")]
    CanvasTooLarge {
        width: u64,
        height: u64,
        rows: u64,
        cols: u64,
    },

    /// Stored manifest could not be parsed
    #[error("Corrupt manifest: {message}")]
    CorruptManifest { message: String },

    /// Tile store failure
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Catalog failure
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl PuzzleError {
    /// Whether the error was caused by the caller's input rather than the server.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PuzzleError::Decode { .. }
                | PuzzleError::InvalidColumns { .. }
                | PuzzleError::InvalidDimensions { .. }
                | PuzzleError::InvalidName { .. }
                | PuzzleError::MissingField(_)
                | PuzzleError::InvalidRequest { .. }
                | PuzzleError::EmptyPlacements
                | PuzzleError::CanvasTooLarge { .. }
                | PuzzleError::Store(StoreError::InvalidKey(_))
        )
    }
}
