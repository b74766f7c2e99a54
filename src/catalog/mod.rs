//! Persisted catalog of known puzzles.
//!
//! The catalog is a single JSON document:
//!
//! ```json
//! {
//!   "images": [
//!     {"name": "Sunset", "folder": "sunset", "rows": 3, "cols": 4, "tl": "image_0000.png"}
//!   ]
//! }
//! ```
//!
//! [`Catalog`] owns exclusive access to the document. Every read-modify-write
//! cycle runs under its internal lock, so concurrent appends never lose
//! updates. Callers only see [`Catalog::append`] and [`Catalog::list`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::CatalogError;

/// Default catalog document name inside the data root.
pub const CATALOG_FILE: &str = "imageIndex.json";

/// Summary of one sliced puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display name as supplied by the uploader
    pub name: String,

    /// Folder identifier of the puzzle's namespace
    pub folder: String,

    pub rows: u32,
    pub cols: u32,

    /// Tile that belongs in the top-left cell
    #[serde(rename = "tl")]
    pub top_left: String,
}

/// The whole catalog document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub images: Vec<CatalogEntry>,
}

/// Catalog service backed by a JSON file.
pub struct Catalog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Catalog {
    /// Catalog stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Catalog stored as [`CATALOG_FILE`] inside `root`.
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join(CATALOG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry and persist the document.
    ///
    /// A missing document counts as empty. Any other read or parse failure
    /// aborts the append and leaves the document untouched.
    pub async fn append(&self, entry: CatalogEntry) -> Result<usize, CatalogError> {
        let _guard = self.lock.lock().await;

        let mut document = self.read_document().await?;
        info!(
            name = %entry.name,
            folder = %entry.folder,
            rows = entry.rows,
            cols = entry.cols,
            "Adding puzzle to catalog"
        );
        document.images.push(entry);
        self.write_document(&document).await?;

        Ok(document.images.len())
    }

    /// Current catalog contents.
    pub async fn list(&self) -> Result<CatalogDocument, CatalogError> {
        let _guard = self.lock.lock().await;
        self.read_document().await
    }

    async fn read_document(&self) -> Result<CatalogDocument, CatalogError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Catalog absent, starting empty");
                return Ok(CatalogDocument::default());
            }
            Err(e) => {
                return Err(CatalogError::Read {
                    path: self.path.display().to_string(),
                    message: e.to_string(),
                })
            }
        };

        if data.is_empty() {
            return Ok(CatalogDocument::default());
        }

        serde_json::from_slice(&data).map_err(|e| CatalogError::Parse {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    async fn write_document(&self, document: &CatalogDocument) -> Result<(), CatalogError> {
        let write_err = |e: String| CatalogError::Write {
            path: self.path.display().to_string(),
            message: e,
        };

        let data = serde_json::to_vec_pretty(document).map_err(|e| write_err(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| write_err(e.to_string()))?;
            }
        }

        // Write beside the target and rename over it
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &data)
            .await
            .map_err(|e| write_err(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| write_err(e.to_string()))?;

        Ok(())
    }
}
