//! Slicing tests.
//!
//! Tests verify:
//! - Resize geometry and clipped bottom row
//! - Tile naming and on-disk layout
//! - Limits on degenerate aspect ratios
//! - Behavior when the store fails partway through

use tile_puzzler::catalog::{Catalog, CATALOG_FILE};
use tile_puzzler::error::{PuzzleError, StoreError};
use tile_puzzler::grid::{CanvasLimits, Cell};
use tile_puzzler::puzzle::{Manifest, PuzzleId, PuzzleService, ServiceSettings, Slicer};
use tile_puzzler::store::{Artifact, FsTileStore, MemoryTileStore, TileStore};

use super::test_utils::{
    decode_rgba, gradient_jpeg, gradient_png, is_valid_jpeg, is_valid_png, FailingStore,
};

fn small_tiles() -> ServiceSettings {
    ServiceSettings {
        tile_size: 16,
        ..ServiceSettings::default()
    }
}

// =============================================================================
// Geometry
// =============================================================================

#[tokio::test]
async fn test_landscape_photo_into_four_columns() {
    let store = MemoryTileStore::new();
    let puzzle = PuzzleId::parse("landscape").unwrap();

    let outcome = Slicer::new(512)
        .slice(&store, &puzzle, &gradient_png(1800, 1200), 4)
        .await
        .unwrap();

    assert_eq!(outcome.geometry.width(), 2048);
    assert_eq!(outcome.geometry.height(), 1365);
    assert_eq!((outcome.rows(), outcome.cols()), (3, 4));
    assert_eq!(outcome.manifest.len(), 12);

    let bottom_right = &outcome.manifest.solution[&Cell::new(2, 3)];
    assert_eq!(bottom_right, "image_0011.png");
    let tile = decode_rgba(&store.load_tile(&puzzle, bottom_right).await.unwrap());
    assert_eq!(tile.dimensions(), (512, 341));

    let top_left = decode_rgba(&store.load_tile(&puzzle, "image_0000.png").await.unwrap());
    assert_eq!(top_left.dimensions(), (512, 512));
}

#[tokio::test]
async fn test_tiny_image_upscaled_to_one_row() {
    let store = MemoryTileStore::new();
    let puzzle = PuzzleId::parse("tiny").unwrap();

    // 32 wide, round(32 / 3) = 11 high
    let outcome = Slicer::new(16)
        .slice(&store, &puzzle, &gradient_png(3, 1), 2)
        .await
        .unwrap();

    assert_eq!(outcome.geometry.height(), 11);
    assert_eq!((outcome.rows(), outcome.cols()), (1, 2));
    assert_eq!(store.tile_names(&puzzle).await.len(), 2);
}

#[tokio::test]
async fn test_jpeg_source_is_accepted() {
    let store = MemoryTileStore::new();
    let puzzle = PuzzleId::parse("from_jpeg").unwrap();

    let outcome = Slicer::new(16)
        .slice(&store, &puzzle, &gradient_jpeg(40, 40), 2)
        .await
        .unwrap();

    assert_eq!((outcome.rows(), outcome.cols()), (2, 2));
}

#[tokio::test]
async fn test_extreme_aspect_ratio_rejected_by_limits() {
    let store = MemoryTileStore::new();
    let puzzle = PuzzleId::parse("needle").unwrap();

    // 1 column of 16px on a 10x1000 image -> 1600 high -> 100 rows
    let result = Slicer::new(16)
        .slice(&store, &puzzle, &gradient_png(10, 1000), 1)
        .await;

    assert!(matches!(result, Err(PuzzleError::CanvasTooLarge { rows: 100, .. })));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_custom_limits_allow_larger_grids() {
    let store = MemoryTileStore::new();
    let puzzle = PuzzleId::parse("needle").unwrap();

    let outcome = Slicer::new(16)
        .with_limits(CanvasLimits::unbounded())
        .slice(&store, &puzzle, &gradient_png(10, 1000), 1)
        .await
        .unwrap();

    assert_eq!(outcome.rows(), 100);
}

// =============================================================================
// Persisted Layout
// =============================================================================

#[tokio::test]
async fn test_disk_layout_after_upload() {
    let dir = tempfile::tempdir().unwrap();
    let service = PuzzleService::with_settings(
        FsTileStore::new(dir.path()),
        Catalog::in_dir(dir.path()),
        small_tiles(),
    );

    let created = service
        .create_puzzle("Mountain Lake", 3, &gradient_png(60, 40))
        .await
        .unwrap();
    assert_eq!(created.entry.folder, "mountain__lake");

    let root = dir.path().join("mountain__lake");
    let preview = std::fs::read(root.join("index.jpg")).unwrap();
    assert!(is_valid_jpeg(&preview));

    for index in 0..6 {
        let path = root.join("pieces").join(format!("image_{:04}.png", index));
        let data = std::fs::read(&path).unwrap();
        assert!(is_valid_png(&data), "{} is not a PNG", path.display());
    }
    assert!(!root.join("pieces").join("image_0006.png").exists());

    let manifest = Manifest::from_json(&std::fs::read(root.join("manifest.json")).unwrap()).unwrap();
    assert_eq!(manifest.pieces.len(), 6);
    assert_eq!(manifest.solution[&Cell::new(1, 2)], "image_0005.png");

    let catalog: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join(CATALOG_FILE)).unwrap()).unwrap();
    assert_eq!(catalog["images"][0]["folder"], "mountain__lake");
    assert_eq!(catalog["images"][0]["tl"], "image_0000.png");
}

#[tokio::test]
async fn test_reupload_replaces_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let service = PuzzleService::with_settings(
        FsTileStore::new(dir.path()),
        Catalog::in_dir(dir.path()),
        small_tiles(),
    );

    service
        .create_puzzle("again", 4, &gradient_png(64, 64))
        .await
        .unwrap();
    let second = service
        .create_puzzle("again", 2, &gradient_png(64, 64))
        .await
        .unwrap();

    let manifest = service.manifest("again").await.unwrap();
    assert_eq!(manifest, second.outcome.manifest);
    assert_eq!(manifest.len(), 4);

    // Both uploads are recorded
    assert_eq!(service.list_puzzles().await.unwrap().images.len(), 2);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_store_failure_leaves_partial_tiles_and_no_manifest() {
    let dir = tempfile::tempdir().unwrap();
    // Preview plus two tiles succeed, the third tile fails
    let store = FailingStore::after_puts(MemoryTileStore::new(), 3);
    let service = PuzzleService::with_settings(store, Catalog::in_dir(dir.path()), small_tiles());

    let result = service
        .create_puzzle("flaky", 3, &gradient_png(48, 32))
        .await;
    assert!(matches!(
        result,
        Err(PuzzleError::Store(StoreError::Io { .. }))
    ));

    let puzzle = PuzzleId::parse("flaky").unwrap();
    let inner = service.store().inner();
    assert_eq!(inner.tile_names(&puzzle).await.len(), 2);
    assert!(inner.get(&puzzle, &Artifact::Preview).await.is_ok());
    assert!(matches!(
        inner.get(&puzzle, &Artifact::Manifest).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(service.list_puzzles().await.unwrap().images.is_empty());
}
