//! Catalog tests.
//!
//! Tests verify:
//! - No lost updates under concurrent uploads
//! - Persistence across service instances
//! - A corrupt catalog fails the upload without touching the document

use std::sync::Arc;

use tile_puzzler::catalog::{Catalog, CATALOG_FILE};
use tile_puzzler::error::{CatalogError, PuzzleError};
use tile_puzzler::puzzle::{PuzzleService, ServiceSettings};
use tile_puzzler::store::{FsTileStore, MemoryTileStore};

use super::test_utils::gradient_png;

fn settings() -> ServiceSettings {
    ServiceSettings {
        tile_size: 8,
        ..ServiceSettings::default()
    }
}

#[tokio::test]
async fn test_concurrent_uploads_all_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(PuzzleService::with_settings(
        FsTileStore::new(dir.path()),
        Catalog::in_dir(dir.path()),
        settings(),
    ));

    let image = Arc::new(gradient_png(24, 16));
    let mut handles = Vec::new();
    for i in 0..12 {
        let service = Arc::clone(&service);
        let image = Arc::clone(&image);
        handles.push(tokio::spawn(async move {
            service
                .create_puzzle(&format!("puzzle {}", i), 3, &image)
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let document = service.list_puzzles().await.unwrap();
    assert_eq!(document.images.len(), 12);

    let mut folders: Vec<_> = document.images.iter().map(|e| e.folder.clone()).collect();
    folders.sort();
    folders.dedup();
    assert_eq!(folders.len(), 12);

    for folder in &folders {
        assert!(service.manifest(folder).await.is_ok(), "{} has no manifest", folder);
    }
}

#[tokio::test]
async fn test_catalog_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let service = PuzzleService::with_settings(
            MemoryTileStore::new(),
            Catalog::in_dir(dir.path()),
            settings(),
        );
        service
            .create_puzzle("First", 2, &gradient_png(16, 16))
            .await
            .unwrap();
    }

    let service = PuzzleService::with_settings(
        MemoryTileStore::new(),
        Catalog::in_dir(dir.path()),
        settings(),
    );
    service
        .create_puzzle("Second", 2, &gradient_png(16, 16))
        .await
        .unwrap();

    let names: Vec<_> = service
        .list_puzzles()
        .await
        .unwrap()
        .images
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["First", "Second"]);
}

#[tokio::test]
async fn test_corrupt_catalog_fails_upload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CATALOG_FILE);
    std::fs::write(&path, b"[1, 2").unwrap();

    let service = PuzzleService::with_settings(
        MemoryTileStore::new(),
        Catalog::in_dir(dir.path()),
        settings(),
    );

    let result = service
        .create_puzzle("Orphan", 2, &gradient_png(16, 16))
        .await;
    assert!(matches!(
        result,
        Err(PuzzleError::Catalog(CatalogError::Parse { .. }))
    ));
    assert_eq!(std::fs::read(&path).unwrap(), b"[1, 2");

    // Artifacts were written before the catalog update
    assert!(service.manifest("orphan").await.is_ok());
}
