//! Tile Puzzler - slices images into puzzle tiles and composes them back.
//!
//! This binary starts the HTTP server or runs one offline command.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tile_puzzler::{
    catalog::Catalog,
    config::{Cli, Command, EngineOptions, ExportConfig, ServeConfig, SliceConfig},
    puzzle::{PlacementMap, PuzzleService},
    server::{create_router, RouterConfig},
    store::{CachingTileStore, FsTileStore},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Slice(config) => run_slice(config).await,
        Command::Export(config) => run_export(config).await,
    }
}

/// Build a service over the on-disk store rooted at the data directory.
fn disk_service(engine: &EngineOptions) -> PuzzleService<FsTileStore> {
    PuzzleService::with_settings(
        FsTileStore::new(&engine.data_dir),
        Catalog::in_dir(&engine.data_dir),
        engine.settings(),
    )
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    print_banner();

    let engine = &config.engine;
    info!("Configuration:");
    info!("  Data dir: {}", engine.data_dir.display());
    info!("  Tile size: {}px", engine.tile_size);
    info!("  Preview quality: {}", engine.jpeg_quality);
    info!(
        "  Limits: {} cells per axis, {} pixels per canvas",
        engine.max_grid_cells, engine.max_canvas_pixels
    );
    info!("  Max upload: {}KB", config.max_upload_bytes / 1024);

    if let Err(e) = tokio::fs::create_dir_all(&engine.data_dir).await {
        error!(
            "Failed to create data dir {}: {}",
            engine.data_dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let catalog = Catalog::in_dir(&engine.data_dir);
    match catalog.list().await {
        Ok(document) => info!("  Catalog: {} puzzle(s)", document.images.len()),
        Err(e) => warn!("  Catalog unreadable, uploads will fail until fixed: {}", e),
    }

    let router_config = build_router_config(&config);
    let store = FsTileStore::new(&engine.data_dir);

    let router = if config.cache_tiles > 0 {
        info!("  Tile cache: {}MB", config.cache_tiles / (1024 * 1024));
        let store = CachingTileStore::with_capacity(store, config.cache_tiles);
        create_router(
            PuzzleService::with_settings(store, catalog, engine.settings()),
            router_config,
        )
    } else {
        info!("  Tile cache: disabled");
        create_router(
            PuzzleService::with_settings(store, catalog, engine.settings()),
            router_config,
        )
    };

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/puzzles", addr);
    info!(
        "    curl -F name=Sunset -F columns=4 -F image=@photo.jpg http://{}/uploadPuzzle",
        addr
    );
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Print the startup banner.
fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    info!("");
    info!("╔╦╗╦╦  ╔═╗  ╔═╗╦ ╦╔═╗╔═╗╦  ╔═╗╦═╗");
    info!(" ║ ║║  ║╣   ╠═╝║ ║╔═╝╔═╝║  ║╣ ╠╦╝");
    info!(" ╩ ╩╩═╝╚═╝  ╩  ╚═╝╚═╝╚═╝╩═╝╚═╝╩╚═");
    info!("");
    info!("                         v{}", version);
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tile_puzzler=debug,tower_http=debug"
    } else {
        "tile_puzzler=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_static_dir(&config.engine.data_dir)
        .with_max_upload_bytes(config.max_upload_bytes)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

// =============================================================================
// Slice Command
// =============================================================================

async fn run_slice(config: SliceConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let image = match tokio::fs::read(&config.image).await {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to read {}: {}", config.image.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let service = disk_service(&config.engine);
    let created = match service
        .create_puzzle(&config.name, config.columns, &image)
        .await
    {
        Ok(created) => created,
        Err(e) => {
            error!("Slicing failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let summary = serde_json::json!({
        "status": "ok",
        "folder": created.entry.folder,
        "rows": created.entry.rows,
        "cols": created.entry.cols,
        "pieces": created.outcome.manifest.len(),
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Failed to render summary: {}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Export Command
// =============================================================================

async fn run_export(config: ExportConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let service = disk_service(&config.engine);

    let placements = match &config.placements {
        Some(path) => match read_placements(path).await {
            Ok(placements) => placements,
            Err(e) => {
                error!("Failed to load placements from {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => match service.solution(&config.folder).await {
            Ok(placements) => placements,
            Err(e) => {
                error!("Failed to load solution of {}: {}", config.folder, e);
                return ExitCode::FAILURE;
            }
        },
    };

    let composition = match service.export(&config.folder, &placements).await {
        Ok(composition) => composition,
        Err(e) => {
            error!("Export failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for skipped in &composition.skipped {
        warn!(
            "Skipped {} at {}: {}",
            skipped.file, skipped.cell, skipped.reason
        );
    }

    let png = match composition.to_png() {
        Ok(png) => png,
        Err(e) => {
            error!("Encoding failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::fs::write(&config.output, &png).await {
        error!("Failed to write {}: {}", config.output.display(), e);
        return ExitCode::FAILURE;
    }

    info!(
        "Wrote {} ({}x{}, {} tile(s) skipped)",
        config.output.display(),
        composition.image.width(),
        composition.image.height(),
        composition.skipped.len()
    );

    ExitCode::SUCCESS
}

/// Read a `{"row,col": file}` JSON document.
async fn read_placements(path: &std::path::Path) -> Result<PlacementMap, String> {
    let data = tokio::fs::read(path).await.map_err(|e| e.to_string())?;
    serde_json::from_slice(&data).map_err(|e| e.to_string())
}
