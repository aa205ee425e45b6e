//! SpaceZoom - tiles, region detection and annotations for space imagery.
//!
//! This binary starts the HTTP server and runs the maintenance commands.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spacezoom::{
    catalog::{seed_catalog, SqliteCatalog},
    config::{AnalyzeConfig, Cli, Command, SeedConfig, ServeConfig},
    detect::{AnalysisService, RegionDetector},
    server::{create_router, AnalyzeResponse, AppState, RouterConfig},
    source::LocalImageSource,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Seed(config) => run_seed(config).await,
        Command::Analyze(config) => run_analyze(config).await,
    }
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

    let detector_config = config.detector.detector_config();

    info!("Configuration:");
    info!("  Images: {}", config.image_dir.display());
    info!("  Tiles: {}", config.tile_dir.display());
    info!("  Catalog: {}", config.database.display());
    info!(
        "  Analysis: {} worker(s), {}s timeout, max {} regions",
        config.analysis_workers, config.analysis_timeout_secs, detector_config.max_regions
    );
    info!(
        "  Detector: bright > {}, canny {}..{}, weights {}/{}",
        detector_config.bright_threshold,
        detector_config.edge_low,
        detector_config.edge_high,
        detector_config.bright_weight,
        detector_config.edge_weight
    );

    let catalog = match SqliteCatalog::open(&config.database).await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to open catalog: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let source = Arc::new(LocalImageSource::new(&config.image_dir, &config.tile_dir));
    let analysis = AnalysisService::new(Arc::clone(&source), RegionDetector::new(detector_config))
        .with_workers(config.analysis_workers)
        .with_timeout(config.analysis_timeout());

    let state = AppState::new(source, analysis, Arc::new(catalog));
    let router = create_router(state, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/images", addr);
    info!("    curl http://{}/tiles/<image>/0/0.jpg", addr);
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
    info!("  ___                  _____                ");
    info!(" / __|_ __  __ _ __ __|_  / ___  ___  _ __  ");
    info!(" \\__ \\ '_ \\/ _` / _/ -_)/ / / _ \\/ _ \\| '  \\ ");
    info!(" |___/ .__/\\__,_\\__\\___/___|\\___/\\___/|_|_|_|");
    info!("     |_|                                     ");
    info!("");
    info!("                                       v{}", version);
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "spacezoom=debug,tower_http=debug"
    } else {
        "spacezoom=info,tower_http=info"
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
        .with_cache_max_age(config.cache_max_age)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

// =============================================================================
// Seed Command
// =============================================================================

async fn run_seed(config: SeedConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let catalog = match SqliteCatalog::open(&config.database).await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to open catalog: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match seed_catalog(&catalog, &config.image_dir).await {
        Ok(report) => {
            info!(
                "Seeded catalog: {} registered, {} already present, {} unreadable",
                report.registered.len(),
                report.skipped.len(),
                report.unreadable.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Seeding failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Analyze Command
// =============================================================================

async fn run_analyze(config: AnalyzeConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let bytes = match tokio::fs::read(&config.file).await {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", config.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let detector = RegionDetector::new(config.detector.detector_config());
    let detection = match tokio::task::spawn_blocking(move || detector.detect(&bytes)).await {
        Ok(Ok(detection)) => detection,
        Ok(Err(e)) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: analysis worker failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let response = AnalyzeResponse {
        features_found: detection.count,
        regions: detection.regions,
    };

    match serde_json::to_string_pretty(&response) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
