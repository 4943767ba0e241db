//! Onboard media player (omp-player) - Main entry point
//!
//! Wires the catalog, the built-in clock element and the playback engine
//! together and serves the HTTP/SSE control surface.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use omp_player::api;
use omp_player::catalog::{CatalogProvider, StaticCatalog};
use omp_player::history::sink_from_config;
use omp_player::playback::{ClockElement, DurationResolver, Player};
use omp_player::PlayerConfig;

/// Command-line arguments for omp-player
#[derive(Parser, Debug)]
#[command(name = "omp-player")]
#[command(about = "Onboard media playback service")]
#[command(version)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "OMP_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "OMP_PORT")]
    port: Option<u16>,

    /// JSON catalog file (overrides the config file)
    #[arg(long, env = "OMP_CATALOG")]
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "omp_player=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    let mut config =
        PlayerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(catalog_path) = args.catalog {
        config.catalog_path = Some(catalog_path);
    }

    info!("Starting OMP player on port {}", config.port);

    // Catalog: JSON file when configured, built-in demo set otherwise
    let catalog = match &config.catalog_path {
        Some(path) => {
            let catalog = StaticCatalog::from_file(path).context("Failed to load catalog")?;
            info!(
                "Loaded catalog with {} items from {}",
                catalog.len(),
                path.display()
            );
            catalog
        }
        None => {
            info!("No catalog configured, using built-in demo catalog");
            StaticCatalog::demo()
        }
    };
    let catalog = Arc::new(catalog);

    // Headless clock element; item durations resolve through the catalog
    let resolver_catalog = Arc::clone(&catalog);
    let resolver: DurationResolver =
        Arc::new(move |url: &str| resolver_catalog.duration_for_url(url));
    let element = ClockElement::new(resolver, config.element_tick());

    let sink = sink_from_config(config.history_endpoint.as_deref());
    let player = Player::launch(&config, Box::new(element), sink);
    info!("Playback engine launched");

    // Build the application router
    let provider: Arc<dyn CatalogProvider> = catalog;
    let app_state = api::AppState {
        player,
        catalog: provider,
        port: config.port,
    };
    let app = api::create_router(app_state);

    // Create socket address
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .context("Invalid bind address")?;

    info!("Starting HTTP server on {}", addr);

    // Create and run the server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
