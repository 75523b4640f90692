//! tunebin-api - song catalog service with recycle bin
//!
//! Startup order: configuration, logging, root folder, catalog store, file
//! store, HTTP server. The catalog store is closed after graceful shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tunebin_api::files::FileStore;
use tunebin_api::genre::StubGenreClassifier;
use tunebin_api::{build_router, AppState};
use tunebin_common::config::{Overrides, ServiceConfig, TomlConfig};
use tunebin_common::CatalogStore;

/// Command-line arguments for tunebin-api
#[derive(Parser, Debug)]
#[command(name = "tunebin-api")]
#[command(about = "Song catalog service with recycle bin")]
#[command(version)]
struct Args {
    /// Port to listen on [default: 5000]
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Host to bind [default: 0.0.0.0]
    #[arg(long, env = "TUNEBIN_HOST")]
    host: Option<String>,

    /// Root folder for the catalog database and uploads
    /// (falls back to TUNEBIN_ROOT_FOLDER, the config file, then the platform default)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "TUNEBIN_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, config_source) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    let config = ServiceConfig::resolve(
        Overrides {
            root_folder: args.root_folder,
            host: args.host,
            port: args.port,
        },
        toml_config,
    );

    init_tracing(&config.log_level);
    config_source.log();

    info!(
        "Starting tunebin-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    config
        .root
        .ensure_exists()
        .context("Failed to initialize root folder")?;
    info!("Root folder: {}", config.root.path().display());

    let db_path = config.root.database_path();
    info!("Database: {}", db_path.display());
    let store = CatalogStore::open(&db_path)
        .await
        .context("Failed to open catalog database")?;

    let files = FileStore::new(config.root.uploads_dir(), config.max_upload_bytes as u64);
    files.init().await.context("Failed to initialize uploads directory")?;
    info!("Uploads: {}", files.dir().display());

    let classifier = Arc::new(StubGenreClassifier::new(config.genre_label.clone()));
    info!("Genre classifier: stub ({})", config.genre_label);

    let state = AppState::new(store.clone(), files, classifier);
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Server running on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error");

    store.close().await;
    info!("Server shutdown complete");
    served
}

/// Logging: RUST_LOG when set, otherwise the configured level for our crates
fn init_tracing(level: &str) {
    let default_filter = format!(
        "tunebin_api={level},tunebin_common={level},tower_http={level}",
        level = level
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
