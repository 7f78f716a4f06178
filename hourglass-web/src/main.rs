//! Hourglass web service - Main entry point
//!
//! Study planning and time tracking over HTTP: SQLite as the source of
//! truth with an optional spreadsheet mirror exported in the background.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hourglass_common::config;
use hourglass_common::db::init::init_database;
use hourglass_web::sheets::{spawn_syncer, SheetsClient, SyncHandle};
use hourglass_web::{build_router, AppState};

/// Command-line arguments for hourglass-web
#[derive(Parser, Debug)]
#[command(name = "hourglass-web")]
#[command(about = "Study planner and time tracker web service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "HOURGLASS_PORT")]
    port: Option<u16>,

    /// Root folder holding the database
    #[arg(short, long, env = "HOURGLASS_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hourglass_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting Hourglass v{}", env!("CARGO_PKG_VERSION"));

    let app_config = config::load_app_config();
    let port = args.port.unwrap_or(app_config.server.port);

    let root_folder =
        config::resolve_root_folder(args.root_folder.as_deref(), "HOURGLASS_ROOT_FOLDER");
    let db_path = config::prepare_root_folder(&root_folder)
        .context("Failed to prepare root folder")?;
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    // Spreadsheet mirror is optional; a misconfiguration disables it but
    // never blocks startup
    let sheets = match SheetsClient::from_config(&app_config.sheets) {
        Ok(Some(client)) => {
            info!(
                "Spreadsheet mirror enabled (spreadsheet {})",
                app_config.sheets.spreadsheet_id
            );
            spawn_syncer(
                pool.clone(),
                client,
                Duration::from_secs(app_config.sheets.sync_interval_secs),
            )
        }
        Ok(None) => {
            info!("Spreadsheet mirror disabled");
            SyncHandle::disabled()
        }
        Err(e) => {
            warn!("Spreadsheet mirror unavailable: {}", e);
            SyncHandle::disabled()
        }
    };

    let state = AppState::new(pool, sheets);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("hourglass-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

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
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
