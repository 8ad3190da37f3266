//! quoter-server - quote book backend
//!
//! Serves the v1 and v2 quote APIs, attachments, story pointers, the music
//! browser and the HTML quote view from one SQLite database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quoter_common::config::load_config;
use quoter_common::db::init_database;
use quoter_server::music::MusicContext;
use quoter_server::{build_router, AppState};

/// Command-line arguments for quoter-server
///
/// Flags override the config file, which overrides built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "quoter-server")]
#[command(about = "Quote book HTTP backend")]
#[command(version)]
struct Args {
    /// Path to quoter.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "QUOTER_BIND")]
    bind: Option<String>,

    /// SQLite database file
    #[arg(short, long, env = "QUOTER_DATABASE")]
    database: Option<PathBuf>,

    /// Music library root
    #[arg(short, long, env = "QUOTER_MUSIC_DIR")]
    music_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }
    if args.music_dir.is_some() {
        config.music_dir = args.music_dir;
    }

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting quoter-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    info!("Database: {}", config.database_path.display());
    let pool = init_database(&config.database_path)
        .await
        .context("Failed to open database")?;

    let music = match &config.music_dir {
        Some(dir) => match MusicContext::scan(dir) {
            Ok(context) => Some(context),
            Err(e) => {
                error!("Unable to initialize music context: {}", e);
                None
            }
        },
        None => {
            info!("No music_dir configured, music API disabled");
            None
        }
    };

    if config.access_key_sha256.is_none() {
        warn!("No access_key_sha256 configured, every write route will reject requests");
    }

    let state = AppState::new(pool, config.access_key_sha256.clone(), music);
    let app = build_router(state, config.static_dir.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("quoter-server listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
