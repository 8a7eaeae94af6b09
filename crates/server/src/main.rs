use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipmill_core::{
    load_config, validate_config, Config, FfmpegInvoker, Invoker, SessionReaper, SessionRunner,
    StatusTracker,
};

use clipmill_server::{create_router, AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("clipmill {}", VERSION);

    // Determine config path
    let config_path = std::env::var("CLIPMILL_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration; a missing file means defaults, matching a
    // zero-config standalone run.
    let config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!("No config file at {:?}, using defaults", config_path);
        Config::default()
    };

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;
    info!("Sessions directory: {:?}", config.server.sessions_dir);

    // Ensure sessions directory exists
    tokio::fs::create_dir_all(&config.server.sessions_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create sessions directory {:?}",
                config.server.sessions_dir
            )
        })?;

    // Create and validate the transcoder invoker
    let invoker = Arc::new(FfmpegInvoker::new(config.invoker.clone()));
    invoker
        .validate()
        .await
        .context("Transcoder validation failed")?;
    info!("Transcoder validated: {}", invoker.name());

    // Create session tracker and runner
    let tracker = StatusTracker::new();
    let runner = SessionRunner::new(
        invoker,
        config.segmenter.clone(),
        config.gif.clone(),
        tracker.clone(),
    );

    // Start the session reaper
    let reaper = SessionReaper::new(
        config.reaper.clone(),
        config.server.sessions_dir.clone(),
        tracker,
    );
    reaper.start();

    // Create shared state and router
    let state = Arc::new(AppState::new(config.clone(), runner));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    reaper.stop();

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
