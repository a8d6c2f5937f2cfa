//! Mimic3D - Headless Avatar Rig Service
//!
//! Main entry point for the CLI application.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mimic3d::{
    avatar::AssetManager, config::Config, error::WebError, web::WebServer, AppState,
};

/// Mimic3D - Headless avatar rig service with a TTS proxy
#[derive(Parser, Debug)]
#[command(name = "mimic3d", version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Assets directory (overrides config)
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable HTTP server
    #[arg(long)]
    no_http: bool,

    /// HTTP server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting {} v{}", mimic3d::NAME, mimic3d::VERSION);

    let state = setup_and_spawn_services(&args).await?;

    shutdown_signal().await;
    info!("Shutdown signal received");
    state.shutdown();

    // Give tasks a moment to clean up
    tokio::time::sleep(Duration::from_millis(500)).await;

    info!("Mimic3D stopped");
    Ok(())
}

/// Setup config, create AppState, and spawn all background services.
async fn setup_and_spawn_services(args: &Args) -> anyhow::Result<Arc<AppState>> {
    // Load configuration
    let mut config = if let Some(ref path) = args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    // Apply CLI overrides
    if let Some(ref assets) = args.assets {
        config.avatar.assets_dir = assets.clone();
    }
    if args.no_http {
        config.http.enabled = false;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }

    config.validate()?;

    info!("Assets: {}", config.avatar.assets_dir.display());
    info!("Frame rate: {} fps", config.avatar.frame_rate);
    info!("TTS proxy: {}", config.tts.enabled);
    info!("HTTP server: {}", config.http.enabled);

    let state = AppState::new(config.clone())?;

    // Load the model and clips in the background; commands are ignored
    // until they report in
    let assets = AssetManager::new(&config.avatar);
    let load_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = assets.load_into(&load_state.controller).await {
            error!("Failed to load avatar: {}", e);
        }
    });

    let frame_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = run_frame_loop(frame_state).await {
            error!("Frame loop error: {}", e);
        }
    });

    if config.http.enabled {
        let http_state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = run_http_server(http_state).await {
                error!("HTTP server error: {}", e);
            }
        });
    }

    Ok(state)
}

/// Advance the avatar once per frame and publish the snapshot
async fn run_frame_loop(state: Arc<AppState>) -> anyhow::Result<()> {
    let frame_rate = state.config.read().await.avatar.frame_rate.max(1);
    let mut shutdown_rx = state.subscribe_shutdown();

    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(frame_rate)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Frame loop started at {} fps", frame_rate);
    let mut last = Instant::now();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Instant::now();
                let dt = now.duration_since(last).as_secs_f32();
                last = now;
                state.tick(dt).await;
            }
            _ = shutdown_rx.recv() => {
                info!("Frame loop shutting down");
                return Ok(());
            }
        }
    }
}

async fn run_http_server(state: Arc<AppState>) -> anyhow::Result<()> {
    let http_config = state.config.read().await.http.clone();

    let web_server = WebServer::new(Arc::clone(&state), &http_config);

    let addr = format!("{}:{}", http_config.host, http_config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| WebError::Bind(format!("{}: {}", addr, e)))?;
    info!("HTTP server listening on {}", addr);

    let mut shutdown_rx = state.subscribe_shutdown();

    axum::serve(listener, web_server.router())
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

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
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
