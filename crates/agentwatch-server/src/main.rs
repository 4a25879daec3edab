//! agentwatch server - live activity presence for autonomous agent workers.

use agentwatch_core::spawn_ticker;
use agentwatch_server::{config, logging, routes, state};
use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use config::Config;
use logging::{LogConfig, LogFormat};
use state::AppState;

/// agentwatch server - derives a stable "current activity" signal from worker logs.
#[derive(Parser, Debug)]
#[command(name = "agentwatch-server")]
#[command(about = "HTTP/WebSocket server for live agent activity presence")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override port from config
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging (adds visibility transitions)
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace logging (includes per-line rule matches)
    #[arg(long)]
    trace: bool,

    /// Quiet mode (WARN and ERROR only)
    #[arg(short, long)]
    quiet: bool,

    /// Set log level for specific targets (e.g., "presence=debug" or "classifier=trace").
    /// Can be specified multiple times. Targets are prefixed with "agentwatch::" automatically.
    #[arg(long = "log", value_name = "TARGET=LEVEL")]
    log_overrides: Vec<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_cli(
        cli.verbose,
        cli.debug,
        cli.trace,
        cli.quiet,
        cli.log_overrides,
        cli.log_format,
    );
    logging::init(&log_config);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(port) = cli.port {
        config.port = port;
    }

    tracing::info!(
        target: "agentwatch::startup",
        "Loaded configuration (port: {}, idle timeout: {}ms, narrative: {}/{} chars)",
        config.port,
        config.presence.idle_timeout_ms,
        config.narrative.min_len,
        config.narrative.accept_len
    );

    let state = Arc::new(AppState::new(config.clone()));

    // Paused workers go hidden on elapsed time alone, so re-evaluate on a timer
    let ticker = spawn_ticker(state.registry.clone(), config.tick_interval());
    tracing::info!(
        target: "agentwatch::startup",
        "Started presence ticker ({}ms)",
        config.tick_interval().as_millis()
    );

    let app = routes::router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!(target: "agentwatch::startup", "Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ticker.shutdown().await;
    tracing::info!(target: "agentwatch::startup", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(target: "agentwatch::startup", "Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!(target: "agentwatch::startup", "Shutdown requested");
}
