//! herakles-paging-exporter - version 0.1.0
//!
//! Swap and paging metrics exporter with tracing logging.
//! This is the main entry point that initializes the server and handles subcommands.

mod cli;
mod commands;
mod config;
mod handlers;
mod metrics;
mod state;

use anyhow::Context;
use axum::{routing::get, Router};
use clap::{Parser, ValueEnum};
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info, Level};

use cli::{Args, Commands, LogLevel};
use commands::{command_check, command_config, command_scrape};
use config::{
    resolve_config, show_config, validate_effective_config, Config, DEFAULT_BIND_ADDR, DEFAULT_PORT,
};
use handlers::{health_handler, metrics_handler, root_handler};
use metrics::PagingMetrics;
use state::{build_scraper, AppState};

/// Resolves the log level: CLI > config file > info.
fn resolve_log_level(config: &Config, args: &Args) -> LogLevel {
    if let Some(level) = &args.log_level {
        return level.clone();
    }
    config
        .log_level
        .as_deref()
        .and_then(|s| LogLevel::from_str(s, true).ok())
        .unwrap_or(LogLevel::Info)
}

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::Off => return,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    info!("Logging initialized with level: {:?}", log_level);
}

/// Exits the process with error code 1 if validation fails.
fn ensure_valid_config(config: &Config) {
    if let Err(e) = validate_effective_config(config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
}

/// Resolves once SIGINT or SIGTERM has been received.
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
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args).map_err(|e| anyhow::anyhow!("{e}"))?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format).map_err(|e| anyhow::anyhow!("{e}"));
    }

    // Config generation does not depend on the effective configuration
    if let Some(Commands::Config {
        output,
        format,
        commented,
    }) = &args.command
    {
        return command_config(output.clone(), *format, *commented);
    }

    let config = resolve_config(&args).map_err(|e| anyhow::anyhow!("{e}"))?;
    setup_logging(resolve_log_level(&config, &args));

    match &args.command {
        Some(Commands::Check) => return command_check(&config),
        Some(Commands::Scrape {
            iterations,
            interval_ms,
            format,
        }) => {
            ensure_valid_config(&config);
            return command_scrape(*iterations, *interval_ms, *format, &config);
        }
        Some(Commands::Config { .. }) => unreachable!("Config handled above"),
        None => {}
    }

    ensure_valid_config(&config);

    info!("Starting herakles-paging-exporter");

    let bind_ip_str = config.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
    let port = config.port.unwrap_or(DEFAULT_PORT);

    let mut scraper = build_scraper(&config).context("failed to open paging source")?;

    // Without a boot time anchor no cumulative counter can be produced.
    scraper
        .start()
        .context("paging scraper failed to start")?;

    let registry = Registry::new();
    let metrics = PagingMetrics::new(&registry)?;
    if let Some(start_time) = scraper.start_time() {
        metrics
            .system_boot_time_seconds
            .set(start_time.as_unix_seconds() as f64);
    }
    debug!("All metrics registered successfully");

    let state = Arc::new(AppState::new(registry, metrics, scraper, config.clone()));

    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler));

    if config.enable_health.unwrap_or(true) {
        app = app.route("/health", get(health_handler));
    }

    let app = app.with_state(state);

    let listener = TcpListener::bind(addr).await?;
    info!(
        "herakles-paging-exporter listening on http://{}:{}",
        bind_ip_str, port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("herakles-paging-exporter stopped gracefully");
    Ok(())
}
