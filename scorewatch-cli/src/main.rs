//! scorewatch CLI
//!
//! Polls a live sporting-event feed, logs every change and optionally serves
//! the reconciled state over HTTP.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scorewatch_api::{ApiConfig, ApiServer};
use scorewatch_core::types::{NameMapping, Snapshot};
use scorewatch_engine::{Monitor, MonitorConfig, ReconciliationEngine};
use scorewatch_feed::parse_snapshot;
use scorewatch_names::{parse_mapping, IdentityLookup};

/// scorewatch - live sporting-event feed reconciler
#[derive(Parser)]
#[command(name = "scorewatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    /// Upstream feed base URL
    #[arg(long, global = true, env = "API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the feed and log every change until Ctrl+C
    Monitor {
        /// Delay between cycles in milliseconds
        #[arg(short, long)]
        interval_ms: Option<u64>,
    },

    /// Poll the feed and serve the reconciled state over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
        /// Bind address
        #[arg(short, long, env = "BIND_ADDR")]
        bind: Option<String>,
        /// Delay between cycles in milliseconds
        #[arg(short, long)]
        interval_ms: Option<u64>,
    },

    /// Parse a raw state payload offline and print it as JSON
    Parse {
        /// File holding the newline-separated event records
        file: PathBuf,
        /// File holding the `code:name;...` mapping payload
        #[arg(short, long)]
        mapping: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json);

    let config = monitor_config(cli.api_url);

    match cli.command {
        Commands::Monitor { interval_ms } => cmd_monitor(with_interval(config, interval_ms)).await,
        Commands::Serve {
            port,
            bind,
            interval_ms,
        } => cmd_serve(with_interval(config, interval_ms), port, bind).await,
        Commands::Parse { file, mapping } => cmd_parse(&file, mapping.as_deref()),
    }
}

/// Default filter directive for the given verbosity.
fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        "scorewatch=debug,info"
    } else {
        "scorewatch=info,warn"
    }
}

fn init_logging(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter(verbose).into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Environment configuration with command-line overrides applied.
fn monitor_config(api_url: Option<String>) -> MonitorConfig {
    let config = MonitorConfig::from_env();
    match api_url {
        Some(url) => config.with_api_url(url),
        None => config,
    }
}

fn with_interval(config: MonitorConfig, interval_ms: Option<u64>) -> MonitorConfig {
    match interval_ms {
        Some(ms) => config.with_poll_interval(Duration::from_millis(ms.max(1))),
        None => config,
    }
}

/// Shutdown signal flipped on Ctrl+C.
fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(err) => warn!(error = %err, "Cannot listen for Ctrl+C, stopping"),
        }
        let _ = tx.send(true);
    });
    rx
}

/// Run the reconciliation loop
async fn cmd_monitor(config: MonitorConfig) -> Result<()> {
    println!("{}", "Monitoring sporting events...".cyan().bold());
    println!("   {} {}", "Upstream:".green(), config.api_url);
    println!("   {} {:?}", "Interval:".green(), config.poll_interval);
    println!("\n   Press Ctrl+C to stop.\n");

    let engine = Arc::new(ReconciliationEngine::new());
    let monitor = Monitor::from_config(&config, engine).context("Failed to build monitor")?;

    monitor.run(shutdown_on_ctrl_c()).await;
    Ok(())
}

/// Run the reconciliation loop and the read API
async fn cmd_serve(config: MonitorConfig, port: Option<u16>, bind: Option<String>) -> Result<()> {
    let mut api_config = ApiConfig::from_env();
    if let Some(port) = port {
        api_config.port = port;
    }
    if let Some(bind) = bind {
        api_config.bind = bind;
    }
    let addr = api_config.socket_addr().context("Invalid API address")?;

    println!("{}", "Starting scorewatch API server...".cyan().bold());
    println!("   {} {}", "Upstream:".green(), config.api_url);
    println!("   {} http://{}", "Listening on:".green(), addr);
    println!("   {} http://{}/client/state", "State:".dimmed(), addr);
    println!("\n   Press Ctrl+C to stop.\n");

    let engine = Arc::new(ReconciliationEngine::new());
    let monitor = Monitor::from_config(&config, Arc::clone(&engine))
        .context("Failed to build monitor")?;
    let shutdown = shutdown_on_ctrl_c();

    let monitor_task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { monitor.run(shutdown).await }
    });

    let mut api_shutdown = shutdown;
    ApiServer::new(engine)
        .run_until(addr, async move {
            while !*api_shutdown.borrow() {
                if api_shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .context("API server failed")?;

    monitor_task.await.context("Monitor task panicked")?;
    Ok(())
}

/// Parse a payload file offline
fn cmd_parse(file: &Path, mapping: Option<&Path>) -> Result<()> {
    let snapshot = parse_files(file, mapping)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn parse_files(file: &Path, mapping: Option<&Path>) -> Result<Snapshot> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mapping = match mapping {
        Some(path) => parse_mapping(
            &std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => NameMapping::new(),
    };

    Ok(parse_snapshot(&raw, &mapping, &IdentityLookup))
}
