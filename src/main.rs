//! annoying-client
//!
//! Generates steady synthetic HTTP traffic against a target and exposes a
//! small control plane for reading stats and reconfiguring on the fly.
//!
//! ```text
//!   config.json ──▶ ConfigStore ◀── PUT /config (basic auth) ◀── operator
//!                        │
//!                        ▼ snapshot per tick
//!                   Scheduler ──▶ selector ──▶ dispatcher ──▶ target
//!                                                  │
//!                                                  ▼
//!                   GET /* ◀──────────────── RequestStats
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use annoying_client::config::loader::load_startup;
use annoying_client::config::watcher::ConfigWatcher;
use annoying_client::lifecycle::signals::wait_for_signal;
use annoying_client::observability::{logging, metrics};
use annoying_client::{App, HttpServer};

#[derive(Parser)]
#[command(name = "annoying-client")]
#[command(about = "Configurable synthetic HTTP traffic generator", long_about = None)]
struct Cli {
    /// JSON (or TOML) configuration file, looked up in ./ and ../
    config: Option<PathBuf>,

    /// Redraw the stats document on the terminal after every tick
    /// (also enabled by a non-empty DEBUG environment variable)
    #[arg(long)]
    debug: bool,

    /// Reapply the configuration file whenever it changes
    #[arg(long)]
    watch: bool,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    metrics_address: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    logging::init_logging();
    tracing::info!("annoying-client v{} starting", env!("CARGO_PKG_VERSION"));

    let startup = load_startup(cli.config.as_deref());
    let config = startup.config.clone();

    tracing::info!(
        http_port = config.http_port,
        base_url = %config.base_url,
        parallel = config.parallel,
        interval_ms = config.interval,
        index_pct = config.index_pct,
        "Configuration loaded"
    );

    if let Some(addr) = cli.metrics_address {
        metrics::init_metrics(addr);
    }

    let debug = cli.debug || std::env::var_os("DEBUG").is_some_and(|v| !v.is_empty());
    let app = App::new(config.clone(), debug);
    app.scheduler.start().await;

    // Keep the watcher handle alive for the life of the process.
    let _watcher = match (&startup.source, cli.watch) {
        (Some(path), true) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            let scheduler = app.scheduler.clone();
            tokio::spawn(async move {
                while let Some(doc) = updates.recv().await {
                    if let Err(e) = scheduler.reconfigure(doc).await {
                        tracing::error!(error = %e, "Ignoring reloaded configuration");
                    }
                }
            });
            match watcher.run() {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to start config watcher");
                    None
                }
            }
        }
        (None, true) => {
            tracing::warn!("--watch given but no configuration file is in use");
            None
        }
        _ => None,
    };

    tokio::spawn(wait_for_signal(app.shutdown.clone()));

    let listener = TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    let server = HttpServer::new(app.state());
    server.run(listener, app.shutdown.subscribe()).await?;

    app.scheduler.stop().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
