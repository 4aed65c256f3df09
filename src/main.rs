//! Edge router service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!          │
//!          ▼
//!   ┌──────────────┐   out of scope   ┌──────────────┐
//!   │ http server  │─────────────────▶│   upstream   │
//!   │ + edge layer │                  │ application  │
//!   └──────┬───────┘                  └──────▲───────┘
//!          │ in scope                        │
//!          ▼                                 │
//!   ┌──────────────┐   Continue + headers    │
//!   │  rule chain  │─────────────────────────┘
//!   └──────┬───────┘
//!          │ Redirect
//!          ▼
//!     301 Location
//! ```
//!
//! Config reloads (file change or SIGHUP) swap the rule chain without
//! dropping connections.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use edge_router::config::watcher::ConfigWatcher;
use edge_router::lifecycle::{signals, startup};
use edge_router::{EdgeError, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "edge-router", version, about = "Edge request router")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "EDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), EdgeError> {
    let args = Args::parse();

    let config = startup::load_startup_config(args.config.as_deref())?;
    if args.check {
        println!("Configuration OK");
        return Ok(());
    }

    startup::init_observability(&config)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-router starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        production = config.site.production,
        origin = config.site.origin.as_deref().unwrap_or("<request>"),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();

    // The watcher handle stops watching when dropped.
    let (_watcher, updates) = match args.config.as_deref() {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            signals::spawn_reload_on_hangup(path.to_path_buf(), watcher.sender(), shutdown.subscribe());
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_tx, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let server_shutdown = shutdown.subscribe();
    signals::spawn_shutdown_listener(shutdown);

    let server = HttpServer::new(config);
    server.run(listener, updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
