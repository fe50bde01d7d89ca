//! Relay front end.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │                 RELAY FRONT END                 │
//!                    │                                                 │
//!   Browser ─ws──────┼─▶ /api/ws ──── websocket bridge ───────────────┼──▶ Backend
//!   Browser ─http────┼─▶ /api/*  ──── verbatim forward (Host rewrite) ┼──▶ Backend
//!   Browser ─http────┼─▶ /       ──── static page (public/)           │
//!   Operator ─http───┼─▶ /hostname /server-status /checkServerStatus  │
//!                    │   /logs /start-stress-test /healthz            │
//!                    │                                                 │
//!                    │   config (TOML, immutable) · access log file   │
//!                    │   tracing · optional Prometheus exporter       │
//!                    └────────────────────────────────────────────────┘
//! ```
//!
//! The relay client counterpart (fixed-delay auto-reconnect, last-write-wins
//! display) lives in the library and is exercised by `relay-cli watch`.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use relay_front::config::{load_config, RelayConfig};
use relay_front::lifecycle::Shutdown;
use relay_front::observability;
use relay_front::HttpServer;

#[derive(Parser)]
#[command(name = "relay-front")]
#[command(about = "Static-page web front end with an HTTP/WebSocket relay to a single backend")]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    // The guard keeps the access log writer alive until exit.
    let _log_guard = observability::init_logging(&config.observability, &config.access_log);

    tracing::info!("relay-front v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.address,
        ws_path = %config.relay.ws_path,
        http_prefix = %config.relay.http_prefix,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
