//! lsmkv Server Binary
//!
//! Starts the HTTP facade for lsmkv.

use std::sync::Arc;

use clap::Parser;
use lsmkv::http::{self, AppState};
use lsmkv::Config;
use tracing_subscriber::{fmt, EnvFilter};

/// lsmkv Server
#[derive(Parser, Debug)]
#[command(name = "lsmkv-server")]
#[command(about = "HTTP facade for the lsmkv key-value store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Level 0 capacity (distinct keys) before compaction
    #[arg(short, long, default_value = "10")]
    threshold: u64,

    /// fsync after every write
    #[arg(long)]
    sync_writes: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lsmkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("lsmkv Server v{}", lsmkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .threshold(args.threshold)
        .sync_writes(args.sync_writes)
        .build();

    // Open tree
    let state = match AppState::open(config.clone()) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to open tree: {}", e);
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = http::serve(listener, state).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
