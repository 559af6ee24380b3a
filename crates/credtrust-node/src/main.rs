//! CredTrust Node: entry point.
//!
//! Starts the CredTrust node with configuration from a TOML file or defaults.

mod api;
mod config;
mod node;
mod state;
mod storage;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::{CredTrustConfig, StorageBackend};
use node::CredTrustNode;

/// CredTrust Node
#[derive(Parser, Debug)]
#[command(name = "credtrust-node", version, about = "CredTrust credential trust node")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "credtrust.toml")]
    config: PathBuf,

    /// Override the API port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep all state in memory instead of RocksDB.
    #[arg(long)]
    in_memory: bool,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(config: &CredTrustConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.is_json() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Handle --init flag
    if args.init {
        let config = CredTrustConfig::default();
        config.save(&args.config)?;
        println!("wrote default config to {}", args.config.display());
        return Ok(());
    }

    // Load configuration
    let mut config = CredTrustConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(api_port) = args.api_port {
        config.api.port = api_port;
    }
    if let Some(ref data_dir) = args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    if args.in_memory {
        config.storage.backend = StorageBackend::Memory;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.json_logs {
        config.logging.format = "json".into();
    }

    init_tracing(&config);
    tracing::info!("CredTrust Node v{}", env!("CARGO_PKG_VERSION"));

    // Create and start the node
    let mut node = CredTrustNode::new(config)?;
    node.start().await?;

    tokio::select! {
        result = node.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "API server error");
            }
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => tracing::info!("received shutdown signal"),
                Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c"),
            }
        }
    }

    node.shutdown().await?;
    tracing::info!("CredTrust node exited cleanly");
    Ok(())
}
