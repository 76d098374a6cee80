//! # Graph Bridge Node
//!
//! Runs the graph bridge gateway as a standalone process.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use graph_gateway::domain::config::humantime_serde::parse_duration;
use graph_gateway::{GraphBridgeService, VERSION};
use graph_node::{init_logging, load_config, ConfigOverrides};

/// Graph bridge between an HTTP client and a browser-hosted graph editor
#[derive(Parser, Debug)]
#[command(name = "graph-node")]
#[command(version, about = "Request/response bridge for a remote graph editor")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP port for REST and WebSocket
    #[arg(short, long)]
    port: Option<u16>,

    /// Base URL of the host process (job queue and node registry)
    #[arg(long)]
    host_url: Option<String>,

    /// Directory for saved graph documents
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Default exchange timeout, e.g. "5s" or "500ms"
    #[arg(long, value_parser = parse_timeout)]
    exchange_timeout: Option<std::time::Duration>,

    /// Read node type descriptors from this JSON file instead of the host
    #[arg(long)]
    registry_file: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn parse_timeout(s: &str) -> Result<std::time::Duration, String> {
    parse_duration(s).map_err(str::to_string)
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            host_url: self.host_url.clone(),
            save_dir: self.save_dir.clone(),
            exchange_timeout: self.exchange_timeout,
            registry_file: self.registry_file.clone(),
            log_json: self.log_json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = load_config(
        args.config.as_deref(),
        |key| std::env::var(key).ok(),
        &args.overrides(),
    )
    .context("Failed to load configuration")?;

    let config = loaded.config;

    init_logging(&config.logging).context("Failed to initialize logging")?;
    for ignored in &loaded.ignored {
        warn!(
            var = ignored.var,
            value = %ignored.value,
            reason = ignored.reason,
            "Ignoring invalid environment override"
        );
    }

    info!("===========================================");
    info!("  Graph Bridge v{}", VERSION);
    info!("===========================================");
    info!("HTTP: {}", config.http_addr());
    info!("Host: {}", config.host.base_url);
    info!("Save Dir: {:?}", config.storage.save_dir);

    let service = GraphBridgeService::new(config).context("Failed to create gateway")?;
    let shutdown = service.shutdown_handle();

    let server = service.start();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            result.context("Gateway stopped with an error")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            info!("Shutdown requested");
            shutdown.shutdown();
            // Let in-flight requests drain
            server.await.context("Gateway stopped with an error")?;
        }
    }

    Ok(())
}
