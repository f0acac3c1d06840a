//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the node client, wallet, and pipeline from a validated config
//! - Start the metrics exporter when enabled
//! - Bind the listener and serve until a shutdown signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::blockchain::{NodeClient, PipelineError, QubicScheme, SendManyPipeline, Wallet};
use crate::config::RelayConfig;
use crate::http::RelayServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The wallet section is incomplete or inconsistent.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The HTTP client for the node could not be built.
    #[error("Node client error: {0}")]
    NodeClient(#[from] reqwest::Error),

    /// Binding or serving failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PipelineError> for StartupError {
    fn from(e: PipelineError) -> Self {
        StartupError::Wallet(e.to_string())
    }
}

/// Build the server for `config`. The config must already be validated.
pub fn build_server(config: &RelayConfig) -> Result<RelayServer, StartupError> {
    let seed = config
        .wallet
        .seed
        .clone()
        .ok_or_else(|| StartupError::Wallet("seed not set".into()))?;
    let wallet = Wallet::from_parts(&QubicScheme, seed, &config.wallet.source_identity)?;

    let node = NodeClient::new(
        &config.node.rpc_url,
        Duration::from_secs(config.node.rpc_timeout_secs),
    )?;
    let pipeline = SendManyPipeline::new(node, config.pipeline.tick_offset);

    tracing::info!(
        node = %config.node.rpc_url,
        source = %wallet.identity(),
        tick_offset = config.pipeline.tick_offset,
        "Pipeline ready"
    );

    Ok(RelayServer::new(&config.server, pipeline, wallet))
}

/// Run the relay until SIGINT or SIGTERM.
pub async fn run(config: RelayConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = build_server(&config)?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, receiver).await?;
    Ok(())
}
