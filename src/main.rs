//! Send-many relay.
//!
//! Accepts a JSON batch of transfers over HTTP and relays it to a ledger
//! node as one signed send-many transaction.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /send-transfers
//!     ───────────────────▶ http::server ──▶ blockchain::pipeline
//!                                              │
//!                     ┌────────────────────────┼─────────────────────────┐
//!                     ▼                        ▼                         ▼
//!              transfer (batch)      client (tick, broadcast)   transaction + wallet
//!                                              │                  (digest, SchnorrQ)
//!                                              ▼
//!                                         ledger node
//!
//!     Cross-cutting: config, observability, resilience (deadlines), lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;

use sendmany_relay::config;
use sendmany_relay::lifecycle::startup;
use sendmany_relay::observability::logging;

#[derive(Parser)]
#[command(name = "sendmany-relay")]
#[command(about = "Relays transfer batches to a ledger node as signed send-many transactions", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults plus environment overrides apply without one.
    #[arg(short, long, env = "SENDMANY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = config::load(args.config.as_deref())?;
    logging::init(&config.observability);

    tracing::info!("sendmany-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.server.bind_address,
        node = %config.node.rpc_url,
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
