//! Ledger node RPC client.
//!
//! # Responsibilities
//! - Query the node's current tick
//! - Submit encoded transactions for broadcast
//! - Map transport failures and timeouts to pipeline errors
//!
//! # Design Decisions
//! - One attempt per call; the caller decides whether to resubmit
//! - The acknowledgement body is passed through without interpretation
//! - `NodeClient` wraps a pooled `reqwest::Client` and is cheap to clone

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::blockchain::transaction::SignedTransaction;
use crate::blockchain::types::{PipelineError, PipelineResult, Stage};

const TICK_INFO_PATH: &str = "/v1/tick-info";
const BROADCAST_PATH: &str = "/v1/broadcast-transaction";

/// Source of the node's current tick.
pub trait TickOracle: Send + Sync {
    fn current_tick(&self) -> impl Future<Output = PipelineResult<u32>> + Send;
}

/// Submits signed transactions to the ledger.
pub trait Broadcaster: Send + Sync {
    fn broadcast(
        &self,
        tx: &SignedTransaction,
    ) -> impl Future<Output = PipelineResult<LedgerAck>> + Send;
}

/// Node acknowledgement, returned to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerAck(pub serde_json::Value);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickInfoResponse {
    tick_info: TickInfo,
}

#[derive(Debug, Deserialize)]
struct TickInfo {
    tick: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastRequest<'a> {
    encoded_transaction: &'a str,
}

/// REST client for a single ledger node.
#[derive(Debug, Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl NodeClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn unavailable(&self, stage: Stage, err: reqwest::Error) -> PipelineError {
        let reason = if err.is_timeout() {
            format!("timeout after {}s", self.timeout.as_secs())
        } else {
            err.to_string()
        };
        tracing::warn!(stage = %stage, node = %self.base_url, reason = %reason, "Ledger node call failed");
        PipelineError::RemoteUnavailable { stage, reason }
    }
}

impl TickOracle for NodeClient {
    async fn current_tick(&self) -> PipelineResult<u32> {
        let url = format!("{}{}", self.base_url, TICK_INFO_PATH);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.unavailable(Stage::Tick, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::RemoteUnavailable {
                stage: Stage::Tick,
                reason: format!("tick query returned status {}", status.as_u16()),
            });
        }

        let body: TickInfoResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                PipelineError::Encoding {
                    stage: Stage::Tick,
                    reason: format!("malformed tick response: {}", e),
                }
            } else {
                self.unavailable(Stage::Tick, e)
            }
        })?;

        tracing::debug!(tick = body.tick_info.tick, "Fetched current tick");
        Ok(body.tick_info.tick)
    }
}

impl Broadcaster for NodeClient {
    async fn broadcast(&self, tx: &SignedTransaction) -> PipelineResult<LedgerAck> {
        let encoded = tx.encode_base64();
        let url = format!("{}{}", self.base_url, BROADCAST_PATH);
        let response = self
            .http
            .post(&url)
            .json(&BroadcastRequest {
                encoded_transaction: &encoded,
            })
            .send()
            .await
            .map_err(|e| self.unavailable(Stage::Broadcast, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.unavailable(Stage::Broadcast, e))?;

        if !status.is_success() {
            return Err(PipelineError::Broadcast {
                status: status.as_u16(),
                body,
            });
        }

        let value = if body.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body))
        };
        Ok(LedgerAck(value))
    }
}
