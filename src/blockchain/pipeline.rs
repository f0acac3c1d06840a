//! The send-many pipeline.
//!
//! # Data Flow
//! ```text
//! instructions
//!     → build_batch          (validation, no I/O)
//!     → TickOracle           (RPC #1, under RequestContext)
//!     → UnsignedTransaction  (header + payload, digest)
//!     → Signer               (SchnorrQ)
//!     → Broadcaster          (RPC #2, under RequestContext)
//!     → LedgerAck
//! ```
//!
//! The first failing stage aborts the rest. Each invocation is independent.

use std::time::Instant;

use crate::blockchain::client::{Broadcaster, LedgerAck, TickOracle};
use crate::blockchain::identity::{IdentityScheme, QubicScheme};
use crate::blockchain::transaction::UnsignedTransaction;
use crate::blockchain::transfer::{build_batch, TransferInstruction};
use crate::blockchain::types::{PipelineError, PipelineResult, Stage, TxState};
use crate::blockchain::wallet::{Signer, Wallet};
use crate::observability::metrics;
use crate::resilience::RequestContext;

/// Default ticks between the current tick and the target tick.
pub const DEFAULT_TICK_OFFSET: u32 = 5;

/// Builds, signs, and broadcasts send-many transactions through `R`.
#[derive(Debug, Clone)]
pub struct SendManyPipeline<R, S = QubicScheme> {
    rpc: R,
    signer: Signer<S>,
    tick_offset: u32,
}

impl<R> SendManyPipeline<R, QubicScheme>
where
    R: TickOracle + Broadcaster,
{
    pub fn new(rpc: R, tick_offset: u32) -> Self {
        Self::with_scheme(rpc, QubicScheme, tick_offset)
    }
}

impl<R, S> SendManyPipeline<R, S>
where
    R: TickOracle + Broadcaster,
    S: IdentityScheme,
{
    pub fn with_scheme(rpc: R, scheme: S, tick_offset: u32) -> Self {
        Self {
            rpc,
            signer: Signer::new(scheme),
            tick_offset,
        }
    }

    pub fn scheme(&self) -> &S {
        self.signer.scheme()
    }

    pub fn tick_offset(&self) -> u32 {
        self.tick_offset
    }

    /// Relay `instructions` from `wallet` as one signed transaction.
    pub async fn send_many(
        &self,
        ctx: &RequestContext,
        wallet: &Wallet,
        instructions: &[TransferInstruction],
    ) -> PipelineResult<LedgerAck> {
        let start = Instant::now();
        let result = self.run(ctx, wallet, instructions).await;
        metrics::record_outcome(result.as_ref().map(|_| ()), start);

        if let Err(e) = &result {
            tracing::warn!(stage = %e.stage(), error = %e, retryable = e.is_retryable(), "Send-many failed");
        }
        result
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        wallet: &Wallet,
        instructions: &[TransferInstruction],
    ) -> PipelineResult<LedgerAck> {
        let batch = build_batch(self.scheme(), instructions)?;
        metrics::record_batch_size(batch.len());

        let current_tick = ctx.run(Stage::Tick, self.rpc.current_tick()).await?;
        let target_tick =
            current_tick
                .checked_add(self.tick_offset)
                .ok_or_else(|| PipelineError::Encoding {
                    stage: Stage::Build,
                    reason: format!(
                        "tick {} plus offset {} overflows",
                        current_tick, self.tick_offset
                    ),
                })?;

        let unsigned = UnsignedTransaction::build(*wallet.public_key(), target_tick, &batch)?;
        transition(TxState::Unsigned);

        let digest = unsigned.digest();
        transition(TxState::Digested);

        let signature = self.signer.sign(wallet.seed(), wallet.public_key(), &digest)?;
        let signed = unsigned.into_signed(signature);
        transition(TxState::Signed);

        let tx_id = signed.id();
        tracing::info!(
            tx_id = %tx_id,
            transfers = batch.len(),
            current_tick = current_tick,
            target_tick = target_tick,
            "Transaction signed"
        );
        transition(TxState::Encoded);

        let ack = ctx.run(Stage::Broadcast, self.rpc.broadcast(&signed)).await?;
        transition(TxState::Broadcast);
        transition(TxState::Acknowledged);

        tracing::info!(tx_id = %tx_id, "Transaction broadcast");
        Ok(ack)
    }
}

fn transition(state: TxState) {
    tracing::debug!(state = ?state, "Transaction state");
}
