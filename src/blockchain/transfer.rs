//! Transfer instructions and the send-many payload.
//!
//! # Responsibilities
//! - Validate caller-supplied instructions into an immutable batch
//! - Serialize the batch into fixed 40-byte slots, in insertion order
//! - Parse a payload back into a batch
//!
//! # Wire Layout
//! ```text
//! slot i = destination public key (32) || amount u64 LE (8)
//! ```

use serde::{Deserialize, Serialize};

use crate::blockchain::identity::{IdentityScheme, PublicKey, PUBLIC_KEY_LEN};
use crate::blockchain::types::{PipelineError, PipelineResult};

/// Most instructions a single send-many payload carries.
pub const MAX_TRANSFERS: usize = 25;

/// Serialized size of one transfer.
pub const TRANSFER_SLOT_LEN: usize = PUBLIC_KEY_LEN + 8;

/// One payment as submitted over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInstruction {
    /// 60-character uppercase identity.
    pub destination: String,
    pub amount: i64,
}

/// A validated payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub destination: PublicKey,
    pub amount: u64,
}

/// Ordered, non-empty list of at most [`MAX_TRANSFERS`] transfers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferBatch {
    transfers: Vec<Transfer>,
}

impl TransferBatch {
    pub fn new(transfers: Vec<Transfer>) -> PipelineResult<Self> {
        if transfers.is_empty() {
            return Err(PipelineError::InvalidTransfer("batch is empty".into()));
        }
        if transfers.len() > MAX_TRANSFERS {
            return Err(PipelineError::InvalidTransfer(format!(
                "batch has {} transfers, at most {} allowed",
                transfers.len(),
                MAX_TRANSFERS
            )));
        }
        if let Some(index) = transfers.iter().position(|t| t.amount == 0) {
            return Err(PipelineError::InvalidTransfer(format!(
                "transfer {} has zero amount",
                index
            )));
        }
        Ok(Self { transfers })
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transfer> {
        self.transfers.iter()
    }

    /// Sum of all amounts, `None` on overflow.
    pub fn total_amount(&self) -> Option<u64> {
        self.transfers
            .iter()
            .try_fold(0u64, |acc, t| acc.checked_add(t.amount))
    }

    /// Serialized payload size in bytes.
    pub fn encoded_len(&self) -> usize {
        self.transfers.len() * TRANSFER_SLOT_LEN
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        for transfer in &self.transfers {
            out.extend_from_slice(transfer.destination.as_bytes());
            out.extend_from_slice(&transfer.amount.to_le_bytes());
        }
        out
    }

    /// Parse a payload produced by [`TransferBatch::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> PipelineResult<Self> {
        if bytes.len() % TRANSFER_SLOT_LEN != 0 {
            return Err(PipelineError::InvalidTransfer(format!(
                "payload length {} is not a multiple of {}",
                bytes.len(),
                TRANSFER_SLOT_LEN
            )));
        }

        let transfers = bytes
            .chunks_exact(TRANSFER_SLOT_LEN)
            .map(|slot| {
                let mut key = [0u8; PUBLIC_KEY_LEN];
                key.copy_from_slice(&slot[..PUBLIC_KEY_LEN]);
                let mut amount = [0u8; 8];
                amount.copy_from_slice(&slot[PUBLIC_KEY_LEN..]);
                Transfer {
                    destination: PublicKey::from_bytes(key),
                    amount: u64::from_le_bytes(amount),
                }
            })
            .collect();

        Self::new(transfers)
    }
}

/// Validate instructions into a batch. Runs before any network call.
pub fn build_batch<S: IdentityScheme + ?Sized>(
    scheme: &S,
    instructions: &[TransferInstruction],
) -> PipelineResult<TransferBatch> {
    if instructions.is_empty() {
        return Err(PipelineError::InvalidTransfer("batch is empty".into()));
    }
    if instructions.len() > MAX_TRANSFERS {
        return Err(PipelineError::InvalidTransfer(format!(
            "batch has {} transfers, at most {} allowed",
            instructions.len(),
            MAX_TRANSFERS
        )));
    }

    let mut transfers = Vec::with_capacity(instructions.len());
    for (index, instruction) in instructions.iter().enumerate() {
        if instruction.amount <= 0 {
            return Err(PipelineError::InvalidTransfer(format!(
                "transfer {} has non-positive amount {}",
                index, instruction.amount
            )));
        }
        let destination = scheme
            .decode_identity(&instruction.destination)
            .map_err(|e| {
                PipelineError::InvalidTransfer(format!("transfer {} destination: {}", index, e))
            })?;
        transfers.push(Transfer {
            destination,
            amount: instruction.amount as u64,
        });
    }

    TransferBatch::new(transfers)
}
