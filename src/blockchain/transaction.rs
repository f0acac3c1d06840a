//! Send-many transaction layout, digest, and transport encoding.
//!
//! # Responsibilities
//! - Lay out the 80-byte header followed by the transfer payload
//! - Compute the K12 signing digest
//! - Attach the signature exactly once (`into_signed` consumes the unsigned value)
//! - Encode for broadcast and derive the transaction id
//!
//! # Header Layout (little-endian)
//! ```text
//! 0..32   source public key
//! 32..64  send-many contract key
//! 64..72  amount (zero; the payload carries amounts)
//! 72..76  target tick
//! 76..78  input type (1)
//! 78..80  input size (payload length)
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::blockchain::identity::{encode_identity, PublicKey, Signature, PUBLIC_KEY_LEN};
use crate::blockchain::transfer::TransferBatch;
use crate::blockchain::types::{PipelineError, PipelineResult, Stage};
use crate::crypto::{self, SIGNATURE_LEN};

/// Serialized header size.
pub const HEADER_LEN: usize = 80;

/// Input type selecting the send-many procedure.
pub const SEND_MANY_INPUT_TYPE: u16 = 1;

/// Public key of the send-many contract: contract index 4, little-endian.
pub const SEND_MANY_CONTRACT: PublicKey = PublicKey::from_bytes([
    4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0,
]);

/// K12 hash of the unsigned transaction bytes.
pub type Digest = [u8; 32];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionHeader {
    pub source: PublicKey,
    pub destination: PublicKey,
    pub amount: u64,
    pub tick: u32,
    pub input_type: u16,
    pub input_size: u16,
}

impl TransactionHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..32].copy_from_slice(self.source.as_bytes());
        out[32..64].copy_from_slice(self.destination.as_bytes());
        out[64..72].copy_from_slice(&self.amount.to_le_bytes());
        out[72..76].copy_from_slice(&self.tick.to_le_bytes());
        out[76..78].copy_from_slice(&self.input_type.to_le_bytes());
        out[78..80].copy_from_slice(&self.input_size.to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8; HEADER_LEN]) -> Self {
        let key = |range: std::ops::Range<usize>| {
            let mut k = [0u8; PUBLIC_KEY_LEN];
            k.copy_from_slice(&bytes[range]);
            PublicKey::from_bytes(k)
        };
        let mut amount = [0u8; 8];
        amount.copy_from_slice(&bytes[64..72]);
        let mut tick = [0u8; 4];
        tick.copy_from_slice(&bytes[72..76]);

        Self {
            source: key(0..32),
            destination: key(32..64),
            amount: u64::from_le_bytes(amount),
            tick: u32::from_le_bytes(tick),
            input_type: u16::from_le_bytes([bytes[76], bytes[77]]),
            input_size: u16::from_le_bytes([bytes[78], bytes[79]]),
        }
    }
}

/// Header and payload, not yet signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    header: TransactionHeader,
    payload: Vec<u8>,
}

impl UnsignedTransaction {
    pub fn build(
        source: PublicKey,
        target_tick: u32,
        batch: &TransferBatch,
    ) -> PipelineResult<Self> {
        if batch.is_empty() {
            return Err(PipelineError::Encoding {
                stage: Stage::Build,
                reason: "payload is empty".into(),
            });
        }

        let payload = batch.to_bytes();
        let input_size = u16::try_from(payload.len()).map_err(|_| PipelineError::Encoding {
            stage: Stage::Build,
            reason: format!("payload of {} bytes exceeds input size field", payload.len()),
        })?;

        Ok(Self {
            header: TransactionHeader {
                source,
                destination: SEND_MANY_CONTRACT,
                amount: 0,
                tick: target_tick,
                input_type: SEND_MANY_INPUT_TYPE,
                input_size,
            },
            payload,
        })
    }

    pub fn header(&self) -> &TransactionHeader {
        &self.header
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The signed message: header followed by payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len());
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn digest(&self) -> Digest {
        crypto::k12(&[self.header.to_bytes().as_slice(), &self.payload])
    }

    pub fn into_signed(self, signature: Signature) -> SignedTransaction {
        SignedTransaction {
            unsigned: self,
            signature,
        }
    }
}

/// A transaction with its signature attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    unsigned: UnsignedTransaction,
    signature: Signature,
}

impl SignedTransaction {
    pub fn header(&self) -> &TransactionHeader {
        &self.unsigned.header
    }

    pub fn payload(&self) -> &[u8] {
        &self.unsigned.payload
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn digest(&self) -> Digest {
        self.unsigned.digest()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.unsigned.to_bytes();
        out.extend_from_slice(self.signature.as_bytes());
        out
    }

    pub fn encode_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Parse a broadcast encoding. Used by tooling and tests.
    pub fn decode_base64(encoded: &str) -> PipelineResult<Self> {
        let decode_err = |reason: String| PipelineError::Encoding {
            stage: Stage::Broadcast,
            reason,
        };

        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| decode_err(format!("invalid base64: {}", e)))?;
        if bytes.len() < HEADER_LEN + SIGNATURE_LEN {
            return Err(decode_err(format!("transaction too short: {} bytes", bytes.len())));
        }

        let mut header_bytes = [0u8; HEADER_LEN];
        header_bytes.copy_from_slice(&bytes[..HEADER_LEN]);
        let header = TransactionHeader::from_bytes(&header_bytes);

        let payload_end = HEADER_LEN + header.input_size as usize;
        if bytes.len() != payload_end + SIGNATURE_LEN {
            return Err(decode_err(format!(
                "length {} does not match input size {}",
                bytes.len(),
                header.input_size
            )));
        }

        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(&bytes[payload_end..]);

        Ok(Self {
            unsigned: UnsignedTransaction {
                header,
                payload: bytes[HEADER_LEN..payload_end].to_vec(),
            },
            signature: Signature::from_bytes(signature),
        })
    }

    /// Lowercase identity encoding of K12 over the full signed bytes.
    pub fn id(&self) -> String {
        let hash: [u8; 32] = crypto::k12(&[self.to_bytes().as_slice()]);
        encode_identity(&hash, true)
    }
}
