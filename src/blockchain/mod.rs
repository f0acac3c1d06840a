//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Transfer instructions (HTTP)
//!     → transfer.rs (validation, payload layout)
//!     → client.rs (current tick)
//!     → transaction.rs (header, digest, encoding)
//!     → wallet.rs (seed → key, signing)
//!     → client.rs (broadcast)
//! ```
//!
//! # Security Constraints
//! - Seed phrases ONLY from configuration or environment variables
//! - Never log seeds, sub-seeds, or private scalars
//! - All RPC calls run under a deadline and cancellation token

pub mod client;
pub mod identity;
pub mod pipeline;
pub mod transaction;
pub mod transfer;
pub mod types;
pub mod wallet;

pub use client::{Broadcaster, LedgerAck, NodeClient, TickOracle};
pub use identity::{IdentityScheme, PublicKey, QubicScheme, SeedPhrase, Signature};
pub use pipeline::SendManyPipeline;
pub use transaction::{SignedTransaction, UnsignedTransaction};
pub use transfer::{build_batch, Transfer, TransferBatch, TransferInstruction};
pub use types::{PipelineError, PipelineResult, Stage, TxState};
pub use wallet::{Signer, Wallet};
