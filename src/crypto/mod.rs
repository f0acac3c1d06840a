//! Ledger cryptography.
//!
//! # Data Flow
//! ```text
//! seed letters
//!     → hash.rs (KangarooTwelve, sub-seed and private key derivation)
//!     → scalar.rs (reduction modulo the FourQ group order)
//!     → curve.rs (FourQ point arithmetic over field.rs)
//!     → schnorrq.rs (public key, sign, verify)
//! ```
//!
//! # Security Constraints
//! - Scalar multiplication walks every bit of the scalar and selects
//!   results with masks, never with branches on secret bits
//! - Secret buffers are wrapped in `Zeroizing`
//! - Nothing in this module logs

pub mod curve;
pub mod field;
pub mod hash;
pub mod scalar;
pub mod schnorrq;

pub use hash::{k12, k12_into};
pub use schnorrq::{SIGNATURE_LEN, public_key_from_private, sign, verify};
