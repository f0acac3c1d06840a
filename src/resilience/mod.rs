//! Resilience subsystem.
//!
//! # Design Decisions
//! - Every outbound call has a deadline
//! - No local retries; `PipelineError::is_retryable` tells the caller what may succeed on resubmission
//! - Cancellation is cooperative and checked around each network round-trip

pub mod timeouts;

pub use timeouts::RequestContext;
