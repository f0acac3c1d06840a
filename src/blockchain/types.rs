//! Pipeline stages, transaction lifecycle, and error definitions.

use thiserror::Error;

/// Stage of the send-many pipeline that produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Batch,
    Tick,
    Build,
    Sign,
    Broadcast,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Batch => "batch",
            Stage::Tick => "tick",
            Stage::Build => "build",
            Stage::Sign => "sign",
            Stage::Broadcast => "broadcast",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while relaying a batch.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller supplied an unusable batch. Not retryable.
    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),

    /// An internal layout invariant was violated.
    #[error("Encoding error in {stage} stage: {reason}")]
    Encoding { stage: Stage, reason: String },

    /// Key material or digest was malformed; indicates misconfiguration.
    #[error("Signing error: {0}")]
    Signing(String),

    /// The node could not be reached or timed out. Retryable by the caller.
    #[error("Ledger node unavailable during {stage}: {reason}")]
    RemoteUnavailable { stage: Stage, reason: String },

    /// The node answered the broadcast with a rejection.
    #[error("Broadcast rejected with status {status}: {body}")]
    Broadcast { status: u16, body: String },

    /// The request context was cancelled or ran past its deadline.
    #[error("{stage} cancelled: {reason}")]
    Cancelled { stage: Stage, reason: &'static str },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::InvalidTransfer(_) => Stage::Batch,
            PipelineError::Encoding { stage, .. } => *stage,
            PipelineError::Signing(_) => Stage::Sign,
            PipelineError::RemoteUnavailable { stage, .. } => *stage,
            PipelineError::Broadcast { .. } => Stage::Broadcast,
            PipelineError::Cancelled { stage, .. } => *stage,
        }
    }

    /// Whether resubmitting the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::RemoteUnavailable { .. } | PipelineError::Cancelled { .. }
        )
    }

    /// Short machine-readable kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidTransfer(_) => "invalid_transfer",
            PipelineError::Encoding { .. } => "encoding",
            PipelineError::Signing(_) => "signing",
            PipelineError::RemoteUnavailable { .. } => "remote_unavailable",
            PipelineError::Broadcast { .. } => "broadcast",
            PipelineError::Cancelled { .. } => "cancelled",
        }
    }
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Lifecycle of one transaction. Strictly linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TxState {
    Unsigned,
    Digested,
    Signed,
    Encoded,
    Broadcast,
    Acknowledged,
}

impl TxState {
    /// The only state reachable from `self`, if any.
    pub fn next(self) -> Option<TxState> {
        match self {
            TxState::Unsigned => Some(TxState::Digested),
            TxState::Digested => Some(TxState::Signed),
            TxState::Signed => Some(TxState::Encoded),
            TxState::Encoded => Some(TxState::Broadcast),
            TxState::Broadcast => Some(TxState::Acknowledged),
            TxState::Acknowledged => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}
