//! Per-request cancellation and deadlines.
//!
//! # Responsibilities
//! - Carry a cancellation token and optional deadline through the pipeline
//! - Race every network round-trip against both
//! - Report which stage was interrupted and why
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities and `tokio_util`'s `CancellationToken`
//! - Child contexts are cancelled when their parent token is (server shutdown)
//! - Interrupted stages return `PipelineError::Cancelled`; nothing after them runs

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::blockchain::types::{PipelineError, PipelineResult, Stage};

/// Cancellation scope for one relayed request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context cancelled together with `parent`.
    pub fn child_of(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
            deadline: None,
        }
    }

    /// Set a deadline `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Guard that cancels this context when dropped, e.g. with an abandoned handler.
    pub fn cancel_on_drop(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    /// Drive `fut` unless the context is cancelled or its deadline passes first.
    pub async fn run<T, F>(&self, stage: Stage, fut: F) -> PipelineResult<T>
    where
        F: Future<Output = PipelineResult<T>>,
    {
        if self.token.is_cancelled() {
            return Err(PipelineError::Cancelled {
                stage,
                reason: "request cancelled",
            });
        }

        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(PipelineError::Cancelled {
                stage,
                reason: "request cancelled",
            }),
            _ = expired => Err(PipelineError::Cancelled {
                stage,
                reason: "deadline exceeded",
            }),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let ctx = RequestContext::new().with_timeout(Duration::from_secs(5));
        let value = ctx.run(Stage::Tick, async { Ok(7u32) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_context_skips_future() {
        let ctx = RequestContext::new();
        ctx.cancel();
        let err = ctx
            .run(Stage::Broadcast, async { Ok::<_, PipelineError>(()) })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Cancelled { stage: Stage::Broadcast, reason: "request cancelled" }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_slow_future() {
        let ctx = RequestContext::new().with_timeout(Duration::from_millis(50));
        let err = ctx
            .run(Stage::Tick, async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, PipelineError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Cancelled { stage: Stage::Tick, reason: "deadline exceeded" }
        ));
    }

    #[test]
    fn test_drop_guard_cancels() {
        let ctx = RequestContext::new();
        {
            let _guard = ctx.cancel_on_drop();
            assert!(!ctx.is_cancelled());
        }
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_parent_cancellation_reaches_child() {
        let parent = CancellationToken::new();
        let ctx = RequestContext::child_of(&parent);
        assert!(!ctx.is_cancelled());

        let handle = {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                ctx.run(Stage::Tick, std::future::pending::<PipelineResult<()>>())
                    .await
            })
        };
        parent.cancel();

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled { .. }));
        assert!(ctx.is_cancelled());
    }
}
