//! Timeout middleware for operations.
//!
//! Rejects operations that exceed their `call_timeout_ms` with
//! `OperationError::Timeout`, and cancels the operation's [`QueryContext`] so
//! a traversal still running on the blocking pool stops at its next step.
//!
//! [`QueryContext`]: crate::context::QueryContext

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tower::{Layer, Service};
use tracing::warn;

use crate::service::operation::{Operation, OperationError, OperationResponse};

// ---------------------------------------------------------------------------
// TimeoutLayer
// ---------------------------------------------------------------------------

/// Tower layer that wraps services with per-operation timeout enforcement.
///
/// The timeout is read from each operation's `ctx.call_timeout_ms` field.
#[derive(Debug, Clone)]
pub struct TimeoutLayer;

impl<S> Layer<S> for TimeoutLayer {
    type Service = TimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutService { inner }
    }
}

// ---------------------------------------------------------------------------
// TimeoutService
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TimeoutService<S> {
    inner: S,
}

impl<S> Service<Operation> for TimeoutService<S>
where
    S: Service<Operation, Response = OperationResponse, Error = OperationError> + Send,
    S::Future: Send + 'static,
{
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = Pin<Box<dyn Future<Output = Result<OperationResponse, OperationError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let timeout_ms = op.ctx().call_timeout_ms;
        let query = op.ctx().query.clone();
        let call_id = op.ctx().call_id;
        let fut = self.inner.call(op);
        Box::pin(async move {
            let duration = Duration::from_millis(timeout_ms);
            match tokio::time::timeout(duration, fut).await {
                Ok(result) => result,
                Err(_elapsed) => {
                    query.cancel();
                    warn!(call_id, timeout_ms, "operation timed out");
                    Err(OperationError::Timeout { timeout_ms })
                }
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
