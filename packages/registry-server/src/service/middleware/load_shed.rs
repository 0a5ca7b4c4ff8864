//! Load-shedding middleware for operations.
//!
//! Admits at most `max_concurrent_operations` provider operations at once.
//! Anything beyond that fails fast with `OperationError::Overloaded` and is
//! counted in [`OPERATIONS_SHED_TOTAL`]; nothing is queued.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::Semaphore;
use tower::{Layer, Service};
use tracing::warn;

use crate::service::operation::{Operation, OperationError, OperationResponse};

pub const OPERATIONS_SHED_TOTAL: &str = "registry_operations_shed_total";

// ---------------------------------------------------------------------------
// LoadShedLayer
// ---------------------------------------------------------------------------

/// Shares one pool of admission permits between every service it wraps.
#[derive(Debug, Clone)]
pub struct LoadShedLayer {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl LoadShedLayer {
    #[must_use]
    pub fn new(max_concurrent: u32) -> Self {
        let capacity = max_concurrent as usize;
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Operations currently holding a permit.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }
}

impl<S> Layer<S> for LoadShedLayer {
    type Service = LoadShedService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoadShedService {
            inner,
            permits: Arc::clone(&self.permits),
            capacity: self.capacity,
        }
    }
}

// ---------------------------------------------------------------------------
// LoadShedService
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadShedService<S> {
    inner: S,
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl<S> Service<Operation> for LoadShedService<S>
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
        // The permit is taken at call time, not when the future is first polled.
        let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
            let kind = op.kind();
            warn!(
                call_id = op.ctx().call_id,
                operation = kind,
                capacity = self.capacity,
                "registry at capacity, shedding operation"
            );
            metrics::counter!(OPERATIONS_SHED_TOTAL, "operation" => kind).increment(1);
            return Box::pin(async { Err(OperationError::Overloaded) });
        };

        let fut = self.inner.call(op);
        Box::pin(async move {
            let _permit = permit;
            fut.await
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
