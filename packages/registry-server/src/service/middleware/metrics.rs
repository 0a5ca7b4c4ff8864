//! Metrics middleware for operations.
//!
//! Wraps each operation in a `tracing` span and records a counter and a
//! latency histogram through the `metrics` facade, labelled by node id,
//! operation kind and outcome code. Without an installed recorder the
//! `metrics` calls are no-ops.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::service::operation::{Operation, OperationError, OperationResponse};

pub const OPERATIONS_TOTAL: &str = "registry_operations_total";
pub const OPERATION_DURATION_SECONDS: &str = "registry_operation_duration_seconds";

// ---------------------------------------------------------------------------
// MetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer tagging every operation with the registry node it ran on.
#[derive(Debug, Clone)]
pub struct MetricsLayer {
    node_id: Arc<str>,
}

impl MetricsLayer {
    #[must_use]
    pub fn new(node_id: impl Into<Arc<str>>) -> Self {
        Self {
            node_id: node_id.into(),
        }
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService {
            inner,
            node_id: Arc::clone(&self.node_id),
        }
    }
}

// ---------------------------------------------------------------------------
// MetricsService
// ---------------------------------------------------------------------------

/// Service wrapper that records operation duration and outcome.
#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
    node_id: Arc<str>,
}

impl<S> Service<Operation> for MetricsService<S>
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
        let service_name = op.ctx().service_name;
        let call_id = op.ctx().call_id;
        let kind = op.kind();
        let node_id = Arc::clone(&self.node_id);

        let span = info_span!(
            "operation",
            node_id = %node_id,
            service = service_name,
            operation = kind,
            call_id = call_id,
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(op);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;
                let elapsed = start.elapsed();

                let outcome = match &result {
                    Ok(_) => "ok",
                    Err(e) => e.code().as_str(),
                };

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = elapsed.as_millis() as u64;
                tracing::Span::current().record("duration_ms", duration_ms);
                tracing::Span::current().record("outcome", outcome);

                metrics::counter!(
                    OPERATIONS_TOTAL,
                    "node" => node_id.to_string(),
                    "operation" => kind,
                    "outcome" => outcome
                )
                .increment(1);
                metrics::histogram!(
                    OPERATION_DURATION_SECONDS,
                    "node" => node_id.to_string(),
                    "operation" => kind
                )
                .record(elapsed.as_secs_f64());

                tracing::debug!(
                    operation = kind,
                    call_id = call_id,
                    duration_ms = duration_ms,
                    outcome = outcome,
                    "operation complete"
                );

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
