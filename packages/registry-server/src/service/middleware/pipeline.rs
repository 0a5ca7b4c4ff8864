//! Pipeline composition: wraps the provider service in all middleware layers.

use tower::ServiceBuilder;

use super::load_shed::LoadShedLayer;
use super::metrics::MetricsLayer;
use super::timeout::TimeoutLayer;
use crate::service::config::RegistryConfig;
use crate::service::domain::ProviderService;
use crate::service::operation::{Operation, OperationError, OperationResponse};

/// Builds the operation pipeline around `service`.
///
/// Layer order (outermost to innermost):
/// 1. `LoadShedLayer`: reject when overloaded, before any work
/// 2. `TimeoutLayer`: enforce `call_timeout_ms`, cancelling the query context
/// 3. `MetricsLayer`: record timing and outcome next to the handler, tagged
///    with `config.node_id`
#[must_use]
pub fn build_operation_pipeline(
    service: ProviderService,
    config: &RegistryConfig,
) -> impl tower::Service<Operation, Response = OperationResponse, Error = OperationError> + Clone
{
    ServiceBuilder::new()
        .layer(LoadShedLayer::new(config.max_concurrent_operations))
        .layer(TimeoutLayer)
        .layer(MetricsLayer::new(config.node_id.as_str()))
        .service(service)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
