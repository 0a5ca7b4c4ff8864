//! Operation pipeline driving the registry.
//!
//! 1. **Operations** (`operation`): typed requests carrying an `OperationContext`
//! 2. **Domain** (`domain`): `ProviderService`, the `tower::Service` that runs them
//! 3. **Middleware** (`middleware`): Tower layers (load shedding, timeout, metrics)

pub mod config;
pub mod domain;
pub mod middleware;
pub mod operation;

pub use config::RegistryConfig;
pub use domain::ProviderService;
pub use middleware::build_operation_pipeline;
pub use operation::{service_names, Operation, OperationContext, OperationError, OperationResponse};
