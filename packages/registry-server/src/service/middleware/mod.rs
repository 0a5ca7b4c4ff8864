//! Tower middleware layers for the operation pipeline.
//!
//! - [`timeout`]: Per-operation timeout enforcement and cancellation
//! - [`metrics`]: Operation spans, counters and latency histograms
//! - [`load_shed`]: Semaphore-based concurrency limiting
//! - [`pipeline`]: Composes all layers into a single service stack

pub mod load_shed;
pub mod metrics;
pub mod pipeline;
pub mod timeout;

pub use load_shed::LoadShedLayer;
pub use metrics::MetricsLayer;
pub use pipeline::build_operation_pipeline;
pub use timeout::TimeoutLayer;
