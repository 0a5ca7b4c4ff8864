//! Provider registry server: ordered storage, provider keeper, pagination and
//! query service, driven through a tower operation pipeline.

pub mod context;
pub mod error;
pub mod keeper;
pub mod pagination;
pub mod query;
pub mod service;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use context::QueryContext;
pub use error::{ErrorCode, RegistryError};
pub use keeper::{Keeper, KeeperView, ProviderIter};
pub use pagination::{Page, Pagination, DEFAULT_PAGE_LIMIT};
pub use query::ProviderQueryService;
pub use service::{build_operation_pipeline, ProviderService, RegistryConfig};
pub use storage::{open_engine, StorageEngine, StoreReader};
