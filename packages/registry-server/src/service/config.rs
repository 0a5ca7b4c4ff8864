use crate::keeper::DEFAULT_ITERATION_BATCH_SIZE;
use crate::service::operation::OperationContext;
use crate::storage::StorageConfig;

/// Registry-level configuration.
///
/// Controls operation timeouts, concurrency limits, storage iteration and the
/// storage backend.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Identifier for this registry node, recorded on operation spans and
    /// as the `node` label of operation metrics.
    pub node_id: String,
    /// Default timeout for operations in milliseconds.
    pub default_operation_timeout_ms: u64,
    /// Maximum number of concurrent operations before load shedding.
    pub max_concurrent_operations: u32,
    /// Store entries fetched per round trip while listing providers.
    pub iteration_batch_size: usize,
    pub storage: StorageConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            node_id: String::new(),
            default_operation_timeout_ms: 30_000,
            max_concurrent_operations: 1000,
            iteration_batch_size: DEFAULT_ITERATION_BATCH_SIZE,
            storage: StorageConfig::default(),
        }
    }
}

impl RegistryConfig {
    /// Context for a new operation using the configured default timeout.
    #[must_use]
    pub fn operation_context(&self, call_id: u64) -> OperationContext {
        OperationContext::new(call_id, self.default_operation_timeout_ms)
    }
}
