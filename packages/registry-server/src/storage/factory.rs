//! Builds the configured [`StorageEngine`].
//!
//! [`open_engine`] is the single injection point that turns a
//! [`StorageConfig`] into a shared `Arc<dyn StorageEngine>`.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::storage::engine::StorageEngine;
use crate::storage::engines::BTreeMapStorage;

/// Which engine backs the registry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Volatile in-memory `BTreeMap`.
    #[default]
    Memory,
    /// Embedded `redb` database file at `path`.
    Redb { path: PathBuf },
}

/// Storage section of the registry configuration.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Opens the engine selected by `config`.
///
/// # Errors
///
/// Returns an error if the backend cannot be opened, or if a `redb` backend is
/// requested while the `redb` feature is disabled.
pub fn open_engine(config: &StorageConfig) -> anyhow::Result<Arc<dyn StorageEngine>> {
    match &config.backend {
        StorageBackend::Memory => {
            info!(backend = "memory", "opening storage engine");
            Ok(Arc::new(BTreeMapStorage::new()))
        }
        StorageBackend::Redb { path } => open_redb(path),
    }
}

#[cfg(feature = "redb")]
fn open_redb(path: &std::path::Path) -> anyhow::Result<Arc<dyn StorageEngine>> {
    info!(backend = "redb", path = %path.display(), "opening storage engine");
    Ok(Arc::new(crate::storage::engines::RedbStorage::open(path)?))
}

#[cfg(not(feature = "redb"))]
fn open_redb(path: &std::path::Path) -> anyhow::Result<Arc<dyn StorageEngine>> {
    anyhow::bail!(
        "redb backend requested at {} but the `redb` feature is disabled",
        path.display()
    )
}
