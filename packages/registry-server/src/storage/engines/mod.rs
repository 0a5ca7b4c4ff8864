//! Concrete [`StorageEngine`](super::StorageEngine) implementations.

pub mod btree;
#[cfg(feature = "redb")]
pub mod redb_store;

pub use btree::BTreeMapStorage;
#[cfg(feature = "redb")]
pub use redb_store::RedbStorage;
