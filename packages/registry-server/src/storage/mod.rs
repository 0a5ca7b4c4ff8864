//! Ordered key-value storage for the registry.
//!
//! - [`StoreReader`] / [`StorageEngine`]: the read and write halves of the
//!   store contract, with restartable cursor iteration
//! - [`engines`]: in-memory `BTreeMap` and durable `redb` implementations
//! - [`keys`]: order-preserving key encoding for provider records
//! - [`factory`]: builds an engine from [`StorageConfig`](factory::StorageConfig)

pub mod engine;
pub mod engines;
pub mod factory;
pub mod keys;

pub use engine::*;
pub use factory::{open_engine, StorageBackend, StorageConfig};
