//! Domain services behind the operation pipeline.

pub mod provider;

pub use provider::ProviderService;
