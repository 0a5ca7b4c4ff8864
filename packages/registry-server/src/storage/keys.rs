//! Store key layout for registry records.
//!
//! A provider key is a one-byte prefix followed by the raw owner bytes.
//! Appending to a fixed prefix preserves the byte order of owners, so store
//! iteration order is owner order.

use provider_registry_core::Owner;

/// Prefix byte for provider records.
pub const PROVIDER_PREFIX: u8 = 0x01;

/// Encodes the store key for `owner`.
#[must_use]
pub fn provider_key(owner: &Owner) -> Vec<u8> {
    provider_key_from_bytes(owner.as_bytes())
}

/// Encodes the store key for raw owner bytes (e.g. a pagination cursor).
#[must_use]
pub fn provider_key_from_bytes(owner: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(owner.len() + 1);
    key.push(PROVIDER_PREFIX);
    key.extend_from_slice(owner);
    key
}

/// Strips the provider prefix, returning the owner bytes.
///
/// Returns `None` for keys outside the provider key space.
#[must_use]
pub fn owner_bytes(key: &[u8]) -> Option<&[u8]> {
    match key.split_first() {
        Some((&PROVIDER_PREFIX, owner)) => Some(owner),
        _ => None,
    }
}
