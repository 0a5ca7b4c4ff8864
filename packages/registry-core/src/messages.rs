//! Transport-agnostic request and response contracts for the registry.
//!
//! All structs use `#[serde(rename_all = "camelCase")]` and encode with
//! `rmp_serde::to_vec_named()` the same way stored records do.

use serde::{Deserialize, Serialize};

use crate::pagination::{PageRequest, PageResponse};
use crate::types::Provider;

// ---------------------------------------------------------------------------
// Point lookup
// ---------------------------------------------------------------------------

/// Look up a single provider by owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryProviderRequest {
    /// Owner of the provider. Must be non-empty.
    #[serde(default)]
    pub owner: String,
}

impl QueryProviderRequest {
    #[must_use]
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryProviderResponse {
    pub provider: Provider,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// List providers in owner order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryProvidersRequest {
    /// Page selection. `None` behaves like a default [`PageRequest`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageRequest>,
}

impl QueryProvidersRequest {
    #[must_use]
    pub fn paginated(pagination: PageRequest) -> Self {
        Self {
            pagination: Some(pagination),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryProvidersResponse {
    /// Providers on this page, ascending by owner.
    pub providers: Vec<Provider>,
    pub pagination: PageResponse,
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Register a new provider. Fails if the owner already has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgCreateProvider {
    pub provider: Provider,
}
