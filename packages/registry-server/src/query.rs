//! Read-only query service for provider lookups and listings.
//!
//! Requests are validated into typed values before any store access; the
//! service itself holds no state beyond the [`KeeperView`] it reads from.

use provider_registry_core::{
    Owner, PageResponse, QueryProviderRequest, QueryProviderResponse, QueryProvidersRequest,
    QueryProvidersResponse,
};
use tracing::debug;

use crate::context::QueryContext;
use crate::error::RegistryError;
use crate::keeper::KeeperView;
use crate::pagination::Pagination;

/// Validates a point-lookup request.
///
/// # Errors
///
/// Returns [`RegistryError::InvalidArgument`] if the owner is empty.
pub fn validate_provider_request(request: &QueryProviderRequest) -> Result<Owner, RegistryError> {
    Ok(Owner::new(request.owner.as_str())?)
}

/// Validates a listing request.
///
/// # Errors
///
/// Returns [`RegistryError::InvalidArgument`] if the pagination fields
/// conflict.
pub fn validate_providers_request(
    request: &QueryProvidersRequest,
) -> Result<Pagination, RegistryError> {
    Pagination::resolve(request.pagination.as_ref())
}

/// Answers provider queries against one consistent view of the registry.
#[derive(Clone)]
pub struct ProviderQueryService {
    view: KeeperView,
}

impl ProviderQueryService {
    #[must_use]
    pub fn new(view: KeeperView) -> Self {
        Self { view }
    }

    /// Returns the provider registered by `request.owner`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidArgument`] if the owner is empty (the store is
    ///   not touched)
    /// - [`RegistryError::NotFound`] if no provider is registered for the owner
    /// - [`RegistryError::Internal`] on storage failure
    pub fn query_provider(
        &self,
        request: &QueryProviderRequest,
    ) -> Result<QueryProviderResponse, RegistryError> {
        let owner = validate_provider_request(request)?;
        self.provider_by_owner(&owner)
    }

    /// Point lookup for an already validated owner.
    ///
    /// # Errors
    ///
    /// See [`query_provider`](Self::query_provider).
    pub fn provider_by_owner(&self, owner: &Owner) -> Result<QueryProviderResponse, RegistryError> {
        match self.view.get(owner)? {
            Some(provider) => Ok(QueryProviderResponse { provider }),
            None => Err(RegistryError::NotFound {
                owner: owner.to_string(),
            }),
        }
    }

    /// Lists providers in owner order, one page at a time.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidArgument`] for conflicting pagination fields
    /// - [`RegistryError::Cancelled`] / [`RegistryError::DeadlineExceeded`] if
    ///   `ctx` fires during the traversal
    /// - [`RegistryError::Internal`] on storage failure
    pub fn query_providers(
        &self,
        ctx: &QueryContext,
        request: &QueryProvidersRequest,
    ) -> Result<QueryProvidersResponse, RegistryError> {
        let pagination = validate_providers_request(request)?;
        self.list_providers(ctx, &pagination)
    }

    /// Listing for an already validated page request.
    ///
    /// # Errors
    ///
    /// See [`query_providers`](Self::query_providers).
    pub fn list_providers(
        &self,
        ctx: &QueryContext,
        pagination: &Pagination,
    ) -> Result<QueryProvidersResponse, RegistryError> {
        let entries = self.view.iter(ctx, pagination.start_key());
        let page = pagination.paginate(entries)?;
        debug!(
            returned = page.items.len(),
            total = ?page.total,
            has_more = page.next_key.is_some(),
            "listed providers"
        );
        Ok(QueryProvidersResponse {
            providers: page.items,
            pagination: PageResponse {
                next_key: page.next_key,
                total: page.total,
            },
        })
    }
}
