//! Provider domain service.
//!
//! Executes [`Operation`]s against a shared [`Keeper`]. Store access is
//! synchronous, so every call runs on the blocking thread pool.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use anyhow::Context as _;
use parking_lot::Mutex;
use tower::Service;

use crate::keeper::Keeper;
use crate::query::{validate_provider_request, validate_providers_request, ProviderQueryService};
use crate::service::config::RegistryConfig;
use crate::service::operation::{Operation, OperationError, OperationResponse};
use crate::storage::open_engine;

/// `tower::Service` running provider operations against one registry.
#[derive(Clone)]
pub struct ProviderService {
    keeper: Arc<Keeper>,
    // Creates are check-then-write; one at a time per registry.
    writes: Arc<Mutex<()>>,
}

impl ProviderService {
    #[must_use]
    pub fn new(keeper: Arc<Keeper>) -> Self {
        Self {
            keeper,
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Opens the configured storage engine and wraps it in a fresh keeper.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be opened.
    pub fn from_config(config: &RegistryConfig) -> anyhow::Result<Self> {
        let engine = open_engine(&config.storage)?;
        Ok(Self::new(Arc::new(Keeper::new(
            engine,
            config.iteration_batch_size,
        ))))
    }

    #[must_use]
    pub fn keeper(&self) -> &Arc<Keeper> {
        &self.keeper
    }

    fn execute(&self, op: Operation) -> Result<OperationResponse, OperationError> {
        match op {
            Operation::CreateProvider { ctx, payload } => {
                let _guard = self.writes.lock();
                self.keeper.create(&payload.provider)?;
                Ok(OperationResponse::Created {
                    call_id: ctx.call_id,
                })
            }
            Operation::QueryProvider { request, .. } => {
                let owner = validate_provider_request(&request)?;
                let queries = ProviderQueryService::new(self.keeper.snapshot()?);
                let response = queries.provider_by_owner(&owner)?;
                Ok(OperationResponse::Provider(Box::new(response)))
            }
            Operation::QueryProviders { ctx, request } => {
                let pagination = validate_providers_request(&request)?;
                let queries = ProviderQueryService::new(self.keeper.snapshot()?);
                let response = queries.list_providers(&ctx.query, &pagination)?;
                Ok(OperationResponse::Providers(response))
            }
        }
    }
}

impl Service<Operation> for ProviderService {
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = Pin<Box<dyn Future<Output = Result<OperationResponse, OperationError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || this.execute(op))
                .await
                .context("provider operation task failed")?
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
