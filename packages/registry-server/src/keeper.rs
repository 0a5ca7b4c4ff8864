//! Provider registry over an ordered [`StorageEngine`].
//!
//! [`Keeper`] is the only holder of write access to the store. Readers get a
//! [`KeeperView`] pinned to a snapshot, which exposes point lookups and lazy
//! ordered iteration but no mutation.

use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::sync::Arc;

use anyhow::Context;
use provider_registry_core::{Owner, Provider};
use tracing::{debug, info, warn};

use crate::context::QueryContext;
use crate::error::RegistryError;
use crate::storage::keys::{self, PROVIDER_PREFIX};
use crate::storage::{IterationCursor, StorageEngine, StoreReader};

/// Number of store entries fetched per round trip while iterating.
pub const DEFAULT_ITERATION_BATCH_SIZE: usize = 64;

fn encode(provider: &Provider) -> Result<Vec<u8>, RegistryError> {
    let bytes = rmp_serde::to_vec_named(provider)
        .with_context(|| format!("encode provider {}", provider.owner))?;
    Ok(bytes)
}

fn decode(owner: &[u8], value: &[u8]) -> Result<Provider, RegistryError> {
    let provider: Provider = rmp_serde::from_slice(value).with_context(|| {
        format!("decode provider {}", String::from_utf8_lossy(owner))
    })?;
    if provider.owner.as_bytes() != owner {
        return Err(anyhow::anyhow!(
            "record under {} belongs to {}",
            String::from_utf8_lossy(owner),
            provider.owner
        )
        .into());
    }
    Ok(provider)
}

fn read_provider<S>(store: &S, owner: &Owner) -> Result<Option<Provider>, RegistryError>
where
    S: StoreReader + ?Sized,
{
    let Some(value) = store.get(&keys::provider_key(owner))? else {
        debug!(%owner, "provider lookup missed");
        return Ok(None);
    };
    decode(owner.as_bytes(), &value)
        .map(Some)
        .inspect_err(|e| warn!(%owner, error = %e, "stored provider is unreadable"))
}

fn start_cursor(start: Option<&[u8]>) -> IterationCursor {
    match start {
        Some(owner) => IterationCursor::at(keys::provider_key_from_bytes(owner)),
        None => IterationCursor::at(vec![PROVIDER_PREFIX]),
    }
}

// ---------------------------------------------------------------------------
// Keeper
// ---------------------------------------------------------------------------

/// Domain API over the store: create, look up and list providers.
pub struct Keeper {
    engine: Arc<dyn StorageEngine>,
    batch_size: usize,
}

impl Keeper {
    /// Creates a keeper over `engine`, iterating in batches of `batch_size`
    /// entries (clamped to at least 1).
    #[must_use]
    pub fn new(engine: Arc<dyn StorageEngine>, batch_size: usize) -> Self {
        Self {
            engine,
            batch_size: batch_size.max(1),
        }
    }

    /// Stores a new provider record keyed by its owner.
    ///
    /// The record is validated first, then the owner is checked for an
    /// existing entry. On any error the store is left unchanged.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidArgument`] if the record fails validation
    /// - [`RegistryError::AlreadyExists`] if the owner already has a provider
    /// - [`RegistryError::Internal`] if the store cannot be read or written
    pub fn create(&self, provider: &Provider) -> Result<(), RegistryError> {
        provider.validate()?;

        let key = keys::provider_key(&provider.owner);
        if self.engine.contains_key(&key)? {
            debug!(owner = %provider.owner, "rejecting duplicate provider");
            return Err(RegistryError::AlreadyExists {
                owner: provider.owner.clone(),
            });
        }

        let value = encode(provider)?;
        self.engine.put(&key, &value)?;
        info!(owner = %provider.owner, host_uri = %provider.host_uri, "provider created");
        Ok(())
    }

    /// Looks up the provider registered by `owner` against live state.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Internal`] if the store cannot be read or the
    /// stored record cannot be decoded.
    pub fn get(&self, owner: &Owner) -> Result<Option<Provider>, RegistryError> {
        read_provider(self.engine.as_ref(), owner)
    }

    /// Iterates all providers in owner order against live state, starting at
    /// the first owner `>= start` (or the first owner when `start` is `None`).
    #[must_use]
    pub fn iter(&self, ctx: &QueryContext, start: Option<&[u8]>) -> ProviderIter<dyn StorageEngine> {
        ProviderIter::new(Arc::clone(&self.engine), ctx.clone(), start, self.batch_size)
    }

    /// Pins a read-only view to the current store contents.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Internal`] if the snapshot cannot be opened.
    pub fn snapshot(&self) -> Result<KeeperView, RegistryError> {
        Ok(KeeperView::new(self.engine.snapshot()?, self.batch_size))
    }
}

// ---------------------------------------------------------------------------
// KeeperView
// ---------------------------------------------------------------------------

/// Read-only registry access over a consistent snapshot.
#[derive(Clone)]
pub struct KeeperView {
    reader: Arc<dyn StoreReader>,
    batch_size: usize,
}

impl KeeperView {
    /// Wraps an existing read view, e.g. one supplied by the caller's
    /// execution context.
    #[must_use]
    pub fn new(reader: Arc<dyn StoreReader>, batch_size: usize) -> Self {
        Self {
            reader,
            batch_size: batch_size.max(1),
        }
    }

    /// Looks up the provider registered by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Internal`] if the store cannot be read or the
    /// stored record cannot be decoded.
    pub fn get(&self, owner: &Owner) -> Result<Option<Provider>, RegistryError> {
        read_provider(self.reader.as_ref(), owner)
    }

    /// Iterates all providers in owner order, starting at the first owner
    /// `>= start` (or the first owner when `start` is `None`).
    #[must_use]
    pub fn iter(&self, ctx: &QueryContext, start: Option<&[u8]>) -> ProviderIter<dyn StoreReader> {
        ProviderIter::new(Arc::clone(&self.reader), ctx.clone(), start, self.batch_size)
    }
}

// ---------------------------------------------------------------------------
// ProviderIter
// ---------------------------------------------------------------------------

/// Lazy, ordered traversal of provider records.
///
/// Yields `(owner bytes, provider)` pairs. The context is checked before every
/// item; the first error (cancellation, storage or decode) is yielded once and
/// ends the traversal. Calling [`Keeper::iter`] again restarts from scratch.
pub struct ProviderIter<S: ?Sized> {
    store: Arc<S>,
    ctx: QueryContext,
    cursor: IterationCursor,
    buffer: VecDeque<(Vec<u8>, Vec<u8>)>,
    batch_size: usize,
    done: bool,
}

impl<S: StoreReader + ?Sized> ProviderIter<S> {
    fn new(store: Arc<S>, ctx: QueryContext, start: Option<&[u8]>, batch_size: usize) -> Self {
        Self {
            store,
            ctx,
            cursor: start_cursor(start),
            buffer: VecDeque::new(),
            batch_size,
            done: false,
        }
    }

    fn fail(&mut self, err: RegistryError) -> Option<<Self as Iterator>::Item> {
        self.done = true;
        Some(Err(err))
    }

    fn refill(&mut self) -> Result<(), RegistryError> {
        if self.cursor.finished {
            return Ok(());
        }
        let fetched = self.store.fetch_entries(&self.cursor, self.batch_size)?;
        self.buffer.extend(fetched.items);
        self.cursor = fetched.next_cursor;
        Ok(())
    }
}

impl<S: StoreReader + ?Sized> Iterator for ProviderIter<S> {
    type Item = Result<(Vec<u8>, Provider), RegistryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Err(e) = self.ctx.check() {
            debug!(error = %e, "provider traversal aborted");
            return self.fail(e);
        }
        if self.buffer.is_empty() {
            if let Err(e) = self.refill() {
                warn!(error = %e, "provider traversal failed");
                return self.fail(e);
            }
        }

        let Some((key, value)) = self.buffer.pop_front() else {
            self.done = true;
            return None;
        };
        // Keys past the provider prefix belong to other record types.
        let Some(owner) = keys::owner_bytes(&key) else {
            self.done = true;
            self.buffer.clear();
            return None;
        };

        match decode(owner, &value) {
            Ok(provider) => Some(Ok((owner.to_vec(), provider))),
            Err(e) => {
                warn!(error = %e, "stored provider is unreadable");
                self.fail(e)
            }
        }
    }
}

impl<S: StoreReader + ?Sized> FusedIterator for ProviderIter<S> {}
