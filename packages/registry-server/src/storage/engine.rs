//! Ordered storage engine traits and cursor-based iteration types.
//!
//! Split into a read half ([`StoreReader`]) and a write half
//! ([`StorageEngine`]). Only the [`Keeper`](crate::keeper::Keeper) holds a
//! `StorageEngine`; queries run against read-only snapshots.

use std::ops::Bound;
use std::sync::Arc;

/// Restartable position for ordered iteration over storage entries.
///
/// Entries are always visited in ascending lexicographic key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationCursor {
    lower: Bound<Vec<u8>>,
    /// Whether iteration has completed (no more entries).
    pub finished: bool,
}

impl IterationCursor {
    /// Creates a cursor positioned at the first key.
    #[must_use]
    pub fn start() -> Self {
        Self {
            lower: Bound::Unbounded,
            finished: false,
        }
    }

    /// Creates a cursor positioned at `key`, inclusive.
    #[must_use]
    pub fn at(key: impl Into<Vec<u8>>) -> Self {
        Self {
            lower: Bound::Included(key.into()),
            finished: false,
        }
    }

    /// Creates a cursor positioned just past `key`.
    #[must_use]
    pub fn after(key: impl Into<Vec<u8>>) -> Self {
        Self {
            lower: Bound::Excluded(key.into()),
            finished: false,
        }
    }

    /// Lower bound of the next fetch.
    #[must_use]
    pub fn lower_bound(&self) -> Bound<&[u8]> {
        match &self.lower {
            Bound::Included(k) => Bound::Included(k.as_slice()),
            Bound::Excluded(k) => Bound::Excluded(k.as_slice()),
            Bound::Unbounded => Bound::Unbounded,
        }
    }
}

/// Result of a cursor-based fetch operation.
///
/// Contains the fetched items and an updated cursor for the next call.
#[derive(Debug)]
pub struct FetchResult<T> {
    /// The fetched items.
    pub items: Vec<T>,
    /// Updated cursor for the next fetch call.
    pub next_cursor: IterationCursor,
}

impl FetchResult<(Vec<u8>, Vec<u8>)> {
    /// Builds a fetch result from up to `size` entries read in key order.
    ///
    /// The next cursor resumes after the last returned key. Fewer entries than
    /// requested means the range is exhausted.
    #[must_use]
    pub fn from_entries(items: Vec<(Vec<u8>, Vec<u8>)>, size: usize) -> Self {
        let next_cursor = match items.last() {
            Some((key, _)) if items.len() >= size => IterationCursor::after(key.clone()),
            Some((key, _)) => IterationCursor {
                lower: Bound::Excluded(key.clone()),
                finished: true,
            },
            None => IterationCursor {
                lower: Bound::Unbounded,
                finished: true,
            },
        };
        Self { items, next_cursor }
    }
}

/// Read access to an ordered byte key-value store.
///
/// Iteration order is ascending on key bytes and deterministic: the same
/// contents always produce the same sequence. All operations are synchronous;
/// failures are opaque storage errors.
pub trait StoreReader: Send + Sync {
    /// Retrieve the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn get(&self, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>>;

    /// Fetch up to `size` entries (key + value) starting from `cursor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn fetch_entries(
        &self,
        cursor: &IterationCursor,
        size: usize,
    ) -> anyhow::Result<FetchResult<(Vec<u8>, Vec<u8>)>>;

    /// Check if a key exists without returning the value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn contains_key(&self, key: &[u8]) -> anyhow::Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Ordered key-value storage with a write path and point-in-time snapshots.
///
/// Wrapped in `Arc<dyn StorageEngine>` for sharing across threads. No locking
/// is implied across calls: serializing writers against readers of the same
/// key is the caller's job.
pub trait StorageEngine: StoreReader {
    /// Insert or replace the value under `key`.
    ///
    /// Either the whole value is written or the store is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the write could not be applied.
    fn put(&self, key: &[u8], value: &[u8]) -> anyhow::Result<()>;

    /// Return a consistent read-only view of the current contents.
    ///
    /// Later writes to the engine are not visible through the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the view could not be opened.
    fn snapshot(&self) -> anyhow::Result<Arc<dyn StoreReader>>;
}
