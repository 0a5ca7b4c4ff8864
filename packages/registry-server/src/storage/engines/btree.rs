//! In-memory [`StorageEngine`] implementation backed by a [`BTreeMap`].
//!
//! Keys are kept sorted, so range fetches walk the map directly. Suitable for
//! tests and ephemeral nodes where all data fits in memory.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::storage::engine::{FetchResult, IterationCursor, StorageEngine, StoreReader};

type Entries = BTreeMap<Vec<u8>, Vec<u8>>;

fn fetch_range(
    entries: &Entries,
    cursor: &IterationCursor,
    size: usize,
) -> FetchResult<(Vec<u8>, Vec<u8>)> {
    if cursor.finished {
        return FetchResult::from_entries(Vec::new(), size);
    }
    let range = (cursor.lower_bound(), Bound::Unbounded);
    let items: Vec<(Vec<u8>, Vec<u8>)> = entries
        .range::<[u8], _>(range)
        .take(size)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    FetchResult::from_entries(items, size)
}

/// In-memory ordered storage guarded by a reader-writer lock.
///
/// Readers run concurrently. A write holds the lock only for the single
/// insert, so a fetch never observes a half-applied write. Snapshots share the
/// map; the next write after a snapshot copies it.
#[derive(Default)]
pub struct BTreeMapStorage {
    entries: RwLock<Arc<Entries>>,
}

impl BTreeMapStorage {
    /// Creates a new, empty `BTreeMapStorage`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl StoreReader for BTreeMapStorage {
    fn get(&self, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn fetch_entries(
        &self,
        cursor: &IterationCursor,
        size: usize,
    ) -> anyhow::Result<FetchResult<(Vec<u8>, Vec<u8>)>> {
        Ok(fetch_range(&self.entries.read(), cursor, size))
    }

    fn contains_key(&self, key: &[u8]) -> anyhow::Result<bool> {
        Ok(self.entries.read().contains_key(key))
    }
}

impl StorageEngine for BTreeMapStorage {
    fn put(&self, key: &[u8], value: &[u8]) -> anyhow::Result<()> {
        let mut entries = self.entries.write();
        Arc::make_mut(&mut entries).insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn snapshot(&self) -> anyhow::Result<Arc<dyn StoreReader>> {
        let frozen = Arc::clone(&self.entries.read());
        Ok(Arc::new(FrozenEntries(frozen)))
    }
}

/// Point-in-time copy of a [`BTreeMapStorage`].
struct FrozenEntries(Arc<Entries>);

impl StoreReader for FrozenEntries {
    fn get(&self, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.0.get(key).cloned())
    }

    fn fetch_entries(
        &self,
        cursor: &IterationCursor,
        size: usize,
    ) -> anyhow::Result<FetchResult<(Vec<u8>, Vec<u8>)>> {
        Ok(fetch_range(&self.0, cursor, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(result: &FetchResult<(Vec<u8>, Vec<u8>)>) -> Vec<String> {
        result
            .items
            .iter()
            .map(|(k, _)| String::from_utf8_lossy(k).into_owned())
            .collect()
    }

    #[test]
    fn put_get_round_trip() {
        let storage = BTreeMapStorage::new();
        assert!(storage.get(b"key1").unwrap().is_none());

        storage.put(b"key1", b"value").unwrap();
        assert_eq!(storage.get(b"key1").unwrap().as_deref(), Some(&b"value"[..]));
        assert!(storage.contains_key(b"key1").unwrap());
        assert!(!storage.contains_key(b"key2").unwrap());
    }

    #[test]
    fn put_replaces_existing_value() {
        let storage = BTreeMapStorage::new();
        storage.put(b"k", b"one").unwrap();
        storage.put(b"k", b"two").unwrap();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get(b"k").unwrap().as_deref(), Some(&b"two"[..]));
    }

    #[test]
    fn fetch_is_ordered_regardless_of_insert_order() {
        let storage = BTreeMapStorage::new();
        for k in ["c", "a", "e", "b", "d"] {
            storage.put(k.as_bytes(), b"").unwrap();
        }

        let first = storage.fetch_entries(&IterationCursor::start(), 3).unwrap();
        assert_eq!(keys(&first), vec!["a", "b", "c"]);
        assert!(!first.next_cursor.finished);

        let second = storage.fetch_entries(&first.next_cursor, 3).unwrap();
        assert_eq!(keys(&second), vec!["d", "e"]);
        assert!(second.next_cursor.finished);

        let after_end = storage.fetch_entries(&second.next_cursor, 3).unwrap();
        assert!(after_end.items.is_empty());
    }

    #[test]
    fn fetch_from_inclusive_key() {
        let storage = BTreeMapStorage::new();
        for k in ["a", "b", "c"] {
            storage.put(k.as_bytes(), b"").unwrap();
        }

        let at_b = storage.fetch_entries(&IterationCursor::at("b"), 10).unwrap();
        assert_eq!(keys(&at_b), vec!["b", "c"]);

        let between = storage.fetch_entries(&IterationCursor::at("bb"), 10).unwrap();
        assert_eq!(keys(&between), vec!["c"]);
    }

    #[test]
    fn fetch_is_restartable() {
        let storage = BTreeMapStorage::new();
        for k in ["x", "y", "z"] {
            storage.put(k.as_bytes(), b"").unwrap();
        }
        let once = storage.fetch_entries(&IterationCursor::start(), 2).unwrap();
        let twice = storage.fetch_entries(&IterationCursor::start(), 2).unwrap();
        assert_eq!(once.items, twice.items);
    }

    #[test]
    fn snapshot_ignores_later_writes() {
        let storage = BTreeMapStorage::new();
        storage.put(b"a", b"1").unwrap();

        let view = storage.snapshot().unwrap();
        storage.put(b"b", b"2").unwrap();

        assert!(view.get(b"b").unwrap().is_none());
        let all = view.fetch_entries(&IterationCursor::start(), 10).unwrap();
        assert_eq!(keys(&all), vec!["a"]);
        assert_eq!(storage.len(), 2);
    }
}
