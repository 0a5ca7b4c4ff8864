//! Durable [`StorageEngine`] implementation backed by an embedded `redb` database.
//!
//! All entries live in a single table keyed by raw bytes. `redb` orders keys
//! of type `&[u8]` lexicographically, which is the order the engine contract
//! requires. Every write is its own committed transaction; snapshots are
//! `redb` read transactions.

use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use parking_lot::Mutex;
use redb::backends::InMemoryBackend;
use redb::{Database, ReadTransaction, ReadableTable, TableDefinition};
use tracing::debug;

use crate::storage::engine::{FetchResult, IterationCursor, StorageEngine, StoreReader};

const ENTRIES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("entries");

fn fetch_range(
    table: &impl ReadableTable<&'static [u8], &'static [u8]>,
    cursor: &IterationCursor,
    size: usize,
) -> anyhow::Result<FetchResult<(Vec<u8>, Vec<u8>)>> {
    if cursor.finished {
        return Ok(FetchResult::from_entries(Vec::new(), size));
    }
    let range = table
        .range::<&[u8]>((cursor.lower_bound(), Bound::Unbounded))
        .context("open range over entries table")?;

    let mut items = Vec::with_capacity(size.min(1024));
    for entry in range.take(size) {
        let (key, value) = entry.context("read entry")?;
        items.push((key.value().to_vec(), value.value().to_vec()));
    }
    Ok(FetchResult::from_entries(items, size))
}

/// Ordered storage persisted by `redb`.
pub struct RedbStorage {
    db: Database,
}

impl RedbStorage {
    /// Opens (or creates) a database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let db = Database::create(path)
            .with_context(|| format!("open redb database at {}", path.display()))?;
        debug!(path = %path.display(), "opened redb storage");
        Self::init(db)
    }

    /// Creates a database that lives only in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> anyhow::Result<Self> {
        let db = redb::Builder::new()
            .create_with_backend(InMemoryBackend::new())
            .context("create in-memory redb database")?;
        Self::init(db)
    }

    /// Creates the entries table so read transactions can always open it.
    fn init(db: Database) -> anyhow::Result<Self> {
        let txn = db.begin_write().context("begin write transaction")?;
        txn.open_table(ENTRIES).context("create entries table")?;
        txn.commit().context("commit table creation")?;
        Ok(Self { db })
    }

    fn begin_read(&self) -> anyhow::Result<ReadTransaction> {
        self.db.begin_read().context("begin read transaction")
    }
}

impl StoreReader for RedbStorage {
    fn get(&self, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
        let txn = self.begin_read()?;
        read_value(&txn, key)
    }

    fn fetch_entries(
        &self,
        cursor: &IterationCursor,
        size: usize,
    ) -> anyhow::Result<FetchResult<(Vec<u8>, Vec<u8>)>> {
        let txn = self.begin_read()?;
        let table = txn.open_table(ENTRIES).context("open entries table")?;
        fetch_range(&table, cursor, size)
    }
}

impl StorageEngine for RedbStorage {
    fn put(&self, key: &[u8], value: &[u8]) -> anyhow::Result<()> {
        let txn = self.db.begin_write().context("begin write transaction")?;
        {
            let mut table = txn.open_table(ENTRIES).context("open entries table")?;
            table.insert(key, value).context("insert entry")?;
        }
        // Dropping an uncommitted transaction aborts it, so a failed insert
        // leaves the store unchanged.
        txn.commit().context("commit entry")?;
        Ok(())
    }

    fn snapshot(&self) -> anyhow::Result<Arc<dyn StoreReader>> {
        let txn = self.begin_read()?;
        Ok(Arc::new(RedbSnapshot {
            txn: Mutex::new(txn),
        }))
    }
}

fn read_value(txn: &ReadTransaction, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
    let table = txn.open_table(ENTRIES).context("open entries table")?;
    let value = table.get(key).context("read entry")?;
    Ok(value.map(|v| v.value().to_vec()))
}

/// A `redb` read transaction pinned for the lifetime of the view.
struct RedbSnapshot {
    txn: Mutex<ReadTransaction>,
}

impl StoreReader for RedbSnapshot {
    fn get(&self, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
        read_value(&self.txn.lock(), key)
    }

    fn fetch_entries(
        &self,
        cursor: &IterationCursor,
        size: usize,
    ) -> anyhow::Result<FetchResult<(Vec<u8>, Vec<u8>)>> {
        let txn = self.txn.lock();
        let table = txn.open_table(ENTRIES).context("open entries table")?;
        fetch_range(&table, cursor, size)
    }
}
