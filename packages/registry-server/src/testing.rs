//! Shared fixtures for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use metrics::{
    Counter, CounterFn, Gauge, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder,
    SharedString, Unit,
};
use parking_lot::Mutex;
use provider_registry_core::{Attribute, Owner, Provider, ProviderInfo};

use crate::storage::engines::BTreeMapStorage;
use crate::storage::{FetchResult, IterationCursor, StorageEngine, StoreReader};

pub(crate) fn provider(owner: &str) -> Provider {
    Provider {
        owner: Owner::new(owner).unwrap(),
        host_uri: format!("https://{owner}.example.com:8443"),
        attributes: vec![
            Attribute::new("region", "us-west"),
            Attribute::new("organization", owner),
        ],
        info: ProviderInfo {
            email: format!("ops@{owner}.example.com"),
            website: String::new(),
        },
    }
}

/// In-memory engine that counts every read and write reaching it, including
/// reads through its snapshots.
#[derive(Default)]
pub(crate) struct CountingStorage {
    inner: BTreeMapStorage,
    reads: Arc<AtomicUsize>,
    writes: AtomicUsize,
}

impl CountingStorage {
    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl StoreReader for CountingStorage {
    fn get(&self, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn fetch_entries(
        &self,
        cursor: &IterationCursor,
        size: usize,
    ) -> anyhow::Result<FetchResult<(Vec<u8>, Vec<u8>)>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_entries(cursor, size)
    }
}

impl StorageEngine for CountingStorage {
    fn put(&self, key: &[u8], value: &[u8]) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value)
    }

    fn snapshot(&self) -> anyhow::Result<Arc<dyn StoreReader>> {
        Ok(Arc::new(CountingReader {
            inner: self.inner.snapshot()?,
            reads: Arc::clone(&self.reads),
        }))
    }
}

struct CountingReader {
    inner: Arc<dyn StoreReader>,
    reads: Arc<AtomicUsize>,
}

impl StoreReader for CountingReader {
    fn get(&self, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn fetch_entries(
        &self,
        cursor: &IterationCursor,
        size: usize,
    ) -> anyhow::Result<FetchResult<(Vec<u8>, Vec<u8>)>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_entries(cursor, size)
    }
}

/// Engine whose every operation fails, for error propagation tests.
pub(crate) struct FailingStorage;

impl StoreReader for FailingStorage {
    fn get(&self, _key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
        anyhow::bail!("storage offline")
    }

    fn fetch_entries(
        &self,
        _cursor: &IterationCursor,
        _size: usize,
    ) -> anyhow::Result<FetchResult<(Vec<u8>, Vec<u8>)>> {
        anyhow::bail!("storage offline")
    }
}

impl StorageEngine for FailingStorage {
    fn put(&self, _key: &[u8], _value: &[u8]) -> anyhow::Result<()> {
        anyhow::bail!("storage offline")
    }

    fn snapshot(&self) -> anyhow::Result<Arc<dyn StoreReader>> {
        Ok(Arc::new(FailingStorage))
    }
}

/// `metrics` recorder that keeps every counter and histogram in memory,
/// keyed as `name{label=value,...}` in call-site label order.
#[derive(Default)]
pub(crate) struct CapturingRecorder {
    counters: Mutex<HashMap<String, Arc<CapturedCounter>>>,
    histograms: Mutex<HashMap<String, Arc<CapturedHistogram>>>,
}

impl CapturingRecorder {
    pub(crate) fn counter(&self, key: &str) -> Option<u64> {
        self.counters
            .lock()
            .get(key)
            .map(|c| c.0.load(Ordering::SeqCst))
    }

    pub(crate) fn histogram(&self, key: &str) -> Vec<f64> {
        self.histograms
            .lock()
            .get(key)
            .map(|h| h.0.lock().clone())
            .unwrap_or_default()
    }
}

fn render_key(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|l| format!("{}={}", l.key(), l.value()))
        .collect();
    format!("{}{{{}}}", key.name(), labels.join(","))
}

#[derive(Default)]
struct CapturedCounter(AtomicU64);

impl CounterFn for CapturedCounter {
    fn increment(&self, value: u64) {
        self.0.fetch_add(value, Ordering::SeqCst);
    }

    fn absolute(&self, value: u64) {
        self.0.store(value, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct CapturedHistogram(Mutex<Vec<f64>>);

impl HistogramFn for CapturedHistogram {
    fn record(&self, value: f64) {
        self.0.lock().push(value);
    }
}

impl Recorder for CapturingRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        let counter = Arc::clone(self.counters.lock().entry(render_key(key)).or_default());
        Counter::from_arc(counter)
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        let histogram = Arc::clone(self.histograms.lock().entry(render_key(key)).or_default());
        Histogram::from_arc(histogram)
    }
}
