//! Instrumented store wrapper for tests.

use crate::domain::{Node, NodeId};
use crate::error::{StoreError, StoreResult};
use crate::store::DocumentStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Store wrapper that records every call and can inject failures.
///
/// Wrap any [`DocumentStore`] to observe how a traversal uses it:
///
/// - per-id point read counts ([`point_reads_for`](Self::point_reads_for))
/// - the order of point reads ([`point_read_log`](Self::point_read_log))
/// - the peak number of concurrent calls ([`max_in_flight`](Self::max_in_flight))
///
/// Failures are injected per id with [`fail_point_read`](Self::fail_point_read)
/// or for name lookups with [`fail_find_by_name`](Self::fail_find_by_name).
/// [`with_latency`](Self::with_latency) delays every call.
///
/// Available in tests and with the `test-util` feature.
///
/// ```rust,ignore
/// let store = Arc::new(RecordingStore::new(inner));
/// let graph = DependencyGraph::new(store.clone());
/// graph.traverse("flask", 2).await?;
/// assert_eq!(store.point_reads_for("click"), 1);
/// ```
pub struct RecordingStore<S> {
    inner: S,
    latency: Option<Duration>,
    point_read_failures: HashMap<NodeId, StoreError>,
    find_failure: Option<StoreError>,
    point_reads: Mutex<Vec<NodeId>>,
    name_lookups: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl<S: DocumentStore> RecordingStore<S> {
    /// Wrap a store.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            latency: None,
            point_read_failures: HashMap::new(),
            find_failure: None,
            point_reads: Mutex::new(Vec::new()),
            name_lookups: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Delay every call by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make point reads of `id` fail with `error`.
    #[must_use]
    pub fn fail_point_read(mut self, id: impl Into<NodeId>, error: StoreError) -> Self {
        self.point_read_failures.insert(id.into(), error);
        self
    }

    /// Make every name lookup fail with `error`.
    #[must_use]
    pub fn fail_find_by_name(mut self, error: StoreError) -> Self {
        self.find_failure = Some(error);
        self
    }

    /// Ids passed to `point_read`, in call order.
    #[must_use]
    pub fn point_read_log(&self) -> Vec<NodeId> {
        self.point_reads
            .lock()
            .expect("recording mutex should not be poisoned")
            .clone()
    }

    /// Number of point reads issued for `id`.
    #[must_use]
    pub fn point_reads_for(&self, id: &str) -> usize {
        self.point_reads
            .lock()
            .expect("recording mutex should not be poisoned")
            .iter()
            .filter(|read| read.as_str() == id)
            .count()
    }

    /// Total number of point reads.
    #[must_use]
    pub fn point_read_count(&self) -> usize {
        self.point_reads
            .lock()
            .expect("recording mutex should not be poisoned")
            .len()
    }

    /// Per-id point read counts.
    #[must_use]
    pub fn point_read_counts(&self) -> HashMap<NodeId, usize> {
        let mut counts = HashMap::new();
        for id in self.point_read_log() {
            *counts.entry(id).or_insert(0) += 1;
        }
        counts
    }

    /// Names passed to `find_by_name`, in call order.
    #[must_use]
    pub fn name_lookups(&self) -> Vec<String> {
        self.name_lookups
            .lock()
            .expect("recording mutex should not be poisoned")
            .clone()
    }

    /// Highest number of calls that were in progress at the same time.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for RecordingStore<S> {
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Node>> {
        self.name_lookups
            .lock()
            .expect("recording mutex should not be poisoned")
            .push(name.to_string());
        self.enter().await;
        let result = match &self.find_failure {
            Some(error) => Err(error.clone()),
            None => self.inner.find_by_name(name).await,
        };
        self.leave();
        result
    }

    async fn point_read(&self, id: &NodeId, partition_key: &str) -> StoreResult<Option<Node>> {
        self.point_reads
            .lock()
            .expect("recording mutex should not be poisoned")
            .push(id.clone());
        self.enter().await;
        let result = match self.point_read_failures.get(id) {
            Some(error) => Err(error.clone()),
            None => self.inner.point_read(id, partition_key).await,
        };
        self.leave();
        result
    }

    async fn count(&self) -> StoreResult<usize> {
        self.inner.count().await
    }
}
