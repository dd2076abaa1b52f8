//! Document store abstraction.
//!
//! The traversal engine only needs two primitives from the backing store: a
//! point read by `(id, partition key)` and a single-result lookup by library
//! name. [`DocumentStore`] captures exactly those (plus a document count for
//! the CLI) so that any key/value document database can sit behind it.
//!
//! Implementations:
//!
//! - [`in_memory::InMemoryStore`]: documents held in a `HashMap`, loaded from
//!   a JSONL export or a JSON object map.
//! - `RecordingStore` (`test-util` feature): wraps another store, counts
//!   calls and injects failures or latency.
//!
//! # Not found is not an error
//!
//! Both lookups return `Ok(None)` when no document matches. `Err` is reserved
//! for failures of the store itself ([`StoreError`](crate::error::StoreError)),
//! which callers may treat as transient.

use crate::domain::{Node, NodeId};
use crate::error::StoreResult;
use async_trait::async_trait;

pub mod in_memory;

#[cfg(any(test, feature = "test-util"))]
mod recording;

#[cfg(any(test, feature = "test-util"))]
pub use recording::RecordingStore;

/// Read access to a collection of library documents.
///
/// The trait is object-safe; the engine holds it as
/// `Arc<dyn DocumentStore>` and may issue calls concurrently, so
/// implementations must be `Send + Sync` and handle their own
/// connection-level backpressure.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find the document whose `name` equals `name` exactly (case-sensitive).
    ///
    /// If several documents share the name, one of them is returned.
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Node>>;

    /// Read one document by id and partition key.
    async fn point_read(&self, id: &NodeId, partition_key: &str) -> StoreResult<Option<Node>>;

    /// Number of documents in the store.
    async fn count(&self) -> StoreResult<usize>;
}
