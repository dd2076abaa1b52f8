//! Known-id filtering.
//!
//! The indexed corpus is a small subset of the ids its documents reference.
//! A [`KnownIdFilter`] lets the traversal skip point reads that are certain
//! to miss. Ids the filter rejects are neither looked up nor recorded as
//! attempted.

use crate::domain::NodeId;
use crate::error::Result;
use std::collections::HashSet;
use std::path::Path;

/// Existence pre-check for dependency ids.
///
/// Must return `true` for every id that exists in the store. Returning
/// `true` for absent ids is allowed and only costs a wasted lookup.
pub trait KnownIdFilter: Send + Sync {
    /// Whether `id` may exist in the store.
    fn may_exist(&self, id: &NodeId) -> bool;
}

/// A precomputed set of ids known to exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownIdSet {
    ids: HashSet<NodeId>,
}

impl KnownIdSet {
    /// Create an empty set (rejects every id).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an id. Returns `false` if it was already present.
    pub fn insert(&mut self, id: impl Into<NodeId>) -> bool {
        self.ids.insert(id.into())
    }

    /// Number of ids in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Add every id of `other`.
    pub fn merge(&mut self, other: KnownIdSet) {
        self.ids.extend(other.ids);
    }

    /// Parse a newline-separated id list.
    ///
    /// Surrounding whitespace is trimmed; blank lines and lines starting
    /// with `#` are ignored.
    ///
    /// ```
    /// use depwalk::domain::NodeId;
    /// use depwalk::traversal::filter::{KnownIdFilter, KnownIdSet};
    ///
    /// let set = KnownIdSet::parse("# indexed\nflask\n\n  click \n");
    /// assert_eq!(set.len(), 2);
    /// assert!(set.may_exist(&NodeId::new("click")));
    /// ```
    #[must_use]
    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(NodeId::from)
            .collect()
    }

    /// Load an id list from a file. See [`parse`](Self::parse) for the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let set = Self::parse(&content);
        tracing::debug!(path = %path.display(), ids = set.len(), "Loaded known-id list");
        Ok(set)
    }
}

impl FromIterator<NodeId> for KnownIdSet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl KnownIdFilter for KnownIdSet {
    fn may_exist(&self, id: &NodeId) -> bool {
        self.ids.contains(id)
    }
}
