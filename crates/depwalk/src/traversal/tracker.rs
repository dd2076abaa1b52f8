//! Per-run record of every id a traversal has resolved or attempted.
//!
//! The tracker is the single source of truth for "has this id been seen?".
//! Admission is first-writer-wins: once an id is present, later admissions
//! are ignored and its discovery depth is never revised. Ids whose lookup
//! missed are admitted too, so they are never looked up again.

use crate::domain::{CollectedEntry, MissingDependency, Node, NodeId};
use std::collections::HashMap;

/// Outcome of resolving one id.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The document exists.
    Found(Node),
    /// The lookup ran and found nothing.
    Missing {
        /// Partition key used for the lookup.
        partition_key: String,
    },
}

#[derive(Debug, Clone)]
enum Tracked {
    Found(CollectedEntry),
    Missing(MissingDependency),
}

impl Tracked {
    fn depth(&self) -> usize {
        match self {
            Self::Found(entry) => entry.discovery_depth,
            Self::Missing(missing) => missing.discovery_depth,
        }
    }
}

/// Dedup/depth tracker for one traversal run.
///
/// Ids are also indexed by depth in insertion order, so
/// [`entries_at_depth`](Self::entries_at_depth) costs time proportional to
/// that level only.
#[derive(Debug, Default)]
pub struct DepthTracker {
    entries: HashMap<NodeId, Tracked>,
    by_depth: Vec<Vec<NodeId>>,
    missing: usize,
}

impl DepthTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the resolution of `id` at `depth`.
    ///
    /// Returns `false` and changes nothing if `id` is already tracked.
    pub fn admit(&mut self, id: NodeId, resolution: Resolution, depth: usize) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }

        let tracked = match resolution {
            Resolution::Found(node) => Tracked::Found(CollectedEntry {
                node,
                discovery_depth: depth,
            }),
            Resolution::Missing { partition_key } => {
                self.missing += 1;
                Tracked::Missing(MissingDependency {
                    id: id.clone(),
                    partition_key,
                    discovery_depth: depth,
                })
            }
        };

        if self.by_depth.len() <= depth {
            self.by_depth.resize_with(depth + 1, Vec::new);
        }
        self.by_depth[depth].push(id.clone());
        self.entries.insert(id, tracked);
        true
    }

    /// Whether `id` has been found or attempted.
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.entries.contains_key(id)
    }

    /// Depth at which `id` was first admitted.
    #[must_use]
    pub fn depth_of(&self, id: &NodeId) -> Option<usize> {
        self.entries.get(id).map(Tracked::depth)
    }

    /// Found entries admitted at `depth`, in insertion order.
    ///
    /// Missing markers are skipped: they have no dependencies to expand.
    pub fn entries_at_depth(&self, depth: usize) -> impl Iterator<Item = &CollectedEntry> {
        self.by_depth
            .get(depth)
            .into_iter()
            .flatten()
            .filter_map(|id| match self.entries.get(id) {
                Some(Tracked::Found(entry)) => Some(entry),
                _ => None,
            })
    }

    /// Number of tracked ids, found or missing.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been admitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of ids whose lookup missed.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.missing
    }

    /// Split into found entries and missing markers.
    ///
    /// Missing markers come back ordered by depth, then insertion order.
    #[must_use]
    pub fn into_parts(mut self) -> (Vec<CollectedEntry>, Vec<MissingDependency>) {
        let mut found = Vec::with_capacity(self.entries.len() - self.missing);
        let mut missing = Vec::with_capacity(self.missing);
        for id in self.by_depth.into_iter().flatten() {
            match self.entries.remove(&id) {
                Some(Tracked::Found(entry)) => found.push(entry),
                Some(Tracked::Missing(marker)) => missing.push(marker),
                None => {}
            }
        }
        (found, missing)
    }
}
