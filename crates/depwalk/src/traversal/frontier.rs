//! Frontier expansion.
//!
//! Given the tracker state after level `level - 1` has been merged, compute
//! the dependency references to resolve at `level`.

use super::tracker::DepthTracker;
use crate::domain::{DependencyRef, NodeId};
use std::collections::{BTreeMap, HashSet};

/// Dependency references to resolve at `level`.
///
/// Only nodes discovered at `level - 1` are scanned. A reference is emitted
/// when its id is not already tracked (found or attempted), which also rules
/// out self-dependencies. The output is deduplicated by id and ordered by
/// [`DependencyRef::composite_key`]; when two refs share an id with
/// different partition keys, the one ordering first is kept.
///
/// `level` 0 has no predecessor and always yields an empty frontier.
#[must_use]
pub fn expand(tracker: &DepthTracker, level: usize) -> Vec<DependencyRef> {
    let Some(previous) = level.checked_sub(1) else {
        return Vec::new();
    };

    let candidates: BTreeMap<String, &DependencyRef> = tracker
        .entries_at_depth(previous)
        .flat_map(|entry| entry.node.dependencies.iter())
        .filter(|dep| !tracker.contains(&dep.id))
        .map(|dep| (dep.composite_key(), dep))
        .collect();

    let mut seen: HashSet<NodeId> = HashSet::with_capacity(candidates.len());
    candidates
        .into_values()
        .filter(|dep| seen.insert(dep.id.clone()))
        .cloned()
        .collect()
}
