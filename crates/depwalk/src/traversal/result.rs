//! Traversal report.

use super::tracker::DepthTracker;
use crate::domain::{CollectedEntry, MissingDependency, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// How a traversal run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TraversalOutcome {
    /// Every requested level was processed, or the frontier ran dry.
    Completed,

    /// No document carries the root name.
    RootNotFound,

    /// A store failure stopped the run at `level`.
    Aborted {
        /// Level being resolved when the failure happened (0 = root lookup).
        level: usize,
        /// The store error message.
        reason: String,
    },

    /// The overall timeout expired while resolving `level`.
    TimedOut {
        /// Level being resolved when time ran out.
        level: usize,
    },
}

impl TraversalOutcome {
    /// Whether the run stopped before finishing.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Aborted { .. } | Self::TimedOut { .. })
    }
}

/// Lookup counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalStats {
    /// Point reads issued (including the ones that failed).
    pub point_reads: usize,
    /// Point reads that found nothing.
    pub misses: usize,
    /// Distinct ids skipped by the known-id filter.
    pub filtered_out: usize,
    /// Levels fully merged, not counting the root.
    pub levels_completed: usize,
}

/// Result of one traversal run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalResult {
    /// Library name the run started from.
    pub root_name: String,

    /// Depth the caller asked for.
    pub requested_depth: usize,

    /// Resolved nodes by id, each with its first-discovery depth.
    pub collected_nodes: BTreeMap<NodeId, CollectedEntry>,

    /// Dependencies that were looked up and not found.
    pub missing: Vec<MissingDependency>,

    /// How the run ended.
    pub outcome: TraversalOutcome,

    /// Lookup counters.
    pub stats: TraversalStats,

    /// Wall-clock time the run started.
    pub started_at: DateTime<Utc>,

    /// Run duration.
    #[serde(rename = "elapsed_ms", with = "duration_ms")]
    pub elapsed: Duration,
}

impl TraversalResult {
    /// Assemble the report from a finished tracker.
    ///
    /// Pure: performs no I/O.
    #[must_use]
    pub fn aggregate(
        root_name: impl Into<String>,
        requested_depth: usize,
        tracker: DepthTracker,
        outcome: TraversalOutcome,
        stats: TraversalStats,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        let (found, missing) = tracker.into_parts();
        let collected_nodes = found
            .into_iter()
            .map(|entry| (entry.node.id.clone(), entry))
            .collect();

        Self {
            root_name: root_name.into(),
            requested_depth,
            collected_nodes,
            missing,
            outcome,
            stats,
            started_at,
            elapsed,
        }
    }

    /// Number of collected nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collected_nodes.len()
    }

    /// Returns `true` if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collected_nodes.is_empty()
    }

    /// Whether `id` was collected.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.collected_nodes.contains_key(&NodeId::new(id))
    }

    /// Discovery depth of a collected node.
    #[must_use]
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        self.collected_nodes
            .get(&NodeId::new(id))
            .map(|entry| entry.discovery_depth)
    }

    /// Ids collected at `depth`, sorted.
    #[must_use]
    pub fn ids_at_depth(&self, depth: usize) -> Vec<&NodeId> {
        self.collected_nodes
            .iter()
            .filter(|(_, entry)| entry.discovery_depth == depth)
            .map(|(id, _)| id)
            .collect()
    }

    /// Deepest discovery depth among collected nodes.
    #[must_use]
    pub fn max_discovered_depth(&self) -> Option<usize> {
        self.collected_nodes
            .values()
            .map(|entry| entry.discovery_depth)
            .max()
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
