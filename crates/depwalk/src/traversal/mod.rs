//! Breadth-first dependency traversal over a [`DocumentStore`].
//!
//! The store offers no graph queries, so the transitive dependency set of a
//! library is rebuilt level by level from two primitives: a name lookup for
//! the root and point reads for everything else.
//!
//! # Algorithm
//!
//! 1. Resolve the root with [`DocumentStore::find_by_name`] and admit it to a
//!    fresh [`DepthTracker`] at depth 0.
//! 2. For each level `1..=depth`:
//!    - [`frontier::expand`] lists the not-yet-tracked dependencies of the
//!      nodes found at the previous level, sorted and deduplicated.
//!    - The optional [`KnownIdFilter`] drops ids that cannot exist.
//!    - The remaining refs are point-read with at most
//!      [`TraversalOptions::max_concurrent_lookups`] requests in flight.
//!    - Results are admitted to the tracker at the current depth, hits and
//!      misses alike, so no id is ever read twice.
//! 3. [`TraversalResult::aggregate`] turns the tracker into the report.
//!
//! Levels never overlap: level `d` starts only after every lookup of level
//! `d - 1` has been merged.
//!
//! # Failure handling
//!
//! Only argument errors are returned as `Err`. A missing root yields an empty
//! result; a store failure or an expired timeout ends the run early and
//! returns what was collected so far, with the reason recorded in
//! [`TraversalResult::outcome`].
//!
//! # Example
//!
//! ```
//! use depwalk::domain::Node;
//! use depwalk::store::in_memory::InMemoryStore;
//! use depwalk::traversal::DependencyGraph;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> depwalk::error::Result<()> {
//!     let (store, _) = InMemoryStore::from_nodes([
//!         Node::new("flask", "f", "flask").with_dependency("click", "c"),
//!         Node::new("click", "c", "click"),
//!     ]);
//!     let graph = DependencyGraph::new(Arc::new(store));
//!
//!     let result = graph.traverse("flask", 1).await?;
//!     assert_eq!(result.depth_of("click"), Some(1));
//!     Ok(())
//! }
//! ```

pub mod filter;
pub mod frontier;
pub mod result;
pub mod tracker;

pub use filter::{KnownIdFilter, KnownIdSet};
pub use result::{TraversalOutcome, TraversalResult, TraversalStats};
pub use tracker::{DepthTracker, Resolution};

use crate::domain::{DependencyRef, NodeId};
use crate::error::{ConfigError, Result, StoreResult};
use crate::store::DocumentStore;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Default cap on concurrent point reads within one level.
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 16;

/// Tuning knobs for a [`DependencyGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalOptions {
    /// Maximum point reads in flight at once. Must be at least 1.
    pub max_concurrent_lookups: usize,

    /// Overall time budget for one run. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl TraversalOptions {
    /// Check option values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConcurrency`] if
    /// `max_concurrent_lookups` is 0.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.max_concurrent_lookups == 0 {
            return Err(ConfigError::InvalidConcurrency(self.max_concurrent_lookups));
        }
        Ok(())
    }
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
            timeout: None,
        }
    }
}

/// Mutable state of one run. Never shared between runs.
struct RunState {
    tracker: DepthTracker,
    /// Ids the filter rejected. Counted once each; never admitted.
    filtered: HashSet<NodeId>,
    stats: TraversalStats,
    requested_depth: usize,
    level: usize,
}

/// Traversal engine bound to a store.
///
/// Holds no per-run state, so one instance can serve any number of
/// concurrent [`traverse`](Self::traverse) calls.
#[derive(Clone)]
pub struct DependencyGraph {
    store: Arc<dyn DocumentStore>,
    filter: Option<Arc<dyn KnownIdFilter>>,
    options: TraversalOptions,
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("store", &"<dyn DocumentStore>")
            .field("filter", &self.filter.as_ref().map(|_| "<dyn KnownIdFilter>"))
            .field("options", &self.options)
            .finish()
    }
}

impl DependencyGraph {
    /// Create an engine with default options and no known-id filter.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            filter: None,
            options: TraversalOptions::default(),
        }
    }

    /// Skip lookups for ids the filter rejects.
    #[must_use]
    pub fn with_filter(mut self, filter: Arc<dyn KnownIdFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Replace the traversal options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConcurrency`] for a zero concurrency cap.
    pub fn with_options(mut self, options: TraversalOptions) -> Result<Self> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &TraversalOptions {
        &self.options
    }

    /// Collect the dependencies of `root_name` out to `depth` levels.
    ///
    /// `depth` 0 returns just the root. The result always comes back, even
    /// when the root is unknown or the store fails part-way; check
    /// [`TraversalResult::outcome`] to tell a complete run from a partial one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NegativeDepth`] or [`ConfigError::EmptyRootName`]
    /// before contacting the store. Store failures are never returned.
    pub async fn traverse(&self, root_name: &str, depth: i64) -> Result<TraversalResult> {
        let requested_depth =
            usize::try_from(depth).map_err(|_| ConfigError::NegativeDepth(depth))?;
        if root_name.trim().is_empty() {
            return Err(ConfigError::EmptyRootName.into());
        }

        let started_at = Utc::now();
        let clock = Instant::now();
        info!(root = root_name, depth = requested_depth, "Starting traversal");

        let mut state = RunState {
            tracker: DepthTracker::new(),
            filtered: HashSet::new(),
            stats: TraversalStats::default(),
            requested_depth,
            level: 0,
        };

        let outcome = match self.options.timeout {
            Some(limit) => {
                let timed = tokio::time::timeout(limit, self.run(root_name, &mut state)).await;
                match timed {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!(
                            root = root_name,
                            level = state.level,
                            timeout_ms = limit.as_millis(),
                            "Traversal timed out; returning partial result"
                        );
                        TraversalOutcome::TimedOut { level: state.level }
                    }
                }
            }
            None => self.run(root_name, &mut state).await,
        };

        let elapsed = clock.elapsed();
        info!(
            root = root_name,
            collected = state.tracker.len() - state.tracker.missing_count(),
            missing = state.tracker.missing_count(),
            point_reads = state.stats.point_reads,
            elapsed_ms = elapsed.as_millis(),
            outcome = ?outcome,
            "Traversal finished"
        );

        Ok(TraversalResult::aggregate(
            root_name,
            requested_depth,
            state.tracker,
            outcome,
            state.stats,
            started_at,
            elapsed,
        ))
    }

    /// Drive the level loop. Never fails; failures become outcomes.
    async fn run(&self, root_name: &str, state: &mut RunState) -> TraversalOutcome {
        let root = match self.store.find_by_name(root_name).await {
            Ok(Some(node)) => node,
            Ok(None) => {
                info!(root = root_name, "Root library not found");
                return TraversalOutcome::RootNotFound;
            }
            Err(e) => {
                warn!(root = root_name, error = %e, "Root lookup failed; returning empty result");
                return TraversalOutcome::Aborted {
                    level: 0,
                    reason: e.to_string(),
                };
            }
        };
        state
            .tracker
            .admit(root.id.clone(), Resolution::Found(root), 0);

        for level in 1..=state.requested_depth {
            state.level = level;

            let (refs, filtered) =
                self.apply_filter(frontier::expand(&state.tracker, level), &mut state.filtered);
            state.stats.filtered_out = state.filtered.len();
            if refs.is_empty() {
                debug!(level, filtered, "Frontier exhausted");
                break;
            }

            debug!(level, frontier = refs.len(), filtered, "Resolving level");
            if let Err(e) = self.resolve_level(refs, level, state).await {
                warn!(level, error = %e, "Store failure; returning partial result");
                return TraversalOutcome::Aborted {
                    level,
                    reason: e.to_string(),
                };
            }
            state.stats.levels_completed = level;
        }

        TraversalOutcome::Completed
    }

    /// Split off refs the known-id filter rejects. Returns the kept refs and
    /// the number dropped at this level; rejected ids are added to `rejected`.
    fn apply_filter(
        &self,
        refs: Vec<DependencyRef>,
        rejected: &mut HashSet<NodeId>,
    ) -> (Vec<DependencyRef>, usize) {
        let Some(filter) = &self.filter else {
            return (refs, 0);
        };

        let before = refs.len();
        let kept: Vec<DependencyRef> = refs
            .into_iter()
            .filter(|dep| {
                let keep = filter.may_exist(&dep.id);
                if !keep && rejected.insert(dep.id.clone()) {
                    trace!(id = %dep.id, "Skipping id unknown to the corpus");
                }
                keep
            })
            .collect();
        let dropped = before - kept.len();
        (kept, dropped)
    }

    /// Point-read every ref with bounded parallelism and admit the results.
    ///
    /// This task is the only writer to the tracker. `buffered` yields in
    /// input order, so admission order is deterministic. On the first store
    /// error the remaining lookups are dropped and the error is returned;
    /// results admitted before it stay.
    async fn resolve_level(
        &self,
        refs: Vec<DependencyRef>,
        level: usize,
        state: &mut RunState,
    ) -> StoreResult<()> {
        let store = &self.store;
        let mut lookups = stream::iter(refs)
            .map(|dep| async move {
                let result = store.point_read(&dep.id, &dep.partition_key).await;
                (dep, result)
            })
            .buffered(self.options.max_concurrent_lookups);

        while let Some((dep, result)) = lookups.next().await {
            state.stats.point_reads += 1;
            let resolution = match result? {
                Some(node) => {
                    trace!(id = %dep.id, level, "Resolved dependency");
                    Resolution::Found(node)
                }
                None => {
                    trace!(id = %dep.id, level, "Dependency not in store");
                    state.stats.misses += 1;
                    Resolution::Missing {
                        partition_key: dep.partition_key,
                    }
                }
            };
            state.tracker.admit(dep.id, resolution, level);
        }

        Ok(())
    }
}
