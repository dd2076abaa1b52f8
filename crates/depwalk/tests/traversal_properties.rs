//! Property tests for traversal over random dependency graphs.
//!
//! Every generated graph is checked against a plain breadth-first search
//! computed in the test itself.

use depwalk::domain::{Node, NodeId};
use depwalk::store::RecordingStore;
use depwalk::store::in_memory::InMemoryStore;
use depwalk::traversal::{DependencyGraph, KnownIdSet, TraversalOptions, TraversalResult};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

/// A generated graph. Node `i` has id `lib{i}`; targets at or beyond
/// `present` name libraries that are referenced but not stored.
#[derive(Debug, Clone)]
struct Graph {
    present: usize,
    edges: Vec<Vec<usize>>,
}

fn id(index: usize) -> String {
    format!("lib{index}")
}

fn arb_graph() -> impl Strategy<Value = Graph> {
    (1usize..16).prop_flat_map(|present| {
        let universe = present + 4;
        prop::collection::vec(prop::collection::vec(0..universe, 0..5), present)
            .prop_map(move |edges| Graph { present, edges })
    })
}

fn build_store(graph: &Graph) -> InMemoryStore {
    let nodes = graph.edges.iter().enumerate().map(|(i, deps)| {
        deps.iter().fold(Node::new(id(i), "p", id(i)), |node, &dep| {
            node.with_dependency(id(dep), "p")
        })
    });
    InMemoryStore::from_nodes(nodes).0
}

/// Reference BFS from `lib0`. Returns found depths and missing depths.
fn reference(
    graph: &Graph,
    depth: usize,
    allowed: Option<&HashSet<usize>>,
) -> (BTreeMap<String, usize>, BTreeMap<String, usize>) {
    let mut seen: BTreeMap<usize, usize> = BTreeMap::from([(0, 0)]);
    let mut queue = VecDeque::from([0usize]);
    while let Some(node) = queue.pop_front() {
        let d = seen[&node];
        if d == depth || node >= graph.present {
            continue;
        }
        for &dep in &graph.edges[node] {
            if seen.contains_key(&dep) || allowed.is_some_and(|set| !set.contains(&dep)) {
                continue;
            }
            seen.insert(dep, d + 1);
            queue.push_back(dep);
        }
    }

    let (found, missing): (Vec<_>, Vec<_>) =
        seen.into_iter().partition(|(node, _)| *node < graph.present);
    let named = |pairs: Vec<(usize, usize)>| -> BTreeMap<String, usize> {
        pairs.into_iter().map(|(n, d)| (id(n), d)).collect()
    };
    (named(found), named(missing))
}

fn found_depths(result: &TraversalResult) -> BTreeMap<String, usize> {
    result
        .collected_nodes
        .iter()
        .map(|(id, entry)| (id.to_string(), entry.discovery_depth))
        .collect()
}

fn missing_depths(result: &TraversalResult) -> BTreeMap<String, usize> {
    result
        .missing
        .iter()
        .map(|m| (m.id.to_string(), m.discovery_depth))
        .collect()
}

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn matches_breadth_first_search(
        graph in arb_graph(),
        depth in 0usize..6,
        concurrency in 1usize..6,
    ) {
        let store = Arc::new(RecordingStore::new(build_store(&graph)));
        let engine = DependencyGraph::new(store.clone())
            .with_options(TraversalOptions { max_concurrent_lookups: concurrency, timeout: None })
            .unwrap();

        let result = run(engine.traverse("lib0", i64::try_from(depth).unwrap())).unwrap();
        let (found, missing) = reference(&graph, depth, None);

        prop_assert_eq!(found_depths(&result), found);
        prop_assert_eq!(missing_depths(&result), missing);
        prop_assert!(result.max_discovered_depth().unwrap_or(0) <= depth);
    }

    #[test]
    fn never_looks_up_an_id_twice(graph in arb_graph(), depth in 0usize..8) {
        let store = Arc::new(RecordingStore::new(build_store(&graph)));
        let engine = DependencyGraph::new(store.clone());

        run(engine.traverse("lib0", i64::try_from(depth).unwrap())).unwrap();

        prop_assert!(store.point_read_counts().values().all(|&n| n == 1));
        prop_assert!(store.point_reads_for("lib0") == 0);
    }

    #[test]
    fn filter_rejects_are_neither_read_nor_reported(
        graph in arb_graph(),
        depth in 0usize..6,
        keep in prop::collection::hash_set(0usize..20, 0..20),
    ) {
        let store = Arc::new(RecordingStore::new(build_store(&graph)));
        let filter: KnownIdSet = keep.iter().map(|&i| NodeId::from(id(i))).collect();
        let engine = DependencyGraph::new(store.clone()).with_filter(Arc::new(filter));

        let result = run(engine.traverse("lib0", i64::try_from(depth).unwrap())).unwrap();
        let (found, missing) = reference(&graph, depth, Some(&keep));

        prop_assert_eq!(found_depths(&result), found);
        prop_assert_eq!(missing_depths(&result), missing);
        for read in store.point_read_log() {
            let index: usize = read.as_str().trim_start_matches("lib").parse().unwrap();
            prop_assert!(keep.contains(&index), "{} was read despite the filter", read);
        }
    }

    #[test]
    fn repeated_runs_agree(graph in arb_graph(), depth in 0usize..6) {
        let engine = DependencyGraph::new(Arc::new(build_store(&graph)));

        let first = run(engine.traverse("lib0", i64::try_from(depth).unwrap())).unwrap();
        let second = run(engine.traverse("lib0", i64::try_from(depth).unwrap())).unwrap();

        prop_assert_eq!(first.collected_nodes, second.collected_nodes);
        prop_assert_eq!(first.missing, second.missing);
    }
}
