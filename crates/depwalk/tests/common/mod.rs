//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use depwalk::domain::Node;
use depwalk::store::RecordingStore;
use depwalk::store::in_memory::InMemoryStore;
use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;

/// Build a store from `(id, [dependency ids])` pairs.
///
/// Each node's name equals its id and its partition key is `pk-{id}`.
pub fn store_from_edges(edges: &[(&str, &[&str])]) -> InMemoryStore {
    let nodes = edges.iter().map(|(id, deps)| {
        deps.iter().fold(Node::new(*id, pk(id), *id), |node, dep| {
            node.with_dependency(*dep, pk(dep))
        })
    });
    let (store, warnings) = InMemoryStore::from_nodes(nodes);
    assert!(warnings.is_empty(), "fixture produced warnings: {warnings:?}");
    store
}

/// Partition key used by [`store_from_edges`].
pub fn pk(id: &str) -> String {
    format!("pk-{id}")
}

/// Wrap a store for call recording.
pub fn recording(store: InMemoryStore) -> Arc<RecordingStore<InMemoryStore>> {
    Arc::new(RecordingStore::new(store))
}

/// The canonical flask fixture.
///
/// ```text
/// flask -> click -> colorama
///       -> jinja2 -> markupsafe
///       -> werkzeug -> markupsafe
///       -> itsdangerous
/// ```
pub fn flask_store() -> InMemoryStore {
    store_from_edges(&[
        ("flask", &["click", "jinja2", "werkzeug", "itsdangerous"]),
        ("click", &["colorama"]),
        ("jinja2", &["markupsafe"]),
        ("werkzeug", &["markupsafe"]),
        ("itsdangerous", &[]),
        ("colorama", &[]),
        ("markupsafe", &[]),
    ])
}

/// Run the depwalk binary directly in the specified directory
pub fn run_depwalk_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_depwalk"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("DEPWALK_DATA_FILE")
        .env_remove("DEPWALK_MAX_CONCURRENT_LOOKUPS")
        .env_remove("DEPWALK_TIMEOUT_SECS")
        .env_remove("DEPWALK_KNOWN_IDS_FILE")
        .env_remove("DEPWALK_STRICT_LOAD")
        .output()
        .expect("Failed to execute depwalk binary")
}
