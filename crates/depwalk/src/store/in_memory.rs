//! In-memory document store.
//!
//! Holds every document in a `HashMap` keyed by `(partition key, id)` with a
//! secondary index from library name to key. The store is read-only once
//! loaded, so lookups need no locking and can be issued concurrently.
//!
//! # Loading
//!
//! [`InMemoryStore::load`] accepts two layouts:
//!
//! - **JSONL** (`*.jsonl`, or any other extension): one document per line.
//!   Malformed lines are skipped with a warning.
//! - **JSON** (`*.json`): either an object mapping library names to
//!   documents, or an array of documents.
//!
//! Loading never fails because of bad records, only because of I/O or an
//! unreadable top-level JSON value. Problems are returned as
//! [`LoadWarning`]s. [`InMemoryStore::load_strict`] reads the same layouts
//! but fails on the first problem instead.

use crate::domain::{Node, NodeId};
use crate::error::{Error, Result, StoreResult};
use crate::store::DocumentStore;
use crate::traversal::filter::KnownIdSet;
use async_trait::async_trait;
use depwalk_jsonl::{read_jsonl, read_jsonl_resilient, Warning as JsonlWarning};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

type DocumentKey = (String, NodeId);

/// Non-fatal problems found while loading documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A JSONL line could not be decoded as a document.
    ///
    /// **Effect**: the line is skipped.
    MalformedJson {
        /// 1-based line number in the file.
        line_number: usize,
        /// Decoder message.
        error: String,
    },

    /// A document decoded but failed validation.
    ///
    /// **Effect**: the document is skipped.
    InvalidDocument {
        /// Id as found in the document (may be empty).
        id: NodeId,
        /// 1-based index among decoded records, or the map key for JSON maps.
        location: String,
        /// Validation message.
        error: String,
    },

    /// Two documents carry the same library name.
    ///
    /// **Effect**: both are stored, but name lookups return the first one.
    DuplicateName {
        /// The shared name.
        name: String,
        /// Document that keeps the name.
        kept: NodeId,
        /// Document that is only reachable by point read.
        shadowed: NodeId,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "skipped malformed JSON at line {line_number}: {error}")
            }
            Self::InvalidDocument {
                id,
                location,
                error,
            } => write!(f, "skipped invalid document '{id}' at {location}: {error}"),
            Self::DuplicateName {
                name,
                kept,
                shadowed,
            } => write!(
                f,
                "duplicate name '{name}': '{kept}' kept, '{shadowed}' only reachable by id"
            ),
        }
    }
}

impl LoadWarning {
    /// The error a strict load reports for this problem.
    #[must_use]
    pub fn into_error(self) -> Error {
        match self {
            Self::MalformedJson { line_number, error } => {
                Error::InvalidFormat(format!("line {line_number}: {error}"))
            }
            Self::InvalidDocument {
                id,
                location,
                error,
            } => Error::InvalidDocument {
                id,
                reason: format!("{error} (at {location})"),
            },
            duplicate @ Self::DuplicateName { .. } => Error::InvalidFormat(duplicate.to_string()),
        }
    }
}

/// Documents held in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    /// Documents by `(partition key, id)`.
    documents: HashMap<DocumentKey, Node>,

    /// Name index. First document loaded with a given name wins.
    names: HashMap<String, DocumentKey>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from documents, skipping invalid ones.
    ///
    /// ```
    /// use depwalk::domain::Node;
    /// use depwalk::store::in_memory::InMemoryStore;
    ///
    /// let (store, warnings) = InMemoryStore::from_nodes([
    ///     Node::new("flask", "f", "flask").with_dependency("click", "c"),
    ///     Node::new("click", "c", "click"),
    /// ]);
    /// assert_eq!(store.len(), 2);
    /// assert!(warnings.is_empty());
    /// ```
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> (Self, Vec<LoadWarning>) {
        let mut store = Self::new();
        let mut warnings = Vec::new();
        for (index, node) in nodes.into_iter().enumerate() {
            store.admit_document(node, (index + 1).to_string(), &mut warnings);
        }
        (store, warnings)
    }

    /// Load documents from a file. See the module docs for accepted layouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or if a `.json` file is
    /// not a JSON object or array.
    pub async fn load(path: &Path) -> Result<(Self, Vec<LoadWarning>)> {
        let (store, warnings) = if is_json_document(path) {
            Self::load_json(path).await?
        } else {
            Self::load_jsonl(path).await?
        };

        tracing::info!(
            path = %path.display(),
            documents = store.len(),
            warnings = warnings.len(),
            "Loaded document store"
        );
        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        Ok((store, warnings))
    }

    /// Load documents from a file, failing on the first bad record.
    ///
    /// Anything [`load`](Self::load) would report as a [`LoadWarning`] is an
    /// error here, including duplicate names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for undecodable lines, a `.json`
    /// top level that is neither object nor array, and duplicate names.
    /// Validation failures give [`Error::InvalidDocument`]; read failures give
    /// [`Error::Io`] and unparsable `.json` text gives [`Error::Json`].
    pub async fn load_strict(path: &Path) -> Result<Self> {
        let (store, warnings) = if is_json_document(path) {
            Self::load_json(path).await?
        } else {
            let nodes = read_jsonl::<Node, _>(path).await?;
            Self::from_records(nodes)
        };

        if let Some(first) = warnings.into_iter().next() {
            return Err(first.into_error());
        }

        tracing::info!(
            path = %path.display(),
            documents = store.len(),
            "Loaded document store (strict)"
        );
        Ok(store)
    }

    async fn load_jsonl(path: &Path) -> Result<(Self, Vec<LoadWarning>)> {
        let (nodes, jsonl_warnings) = read_jsonl_resilient::<Node, _>(path).await?;

        let mut warnings: Vec<LoadWarning> = jsonl_warnings
            .into_iter()
            .map(|warning| match warning {
                JsonlWarning::MalformedJson { line_number, error } => {
                    LoadWarning::MalformedJson { line_number, error }
                }
                // Non-UTF-8 lines never became a record either
                JsonlWarning::SkippedLine {
                    line_number,
                    reason,
                } => LoadWarning::MalformedJson {
                    line_number,
                    error: reason,
                },
            })
            .collect();

        let (store, record_warnings) = Self::from_records(nodes);
        warnings.extend(record_warnings);
        Ok((store, warnings))
    }

    /// Admit decoded JSONL records, labelled by their position.
    fn from_records(nodes: Vec<Node>) -> (Self, Vec<LoadWarning>) {
        let mut store = Self::new();
        let mut warnings = Vec::new();
        for (index, node) in nodes.into_iter().enumerate() {
            store.admit_document(node, format!("record {}", index + 1), &mut warnings);
        }
        (store, warnings)
    }

    async fn load_json(path: &Path) -> Result<(Self, Vec<LoadWarning>)> {
        let content = tokio::fs::read_to_string(path).await?;
        let value: Value = serde_json::from_str(&content)?;

        let entries: Vec<(String, Value)> = match value {
            Value::Object(map) => map.into_iter().collect(),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (format!("record {}", index + 1), item))
                .collect(),
            other => {
                return Err(Error::InvalidFormat(format!(
                    "expected a JSON object or array of documents, found {}",
                    json_kind(&other)
                )));
            }
        };

        let mut store = Self::new();
        let mut warnings = Vec::new();
        for (location, item) in entries {
            let id = item
                .get("id")
                .and_then(Value::as_str)
                .map(NodeId::from)
                .unwrap_or_else(|| NodeId::new(""));
            match serde_json::from_value::<Node>(item) {
                Ok(node) => store.admit_document(node, location, &mut warnings),
                Err(e) => warnings.push(LoadWarning::InvalidDocument {
                    id,
                    location,
                    error: e.to_string(),
                }),
            }
        }
        Ok((store, warnings))
    }

    /// Validate and insert one document during loading.
    fn admit_document(&mut self, node: Node, location: String, warnings: &mut Vec<LoadWarning>) {
        if let Err(error) = node.validate() {
            warnings.push(LoadWarning::InvalidDocument {
                id: node.id,
                location,
                error,
            });
            return;
        }

        if let Some((_, kept)) = self.names.get(&node.name) {
            if !node.name.is_empty() && kept != &node.id {
                warnings.push(LoadWarning::DuplicateName {
                    name: node.name.clone(),
                    kept: kept.clone(),
                    shadowed: node.id.clone(),
                });
            }
        }
        self.upsert(node);
    }

    /// Insert or replace a document.
    ///
    /// Returns the previous document stored under the same
    /// `(partition key, id)`, if any. The name index keeps the first
    /// document registered for each name.
    pub fn upsert(&mut self, node: Node) -> Option<Node> {
        let key = (node.partition_key.clone(), node.id.clone());
        if !node.name.is_empty() {
            self.names
                .entry(node.name.clone())
                .or_insert_with(|| key.clone());
        }
        self.documents.insert(key, node)
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The set of ids present in the store, for use as a known-id filter.
    #[must_use]
    pub fn known_ids(&self) -> KnownIdSet {
        self.documents.keys().map(|(_, id)| id.clone()).collect()
    }
}

fn is_json_document(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Node>> {
        Ok(self
            .names
            .get(name)
            .and_then(|key| self.documents.get(key))
            .cloned())
    }

    async fn point_read(&self, id: &NodeId, partition_key: &str) -> StoreResult<Option<Node>> {
        let key = (partition_key.to_string(), id.clone());
        Ok(self.documents.get(&key).cloned())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.documents.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::filter::KnownIdFilter;

    fn sample_store() -> InMemoryStore {
        let (store, warnings) = InMemoryStore::from_nodes([
            Node::new("flask", "f", "flask")
                .with_dependency("click", "c")
                .with_dependency("jinja2", "j"),
            Node::new("click", "c", "click"),
            Node::new("jinja2", "j", "jinja2"),
        ]);
        assert!(warnings.is_empty());
        store
    }

    #[tokio::test]
    async fn point_read_requires_matching_partition() {
        let store = sample_store();

        let hit = store.point_read(&NodeId::new("click"), "c").await.unwrap();
        assert_eq!(hit.unwrap().name, "click");

        let wrong_pk = store.point_read(&NodeId::new("click"), "x").await.unwrap();
        assert!(wrong_pk.is_none());
    }

    #[tokio::test]
    async fn find_by_name_is_exact_and_case_sensitive() {
        let store = sample_store();

        assert!(store.find_by_name("flask").await.unwrap().is_some());
        assert!(store.find_by_name("Flask").await.unwrap().is_none());
        assert!(store.find_by_name("fla").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn count_matches_len() {
        let store = sample_store();
        assert_eq!(store.count().await.unwrap(), 3);
        assert_eq!(store.len(), 3);
        assert!(!store.is_empty());
    }

    #[test]
    fn invalid_documents_are_skipped() {
        let (store, warnings) = InMemoryStore::from_nodes([
            Node::new("ok", "o", "ok"),
            Node::new("nopk", "", "nopk"),
        ]);

        assert_eq!(store.len(), 1);
        assert!(matches!(
            &warnings[..],
            [LoadWarning::InvalidDocument { id, .. }] if id.as_str() == "nopk"
        ));
    }

    #[tokio::test]
    async fn duplicate_names_keep_first_document() {
        let (store, warnings) = InMemoryStore::from_nodes([
            Node::new("requests-a", "r", "requests"),
            Node::new("requests-b", "r", "requests"),
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(warnings.len(), 1);
        let found = store.find_by_name("requests").await.unwrap().unwrap();
        assert_eq!(found.id.as_str(), "requests-a");
    }

    #[test]
    fn upsert_replaces_same_key() {
        let mut store = InMemoryStore::new();
        assert!(store.upsert(Node::new("a", "a", "a")).is_none());

        let previous = store.upsert(Node::new("a", "a", "a").with_attribute("v", 2));

        assert!(previous.is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn known_ids_cover_every_document() {
        let store = sample_store();
        let known = store.known_ids();

        assert!(known.may_exist(&NodeId::new("flask")));
        assert!(known.may_exist(&NodeId::new("jinja2")));
        assert!(!known.may_exist(&NodeId::new("werkzeug")));
    }
}
