//! Domain types for dependency documents.
//!
//! A [`Node`] is one library document as stored in the backing document
//! store. It is addressed by its id plus a partition key, and refers to the
//! libraries it depends on through [`DependencyRef`]s. References are plain
//! lookup keys: many nodes may point at the same dependency and nothing owns
//! anything.
//!
//! Field names on the wire follow the stored documents: the partition key is
//! `pk` (with `partitionKey` accepted on input), and any field not modelled
//! here is kept verbatim in [`Node::attributes`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Unique identifier of a document within its partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new node ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Reference from a node to one of its dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyRef {
    /// Id of the dependency document.
    pub id: NodeId,

    /// Partition key of the dependency document.
    #[serde(rename = "pk", alias = "partitionKey")]
    pub partition_key: String,
}

impl DependencyRef {
    /// Create a reference from an id and partition key.
    pub fn new(id: impl Into<NodeId>, partition_key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            partition_key: partition_key.into(),
        }
    }

    /// The `id|partitionKey` string used to order frontier lookups.
    #[must_use]
    pub fn composite_key(&self) -> String {
        format!("{}|{}", self.id, self.partition_key)
    }
}

/// A library document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Document id, unique within the partition.
    pub id: NodeId,

    /// Storage routing key.
    #[serde(rename = "pk", alias = "partitionKey")]
    pub partition_key: String,

    /// Human-readable library name. Unique in practice, not enforced.
    #[serde(default)]
    pub name: String,

    /// Libraries this one depends on, in document order.
    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,

    /// Every other document field, passed through unchanged.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Node {
    /// Create a node with no dependencies and no extra attributes.
    pub fn new(
        id: impl Into<NodeId>,
        partition_key: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            partition_key: partition_key.into(),
            name: name.into(),
            dependencies: Vec::new(),
            attributes: Map::new(),
        }
    }

    /// Append a dependency reference.
    #[must_use]
    pub fn with_dependency(
        mut self,
        id: impl Into<NodeId>,
        partition_key: impl Into<String>,
    ) -> Self {
        self.dependencies.push(DependencyRef::new(id, partition_key));
        self
    }

    /// Set a pass-through attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Check the fields the traversal relies on.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found: an empty id, an
    /// empty partition key, or a dependency reference with an empty id.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.as_str().trim().is_empty() {
            return Err("id cannot be empty".to_string());
        }
        if self.partition_key.trim().is_empty() {
            return Err("partition key cannot be empty".to_string());
        }
        if let Some(position) = self
            .dependencies
            .iter()
            .position(|dep| dep.id.as_str().trim().is_empty())
        {
            return Err(format!("dependency #{position} has an empty id"));
        }
        Ok(())
    }
}

/// A node admitted by a traversal, tagged with the level it was first found at.
///
/// Serializes as `{"node": {...}, "depth": n}` so document attributes never
/// collide with the depth key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectedEntry {
    /// The resolved document.
    pub node: Node,

    /// Level of first discovery (root = 0). Never revised.
    #[serde(rename = "depth")]
    pub discovery_depth: usize,
}

/// A dependency that was looked up and did not exist in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingDependency {
    /// The id that was looked up.
    pub id: NodeId,

    /// The partition key used for the lookup.
    #[serde(rename = "pk")]
    pub partition_key: String,

    /// Level at which the lookup was attempted.
    #[serde(rename = "depth")]
    pub discovery_depth: usize,
}
