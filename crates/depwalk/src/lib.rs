//! Depwalk - breadth-first dependency traversal over a key/value document store.
//!
//! Library documents carry their direct dependencies as `(id, partition key)`
//! references. The store offers point reads and a name lookup but no graph
//! queries, so [`traversal::DependencyGraph`] rebuilds the transitive
//! dependency set level by level, deduplicating lookups across levels and
//! recording the depth at which each library was first reached.
//!
//! This crate provides both the `depwalk` CLI and the library behind it.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod config;
pub mod domain;
pub mod error;
pub mod store;
pub mod traversal;

// Application context and output formatting used by the CLI
pub mod app;
pub mod output;

// Public CLI module (needed by binary)
pub mod cli;
