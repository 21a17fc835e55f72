//! Transitive-closure maintenance engine for organizational hierarchies.
//!
//! Models an org structure as a DAG of nodes (org units and members) linked
//! by direct parent edges, and keeps a materialized reachability relation
//! (the closure table) exactly in step with the graph as edges and nodes
//! are added and removed, including under concurrent mutation. Ancestor and
//! descendant queries are answered in constant time from the table, never
//! by traversal.

#![warn(missing_docs)]

mod checker;
mod closure;
mod config;
mod error;
mod model;
mod retry;
mod store;
mod workqueue;

/// Random org-structure generation for tests and benchmarks.
pub mod testkit;

pub use checker::Discrepancy;
pub use closure::{ClosureEngine, ClosureTable, EngineStats};
pub use config::Config;
pub use error::{EngineError, Result};
pub use model::{ClosurePair, Edge, Node, NodeId, NodeKind};
pub use retry::RetryPolicy;
pub use workqueue::WorkQueue;
