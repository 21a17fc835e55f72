//! The transitive-closure maintenance core.
//!
//! `table` holds the materialized pair/support rows, `delta` computes the
//! cross-product change set for one edge mutation, and `engine` is the
//! public surface that applies mutations atomically under the engine lock.

mod delta;
mod engine;
pub(crate) mod table;

pub use engine::{ClosureEngine, EngineStats};
pub use table::ClosureTable;
