use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{EngineError, Result};
use crate::model::NodeId;

/// The materialized reachability relation.
///
/// One row per (ancestor, descendant) pair with a support count: the number
/// of distinct directed paths of length >= 1 from descendant to ancestor.
/// A pair is a member of the closure iff its count is >= 1; rows never hold
/// a zero count. Per-node secondary indexes mirror the row set in both
/// directions so ancestor and descendant enumeration are O(result).
#[derive(Debug, Default)]
pub struct ClosureTable {
    support: FxHashMap<(NodeId, NodeId), u64>,
    // descendant -> ancestors it reaches
    up: FxHashMap<NodeId, FxHashSet<NodeId>>,
    // ancestor -> descendants that reach it
    down: FxHashMap<NodeId, FxHashSet<NodeId>>,
}

impl ClosureTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `descendant` reaches `ancestor`.
    pub fn contains(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        self.support.contains_key(&(ancestor, descendant))
    }

    /// Number of known paths from `descendant` to `ancestor` (0 if none).
    pub fn support(&self, ancestor: NodeId, descendant: NodeId) -> u64 {
        self.support
            .get(&(ancestor, descendant))
            .copied()
            .unwrap_or(0)
    }

    /// All ancestors reachable from `descendant`.
    pub fn ancestors_of(&self, descendant: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.up.get(&descendant).into_iter().flatten().copied()
    }

    /// All descendants that reach `ancestor`.
    pub fn descendants_of(&self, ancestor: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.down.get(&ancestor).into_iter().flatten().copied()
    }

    /// Adds `n` paths of support to a pair, materializing it if absent.
    pub fn add_support(&mut self, ancestor: NodeId, descendant: NodeId, n: u64) {
        if n == 0 {
            return;
        }
        let count = self.support.entry((ancestor, descendant)).or_insert(0);
        if *count == 0 {
            self.up.entry(descendant).or_default().insert(ancestor);
            self.down.entry(ancestor).or_default().insert(descendant);
        }
        *count += n;
    }

    /// Removes `n` paths of support from a pair, retracting the row when the
    /// count reaches zero. Underflow means the table no longer matches the
    /// graph and is reported as corruption.
    pub fn remove_support(&mut self, ancestor: NodeId, descendant: NodeId, n: u64) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        let Some(count) = self.support.get_mut(&(ancestor, descendant)) else {
            return Err(EngineError::Corrupt(format!(
                "missing closure row ({ancestor}, {descendant}) during retraction"
            )));
        };
        if *count < n {
            return Err(EngineError::Corrupt(format!(
                "support underflow on ({ancestor}, {descendant}): {count} - {n}"
            )));
        }
        *count -= n;
        if *count == 0 {
            self.support.remove(&(ancestor, descendant));
            if let Some(set) = self.up.get_mut(&descendant) {
                set.remove(&ancestor);
                if set.is_empty() {
                    self.up.remove(&descendant);
                }
            }
            if let Some(set) = self.down.get_mut(&ancestor) {
                set.remove(&descendant);
                if set.is_empty() {
                    self.down.remove(&ancestor);
                }
            }
        }
        Ok(())
    }

    /// Number of materialized pairs.
    pub fn pair_count(&self) -> usize {
        self.support.len()
    }

    /// Sum of all support counts (total distinct paths).
    pub fn total_support(&self) -> u64 {
        self.support.values().sum()
    }

    /// Iterates over `((ancestor, descendant), count)` rows in no particular
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = ((NodeId, NodeId), u64)> + '_ {
        self.support.iter().map(|(pair, count)| (*pair, *count))
    }

    /// Collects all rows sorted by (ancestor, descendant), for comparison.
    pub fn rows(&self) -> Vec<(NodeId, NodeId, u64)> {
        let mut out: Vec<_> = self
            .support
            .iter()
            .map(|((a, d), c)| (*a, *d, *c))
            .collect();
        out.sort_unstable();
        out
    }
}
