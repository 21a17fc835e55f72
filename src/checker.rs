//! Consistency checker: recomputes reachability from scratch and diffs it
//! against the stored closure table.
//!
//! Verification-only. Nothing here runs on the write path; the engine calls
//! into this module for `verify`, `verify_children` and `rebuild`.

use rustc_hash::FxHashMap;

use crate::closure::table::ClosureTable;
use crate::model::{ClosurePair, NodeId};
use crate::store::GraphStore;

/// A single difference between the stored closure table and the closure
/// recomputed from the graph.
///
/// A verification run reports every discrepancy it finds rather than
/// failing on the first, so one run surfaces all corruption at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    /// A reachable pair has no row in the stored table.
    MissingPair {
        /// The absent pair.
        pair: ClosurePair,
        /// Path count the recomputation found.
        expected_support: u64,
    },
    /// A stored row corresponds to no path in the graph.
    ExtraPair {
        /// The stale pair.
        pair: ClosurePair,
        /// Support the stored row claims.
        actual_support: u64,
    },
    /// Pair present on both sides but with diverging path counts.
    SupportMismatch {
        /// The affected pair.
        pair: ClosurePair,
        /// Recomputed path count.
        expected: u64,
        /// Stored path count.
        actual: u64,
    },
    /// An expected direct child is missing from the store.
    ChildMissing {
        /// The parent whose child set was checked.
        parent: NodeId,
        /// The absent child.
        child: NodeId,
    },
    /// The store holds a direct child the caller did not expect.
    ChildUnexpected {
        /// The parent whose child set was checked.
        parent: NodeId,
        /// The surplus child.
        child: NodeId,
    },
}

/// Recomputes the full closure, pairs and path counts, from the direct
/// edge set alone.
pub(crate) fn recompute(store: &GraphStore) -> ClosureTable {
    let mut memo: FxHashMap<NodeId, FxHashMap<NodeId, u64>> = FxHashMap::default();
    for (id, _) in store.nodes() {
        count_paths(store, id, &mut memo);
    }
    let mut table = ClosureTable::new();
    for (descendant, counts) in memo {
        for (ancestor, paths) in counts {
            table.add_support(ancestor, descendant, paths);
        }
    }
    table
}

/// Path counts from `node` to every ancestor it reaches, memoized per node.
/// Terminates because the graph is acyclic.
fn count_paths(
    store: &GraphStore,
    node: NodeId,
    memo: &mut FxHashMap<NodeId, FxHashMap<NodeId, u64>>,
) -> FxHashMap<NodeId, u64> {
    if let Some(cached) = memo.get(&node) {
        return cached.clone();
    }
    let mut counts: FxHashMap<NodeId, u64> = FxHashMap::default();
    for parent in store.parents_of(node) {
        *counts.entry(parent).or_insert(0) += 1;
        for (ancestor, paths) in count_paths(store, parent, memo) {
            *counts.entry(ancestor).or_insert(0) += paths;
        }
    }
    memo.insert(node, counts.clone());
    counts
}

/// Diffs the stored table against a fresh recomputation, reporting every
/// discrepancy in deterministic (ancestor, descendant) order.
pub(crate) fn diff(store: &GraphStore, table: &ClosureTable) -> Vec<Discrepancy> {
    let expected = recompute(store);
    let mut report = Vec::new();

    for (ancestor, descendant, want) in expected.rows() {
        let got = table.support(ancestor, descendant);
        if got == 0 {
            report.push(Discrepancy::MissingPair {
                pair: ClosurePair::new(ancestor, descendant),
                expected_support: want,
            });
        } else if got != want {
            report.push(Discrepancy::SupportMismatch {
                pair: ClosurePair::new(ancestor, descendant),
                expected: want,
                actual: got,
            });
        }
    }
    for (ancestor, descendant, got) in table.rows() {
        if !expected.contains(ancestor, descendant) {
            report.push(Discrepancy::ExtraPair {
                pair: ClosurePair::new(ancestor, descendant),
                actual_support: got,
            });
        }
    }
    report
}

/// Compares the stored direct-child set of `parent` against `expected`.
pub(crate) fn diff_children(
    store: &GraphStore,
    parent: NodeId,
    expected: &[NodeId],
) -> Vec<Discrepancy> {
    let mut actual: Vec<NodeId> = store.children_of(parent).into_vec();
    actual.sort_unstable();
    let mut report = Vec::new();
    for &child in expected {
        if actual.binary_search(&child).is_err() {
            report.push(Discrepancy::ChildMissing { parent, child });
        }
    }
    for child in actual {
        if !expected.contains(&child) {
            report.push(Discrepancy::ChildUnexpected { parent, child });
        }
    }
    report
}
