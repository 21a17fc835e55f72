use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::checker::{self, Discrepancy};
use crate::closure::delta::edge_delta;
use crate::closure::table::ClosureTable;
use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::model::{Edge, Node, NodeId, NodeKind};
use crate::store::GraphStore;

/// Node, edge and closure-row counts reported by [`ClosureEngine::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Registered nodes.
    pub nodes: usize,
    /// Direct edges.
    pub edges: usize,
    /// Materialized closure pairs.
    pub closure_pairs: usize,
    /// Sum of all pair support counts (distinct paths).
    pub total_support: u64,
}

#[derive(Debug, Default)]
struct EngineState {
    store: GraphStore,
    table: ClosureTable,
}

/// The transitive-closure maintenance engine.
///
/// Sole writer of the closure table. Every mutation runs in two phases
/// under the engine write lock: validate and compute the full delta without
/// touching state, then apply it infallibly. A mutation therefore either
/// fully applies or leaves both stores untouched. Readers take the read
/// lock and only ever observe committed tables.
///
/// Overlapping mutations are serialized by the single write lock; that is
/// the concurrency discipline this engine documents and guarantees.
/// Mutations that cannot acquire the lock within `Config::lock_wait` fail
/// with the transient [`EngineError::Contention`].
#[derive(Debug, Default)]
pub struct ClosureEngine {
    state: RwLock<EngineState>,
    config: Config,
}

impl ClosureEngine {
    /// Creates an empty engine with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty engine with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            state: RwLock::new(EngineState::default()),
            config,
        }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, EngineState>> {
        self.state
            .try_write_for(self.config.lock_wait)
            .ok_or(EngineError::Contention(self.config.lock_wait))
    }

    /// Registers a node.
    ///
    /// Fails with `AlreadyExists` if the identifier is in use and
    /// `Contention` if the write lock cannot be acquired in time.
    pub fn add_node(&self, id: NodeId, kind: NodeKind) -> Result<()> {
        let mut st = self.write_guard()?;
        st.store.insert_node(id, kind)?;
        debug!(node = %id, ?kind, "node added");
        Ok(())
    }

    /// Removes a node, cascading over its incident edges.
    ///
    /// Each incident edge is retracted through the edge-removal algorithm
    /// inside the same critical section, so the whole cascade is a single
    /// atomic mutation. Afterwards no edge or closure row references the
    /// node. Fails with `NotFound` if the node is not registered.
    pub fn remove_node(&self, id: NodeId) -> Result<()> {
        let mut st = self.write_guard()?;
        if !st.store.contains_node(id) {
            return Err(EngineError::NotFound("node"));
        }
        let parents = st.store.parents_of(id);
        let children = st.store.children_of(id);
        for &parent in &parents {
            Self::remove_edge_locked(&mut st, id, parent)?;
        }
        for &child in &children {
            Self::remove_edge_locked(&mut st, child, id)?;
        }
        st.store.remove_node(id)?;
        // An isolated node supports no length >= 1 path.
        debug_assert_eq!(st.table.ancestors_of(id).count(), 0);
        debug_assert_eq!(st.table.descendants_of(id).count(), 0);
        info!(
            node = %id,
            parents = parents.len(),
            children = children.len(),
            "node removed with cascade"
        );
        Ok(())
    }

    /// Inserts the direct edge descendant -> ancestor and the closure rows
    /// it newly supports.
    ///
    /// Idempotent: re-adding an existing edge is a successful no-op. Fails
    /// with `NotFound` if either node is missing and `CycleDetected` if the
    /// ancestor already reaches the descendant (or the two coincide).
    pub fn add_edge(&self, descendant: NodeId, ancestor: NodeId) -> Result<()> {
        let mut st = self.write_guard()?;
        if !st.store.contains_node(descendant) || !st.store.contains_node(ancestor) {
            return Err(EngineError::NotFound("node"));
        }
        if st.store.has_edge(descendant, ancestor) {
            debug!(descendant = %descendant, ancestor = %ancestor, "edge already present");
            return Ok(());
        }
        // The edge closes a cycle iff the descendant is already an ancestor
        // of the ancestor. One closure lookup, no traversal.
        if descendant == ancestor || st.table.contains(descendant, ancestor) {
            return Err(EngineError::CycleDetected {
                descendant,
                ancestor,
            });
        }
        let delta = edge_delta(&st.table, descendant, ancestor);
        st.store.insert_edge(descendant, ancestor);
        delta.apply_add(&mut st.table);
        info!(
            descendant = %descendant,
            ancestor = %ancestor,
            candidates = delta.len(),
            "edge added"
        );
        Ok(())
    }

    /// Removes the direct edge descendant -> ancestor and retracts every
    /// closure row whose support crossed it.
    ///
    /// Fails with `NotFound` if the edge does not exist.
    pub fn remove_edge(&self, descendant: NodeId, ancestor: NodeId) -> Result<()> {
        let mut st = self.write_guard()?;
        Self::remove_edge_locked(&mut st, descendant, ancestor)
    }

    fn remove_edge_locked(
        st: &mut EngineState,
        descendant: NodeId,
        ancestor: NodeId,
    ) -> Result<()> {
        if !st.store.has_edge(descendant, ancestor) {
            return Err(EngineError::NotFound("edge"));
        }
        // Candidate set comes from the table before the edge is deleted.
        let delta = edge_delta(&st.table, descendant, ancestor);
        st.store.remove_edge(descendant, ancestor);
        delta.apply_remove(&mut st.table)?;
        info!(
            descendant = %descendant,
            ancestor = %ancestor,
            candidates = delta.len(),
            "edge removed"
        );
        Ok(())
    }

    /// Whether the node is registered.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.state.read().store.contains_node(id)
    }

    /// Kind of a registered node.
    pub fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.state.read().store.kind_of(id)
    }

    /// The full node record, if registered.
    pub fn node(&self, id: NodeId) -> Option<Node> {
        self.state
            .read()
            .store
            .kind_of(id)
            .map(|kind| Node { id, kind })
    }

    /// Whether the direct edge descendant -> ancestor exists.
    pub fn has_edge(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.state.read().store.has_edge(descendant, ancestor)
    }

    /// Whether `descendant` transitively reaches `ancestor`.
    ///
    /// Constant time: one closure-table lookup, no traversal. A node is
    /// never a descendant of itself.
    pub fn is_descendant(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        self.state.read().table.contains(ancestor, descendant)
    }

    /// All transitive ancestors of `node`, sorted by id. Empty for unknown
    /// or isolated nodes.
    pub fn ancestors_of(&self, node: NodeId) -> Vec<NodeId> {
        let st = self.state.read();
        let mut out: Vec<_> = st.table.ancestors_of(node).collect();
        out.sort_unstable();
        out
    }

    /// All transitive descendants of `node`, sorted by id.
    pub fn descendants_of(&self, node: NodeId) -> Vec<NodeId> {
        let st = self.state.read();
        let mut out: Vec<_> = st.table.descendants_of(node).collect();
        out.sort_unstable();
        out
    }

    /// Transitive ancestors of `node` restricted to one kind, sorted by id.
    pub fn ancestors_of_kind(&self, node: NodeId, kind: NodeKind) -> Vec<NodeId> {
        let st = self.state.read();
        let mut out: Vec<_> = st
            .table
            .ancestors_of(node)
            .filter(|id| st.store.kind_of(*id) == Some(kind))
            .collect();
        out.sort_unstable();
        out
    }

    /// Transitive descendants of `node` restricted to one kind, sorted by id.
    pub fn descendants_of_kind(&self, node: NodeId, kind: NodeKind) -> Vec<NodeId> {
        let st = self.state.read();
        let mut out: Vec<_> = st
            .table
            .descendants_of(node)
            .filter(|id| st.store.kind_of(*id) == Some(kind))
            .collect();
        out.sort_unstable();
        out
    }

    /// Direct children of `node`, sorted by id. Answered from the graph
    /// store, not the closure table.
    pub fn direct_children_of(&self, node: NodeId) -> Vec<NodeId> {
        let mut out: Vec<_> = self.state.read().store.children_of(node).into_vec();
        out.sort_unstable();
        out
    }

    /// Direct parents of `node`, sorted by id.
    pub fn direct_parents_of(&self, node: NodeId) -> Vec<NodeId> {
        let mut out: Vec<_> = self.state.read().store.parents_of(node).into_vec();
        out.sort_unstable();
        out
    }

    /// Every direct edge currently in the graph store.
    pub fn edges(&self) -> Vec<Edge> {
        self.state.read().store.edges()
    }

    /// Closure rows as sorted `(ancestor, descendant, support)` triples.
    ///
    /// Diagnostic snapshot, mainly for table-equality assertions.
    pub fn closure_rows(&self) -> Vec<(NodeId, NodeId, u64)> {
        self.state.read().table.rows()
    }

    /// Recomputes closure from scratch and reports every discrepancy
    /// between it and the stored table.
    ///
    /// Diagnostic only, never part of the write path. An empty report
    /// means the table is exactly the transitive closure of the edge set.
    pub fn verify(&self) -> Vec<Discrepancy> {
        let st = self.state.read();
        let report = checker::diff(&st.store, &st.table);
        if report.is_empty() {
            debug!(pairs = st.table.pair_count(), "closure verified");
        } else {
            warn!(discrepancies = report.len(), "closure verification failed");
        }
        report
    }

    /// Compares the stored direct-child set of `node` against `expected`.
    ///
    /// Catches corruption that only affects direct, not transitive,
    /// relationships.
    pub fn verify_children(&self, node: NodeId, expected: &[NodeId]) -> Vec<Discrepancy> {
        let st = self.state.read();
        checker::diff_children(&st.store, node, expected)
    }

    /// Rebuilds the closure table from the current edge set.
    ///
    /// Operator-repair path for after a `Corrupt` report; the new table is
    /// swapped in atomically under the write lock.
    pub fn rebuild(&self) -> Result<()> {
        let mut st = self.write_guard()?;
        let table = checker::recompute(&st.store);
        let pairs = table.pair_count();
        st.table = table;
        info!(pairs, "closure table rebuilt");
        Ok(())
    }

    /// Current node, edge and closure-row counts.
    pub fn stats(&self) -> EngineStats {
        let st = self.state.read();
        EngineStats {
            nodes: st.store.node_count(),
            edges: st.store.edge_count(),
            closure_pairs: st.table.pair_count(),
            total_support: st.table.total_support(),
        }
    }
}
