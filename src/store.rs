use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::error::{EngineError, Result};
use crate::model::{Edge, NodeId, NodeKind};

/// Inline capacity for adjacency snapshots; most org nodes have few parents.
pub(crate) type AdjVec = SmallVec<[NodeId; 8]>;

/// Source of truth for node and direct-edge existence.
///
/// Adjacency is mirrored in both directions so that parent and child lookups
/// are both O(1); the two mirrors are updated together and never diverge.
/// The store knows nothing about transitive reachability; that is the
/// closure table's job.
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: FxHashMap<NodeId, NodeKind>,
    // descendant -> direct ancestors
    parents: FxHashMap<NodeId, FxHashSet<NodeId>>,
    // ancestor -> direct descendants
    children: FxHashMap<NodeId, FxHashSet<NodeId>>,
    edge_count: usize,
}

impl GraphStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of direct edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether the node is registered.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Kind of a registered node.
    pub fn kind_of(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(&id).copied()
    }

    /// Registers a node.
    pub fn insert_node(&mut self, id: NodeId, kind: NodeKind) -> Result<()> {
        if self.nodes.contains_key(&id) {
            return Err(EngineError::AlreadyExists("node"));
        }
        self.nodes.insert(id, kind);
        Ok(())
    }

    /// Drops a node record. The caller must have removed all incident edges
    /// first; the cascade lives in the engine, not here.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        if !self.nodes.contains_key(&id) {
            return Err(EngineError::NotFound("node"));
        }
        let has_edges = self.parents.get(&id).is_some_and(|s| !s.is_empty())
            || self.children.get(&id).is_some_and(|s| !s.is_empty());
        if has_edges {
            return Err(EngineError::Conflict(format!(
                "node {id} still has direct edges"
            )));
        }
        self.parents.remove(&id);
        self.children.remove(&id);
        self.nodes.remove(&id);
        Ok(())
    }

    /// Whether the direct edge descendant -> ancestor exists.
    pub fn has_edge(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.parents
            .get(&descendant)
            .is_some_and(|s| s.contains(&ancestor))
    }

    /// Inserts a direct edge. The engine validates node existence, duplicate
    /// edges and acyclicity before calling this.
    pub fn insert_edge(&mut self, descendant: NodeId, ancestor: NodeId) {
        let inserted = self
            .parents
            .entry(descendant)
            .or_default()
            .insert(ancestor);
        self.children.entry(ancestor).or_default().insert(descendant);
        if inserted {
            self.edge_count += 1;
        }
    }

    /// Removes a direct edge; returns whether it was present.
    pub fn remove_edge(&mut self, descendant: NodeId, ancestor: NodeId) -> bool {
        let removed = self
            .parents
            .get_mut(&descendant)
            .is_some_and(|s| s.remove(&ancestor));
        if removed {
            if let Some(set) = self.children.get_mut(&ancestor) {
                set.remove(&descendant);
            }
            self.edge_count -= 1;
        }
        removed
    }

    /// Snapshot of a node's direct ancestors.
    pub fn parents_of(&self, id: NodeId) -> AdjVec {
        self.parents
            .get(&id)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Snapshot of a node's direct descendants.
    pub fn children_of(&self, id: NodeId) -> AdjVec {
        self.children
            .get(&id)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Iterates over all registered nodes.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, NodeKind)> + '_ {
        self.nodes.iter().map(|(id, kind)| (*id, *kind))
    }

    /// Collects every direct edge.
    pub fn edges(&self) -> Vec<Edge> {
        let mut out = Vec::with_capacity(self.edge_count);
        for (descendant, ancestors) in &self.parents {
            for ancestor in ancestors {
                out.push(Edge::new(*descendant, *ancestor));
            }
        }
        out
    }
}
