use std::fmt;

/// Opaque node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node kind tag.
///
/// Kinds never affect closure semantics; they only filter query results
/// (an organizational unit can be an ancestor, a member usually cannot,
/// but the engine does not enforce that).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An organizational unit (can hold children).
    OrgUnit,
    /// An individual member of the organization.
    Member,
}

/// A node record as stored in the graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    /// Identifier, unique across the store.
    pub id: NodeId,
    /// Kind tag.
    pub kind: NodeKind,
}

/// A direct parent link: `descendant` has `ancestor` as a direct parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Child end of the link.
    pub descendant: NodeId,
    /// Parent end of the link.
    pub ancestor: NodeId,
}

impl Edge {
    /// Creates a descendant -> ancestor link.
    pub fn new(descendant: NodeId, ancestor: NodeId) -> Self {
        Self {
            descendant,
            ancestor,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.descendant, self.ancestor)
    }
}

/// A materialized reachability fact: `descendant` reaches `ancestor` by one
/// or more directed parent paths of length >= 1.
///
/// Reflexive pairs are never materialized; a node is not its own ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClosurePair {
    /// The reachable ancestor.
    pub ancestor: NodeId,
    /// The reaching descendant.
    pub descendant: NodeId,
}

impl ClosurePair {
    /// Creates an (ancestor, descendant) pair.
    pub fn new(ancestor: NodeId, descendant: NodeId) -> Self {
        Self {
            ancestor,
            descendant,
        }
    }
}

impl fmt::Display for ClosurePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.ancestor, self.descendant)
    }
}
