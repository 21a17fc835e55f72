//! Random organizational-structure generation for tests and benchmarks.
//!
//! Builds leveled DAGs through the public engine API: orgs form the spine,
//! members hang off org levels, and nodes can receive extra random parents
//! from the level above to create multi-path closure pairs.

use rand::Rng;

use crate::closure::ClosureEngine;
use crate::error::Result;
use crate::model::{Edge, NodeId, NodeKind};

/// Per-level shape of a generated organization.
///
/// Index 0 describes the roots. `extra_parents[l]` is the total number of
/// parents a node created at level `l` should end up with; parents beyond
/// the first are drawn randomly from level `l - 1`.
#[derive(Debug, Clone)]
pub struct OrgShape {
    /// Org units created per org of the previous level (index 0 = roots).
    pub org_children: Vec<usize>,
    /// Members created per org of each level.
    pub member_children: Vec<usize>,
    /// Target parent count per node created at each level.
    pub extra_parents: Vec<usize>,
}

impl OrgShape {
    /// A compact three-level shape with some multi-parent nodes.
    pub fn small() -> Self {
        Self {
            org_children: vec![3, 3, 2],
            member_children: vec![0, 1, 2],
            extra_parents: vec![0, 2, 2],
        }
    }

    /// A wider four-level shape with heavier multi-parenting, sized for
    /// concurrency tests.
    pub fn branchy() -> Self {
        Self {
            org_children: vec![5, 3, 3, 3],
            member_children: vec![0, 1, 2, 3],
            extra_parents: vec![0, 2, 3, 3],
        }
    }

    /// Number of levels in the shape.
    pub fn levels(&self) -> usize {
        self.org_children.len()
    }
}

/// The nodes and edges a [`populate`] call created.
#[derive(Debug, Clone, Default)]
pub struct GeneratedOrg {
    /// Org units by level.
    pub orgs_by_level: Vec<Vec<NodeId>>,
    /// Members by level (level 0 is normally empty).
    pub members_by_level: Vec<Vec<NodeId>>,
    /// Every edge created, in creation order.
    pub edges: Vec<Edge>,
}

impl GeneratedOrg {
    /// All member node ids across levels.
    pub fn members(&self) -> Vec<NodeId> {
        self.members_by_level.iter().flatten().copied().collect()
    }
}

/// Populates `engine` with a random org structure of the given shape.
pub fn populate(
    engine: &ClosureEngine,
    shape: &OrgShape,
    rng: &mut impl Rng,
) -> Result<GeneratedOrg> {
    let mut out = GeneratedOrg::default();
    let mut next_id = 1u64;
    let mut alloc = |out_next: &mut u64| {
        let id = NodeId(*out_next);
        *out_next += 1;
        id
    };

    for level in 0..shape.levels() {
        let mut orgs = Vec::new();
        let mut members = Vec::new();

        if level == 0 {
            for _ in 0..shape.org_children[0] {
                let id = alloc(&mut next_id);
                engine.add_node(id, NodeKind::OrgUnit)?;
                orgs.push(id);
            }
        } else {
            let above = out.orgs_by_level[level - 1].clone();
            let org_per_parent = shape.org_children[level];
            let member_per_parent = *shape.member_children.get(level).unwrap_or(&0);
            let want_parents = *shape.extra_parents.get(level).unwrap_or(&1);

            for &primary in &above {
                for _ in 0..org_per_parent {
                    let id = alloc(&mut next_id);
                    engine.add_node(id, NodeKind::OrgUnit)?;
                    link(engine, &mut out.edges, id, primary)?;
                    link_extra(engine, &mut out.edges, id, &above, want_parents, rng)?;
                    orgs.push(id);
                }
                for _ in 0..member_per_parent {
                    let id = alloc(&mut next_id);
                    engine.add_node(id, NodeKind::Member)?;
                    link(engine, &mut out.edges, id, primary)?;
                    link_extra(engine, &mut out.edges, id, &above, want_parents, rng)?;
                    members.push(id);
                }
            }
        }

        out.orgs_by_level.push(orgs);
        out.members_by_level.push(members);
    }
    Ok(out)
}

fn link(
    engine: &ClosureEngine,
    edges: &mut Vec<Edge>,
    descendant: NodeId,
    ancestor: NodeId,
) -> Result<()> {
    engine.add_edge(descendant, ancestor)?;
    edges.push(Edge::new(descendant, ancestor));
    Ok(())
}

fn link_extra(
    engine: &ClosureEngine,
    edges: &mut Vec<Edge>,
    descendant: NodeId,
    candidates: &[NodeId],
    want_parents: usize,
    rng: &mut impl Rng,
) -> Result<()> {
    let mut have = 1usize;
    // Bounded draw; small levels may not offer enough distinct parents.
    for _ in 0..candidates.len() * 2 {
        if have >= want_parents {
            break;
        }
        let pick = candidates[rng.gen_range(0..candidates.len())];
        if engine.has_edge(descendant, pick) {
            continue;
        }
        link(engine, edges, descendant, pick)?;
        have += 1;
    }
    Ok(())
}
