use smallvec::{smallvec, SmallVec};

use crate::closure::table::ClosureTable;
use crate::error::Result;
use crate::model::NodeId;

type Leg = SmallVec<[(NodeId, u64); 16]>;

/// The closure-table change set for a single edge mutation.
///
/// Built read-only from the current table, then applied in one shot: the
/// two-phase split is what makes mutations all-or-nothing. The same delta
/// describes both directions: added on edge insertion, subtracted on edge
/// removal.
#[derive(Debug)]
pub(crate) struct EdgeDelta {
    // (ancestor, descendant, paths crossing the mutated edge)
    terms: Vec<(NodeId, NodeId, u64)>,
}

/// Computes the candidate cross product for the edge descendant -> ancestor.
///
/// Every path that crosses the edge decomposes uniquely as
/// `X ~> descendant`, the edge itself, `ancestor ~> Y`; the number of such
/// paths per (Y, X) pair is the product of the leg counts. Neither leg can
/// itself cross the edge (that would close a cycle), so leg counts read
/// from the table are exact whether the edge is being added or removed.
pub(crate) fn edge_delta(table: &ClosureTable, descendant: NodeId, ancestor: NodeId) -> EdgeDelta {
    let mut below: Leg = smallvec![(descendant, 1)];
    below.extend(
        table
            .descendants_of(descendant)
            .map(|x| (x, table.support(descendant, x))),
    );

    let mut above: Leg = smallvec![(ancestor, 1)];
    above.extend(
        table
            .ancestors_of(ancestor)
            .map(|y| (y, table.support(y, ancestor))),
    );

    let mut terms = Vec::with_capacity(below.len() * above.len());
    for &(x, c1) in &below {
        for &(y, c2) in &above {
            terms.push((y, x, c1 * c2));
        }
    }
    EdgeDelta { terms }
}

impl EdgeDelta {
    /// Number of candidate pairs touched by the mutation.
    pub(crate) fn len(&self) -> usize {
        self.terms.len()
    }

    /// Applies the delta additively (edge insertion). Infallible: adding
    /// support can always be represented.
    pub(crate) fn apply_add(&self, table: &mut ClosureTable) {
        for &(ancestor, descendant, n) in &self.terms {
            table.add_support(ancestor, descendant, n);
        }
    }

    /// Applies the delta subtractively (edge removal), retracting rows whose
    /// support drops to zero.
    pub(crate) fn apply_remove(&self, table: &mut ClosureTable) -> Result<()> {
        for &(ancestor, descendant, n) in &self.terms {
            table.remove_support(ancestor, descendant, n)?;
        }
        Ok(())
    }
}
