//! End-to-end closure scenarios exercised through the public engine API.

use orgclosure::{ClosureEngine, EngineError, NodeId, NodeKind, Result};

const ROOT: NodeId = NodeId(1);
const A: NodeId = NodeId(2);
const B: NodeId = NodeId(3);
const C: NodeId = NodeId(4);

/// Builds the reference hierarchy: root with children a and b, and c a
/// child of both a and b.
fn build_diamond() -> Result<ClosureEngine> {
    let engine = ClosureEngine::new();
    for id in [ROOT, A, B] {
        engine.add_node(id, NodeKind::OrgUnit)?;
    }
    engine.add_node(C, NodeKind::Member)?;
    engine.add_edge(A, ROOT)?;
    engine.add_edge(B, ROOT)?;
    engine.add_edge(C, A)?;
    engine.add_edge(C, B)?;
    Ok(engine)
}

#[test]
fn diamond_reachability_and_retraction() -> Result<()> {
    let engine = build_diamond()?;

    assert_eq!(engine.descendants_of(ROOT), vec![A, B, C]);
    assert_eq!(engine.ancestors_of(C), vec![ROOT, A, B]);
    assert!(engine.is_descendant(ROOT, C));
    assert!(!engine.is_descendant(C, ROOT));
    assert!(engine.verify().is_empty());

    // c still reaches root through b after losing the a-side link.
    engine.remove_edge(C, A)?;
    assert_eq!(engine.ancestors_of(C), vec![ROOT, B]);
    assert!(engine.is_descendant(ROOT, C));
    assert!(engine.verify().is_empty());

    // Losing the b-side link isolates c entirely.
    engine.remove_edge(C, B)?;
    assert_eq!(engine.ancestors_of(C), Vec::<NodeId>::new());
    assert!(!engine.is_descendant(ROOT, C));
    assert!(engine.verify().is_empty());
    Ok(())
}

#[test]
fn readding_an_edge_restores_the_exact_closure() -> Result<()> {
    let engine = build_diamond()?;
    let before = engine.closure_rows();

    engine.remove_edge(C, A)?;
    engine.add_edge(C, A)?;

    assert_eq!(engine.closure_rows(), before);
    assert!(engine.verify().is_empty());
    Ok(())
}

#[test]
fn add_edge_is_idempotent_remove_edge_is_not() -> Result<()> {
    let engine = build_diamond()?;
    let before = engine.closure_rows();

    engine.add_edge(C, A)?;
    assert_eq!(engine.closure_rows(), before);

    engine.remove_edge(C, A)?;
    assert!(matches!(
        engine.remove_edge(C, A),
        Err(EngineError::NotFound("edge"))
    ));
    Ok(())
}

#[test]
fn disjoint_mutations_commute() -> Result<()> {
    // Two separate subtrees under distinct roots; mutations in either
    // order must produce identical tables.
    let build = |first_left: bool| -> Result<Vec<(NodeId, NodeId, u64)>> {
        let engine = ClosureEngine::new();
        for id in 1..=6 {
            engine.add_node(NodeId(id), NodeKind::OrgUnit)?;
        }
        engine.add_edge(NodeId(2), NodeId(1))?;
        engine.add_edge(NodeId(5), NodeId(4))?;
        if first_left {
            engine.add_edge(NodeId(3), NodeId(2))?;
            engine.add_edge(NodeId(6), NodeId(5))?;
        } else {
            engine.add_edge(NodeId(6), NodeId(5))?;
            engine.add_edge(NodeId(3), NodeId(2))?;
        }
        Ok(engine.closure_rows())
    };
    assert_eq!(build(true)?, build(false)?);
    Ok(())
}

#[test]
fn cascade_removal_unlinks_the_node_everywhere() -> Result<()> {
    let engine = build_diamond()?;

    engine.remove_node(A)?;

    assert!(!engine.contains_node(A));
    assert_eq!(engine.descendants_of(ROOT), vec![B, C]);
    assert_eq!(engine.ancestors_of(C), vec![ROOT, B]);
    for node in [ROOT, B, C] {
        assert!(!engine.ancestors_of(node).contains(&A));
        assert!(!engine.descendants_of(node).contains(&A));
    }
    assert!(engine.verify().is_empty());

    // The id is free for reuse and comes back isolated.
    engine.add_node(A, NodeKind::OrgUnit)?;
    assert_eq!(engine.ancestors_of(A), Vec::<NodeId>::new());
    Ok(())
}

#[test]
fn removing_the_root_cuts_every_transitive_pair() -> Result<()> {
    let engine = build_diamond()?;
    engine.remove_node(ROOT)?;

    assert_eq!(engine.ancestors_of(C), vec![A, B]);
    assert_eq!(engine.descendants_of(A), vec![C]);
    assert!(engine.verify().is_empty());
    Ok(())
}

#[test]
fn cycle_rejection_spans_long_paths() -> Result<()> {
    let engine = ClosureEngine::new();
    for id in 1..=5 {
        engine.add_node(NodeId(id), NodeKind::OrgUnit)?;
    }
    for id in 2..=5 {
        engine.add_edge(NodeId(id), NodeId(id - 1))?;
    }
    assert!(matches!(
        engine.add_edge(NodeId(1), NodeId(5)),
        Err(EngineError::CycleDetected { .. })
    ));
    assert!(engine.verify().is_empty());
    Ok(())
}

#[test]
fn kind_filtering_separates_members_from_units() -> Result<()> {
    let engine = build_diamond()?;
    assert_eq!(engine.descendants_of_kind(ROOT, NodeKind::Member), vec![C]);
    assert_eq!(
        engine.descendants_of_kind(ROOT, NodeKind::OrgUnit),
        vec![A, B]
    );
    assert_eq!(
        engine.ancestors_of_kind(C, NodeKind::OrgUnit),
        vec![ROOT, A, B]
    );
    assert_eq!(
        engine.ancestors_of_kind(C, NodeKind::Member),
        Vec::<NodeId>::new()
    );
    Ok(())
}

#[test]
fn direct_children_are_not_transitive() -> Result<()> {
    let engine = build_diamond()?;
    assert_eq!(engine.direct_children_of(ROOT), vec![A, B]);
    assert_eq!(engine.direct_parents_of(C), vec![A, B]);
    assert!(engine.verify_children(ROOT, &[A, B]).is_empty());
    assert_eq!(engine.verify_children(ROOT, &[A, B, C]).len(), 1);
    Ok(())
}

#[test]
fn rebuild_reproduces_the_incremental_table() -> Result<()> {
    let engine = build_diamond()?;
    let rows = engine.closure_rows();
    engine.rebuild()?;
    assert_eq!(engine.closure_rows(), rows);
    assert!(engine.verify().is_empty());
    Ok(())
}
