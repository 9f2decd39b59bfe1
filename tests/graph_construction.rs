// tests/graph_construction.rs

mod common;
use crate::common::builders::{
    GraphBuilder, chain_graph, reference_graph, reference_graph_dependents_first,
};

use std::error::Error;
use std::time::Duration;

use flowdag::dag::DependencyGraph;
use flowdag::errors::FlowdagError;

type TestResult = Result<(), Box<dyn Error>>;

const MS: Duration = Duration::from_millis(1);

#[test]
fn duplicate_node_is_rejected_immediately() -> TestResult {
    let mut graph = DependencyGraph::new();
    graph.add_node("A", MS, Vec::<String>::new())?;

    match graph.add_node("A", MS, Vec::<String>::new()) {
        Err(FlowdagError::DuplicateNode(id)) => assert_eq!(id, "A"),
        other => panic!("Expected DuplicateNode, got: {:?}", other),
    }

    assert_eq!(graph.len(), 1);
    Ok(())
}

#[test]
fn zero_workload_is_rejected() -> TestResult {
    let mut graph = DependencyGraph::new();

    match graph.add_node("A", Duration::ZERO, Vec::<String>::new()) {
        Err(FlowdagError::NonPositiveWorkload(id)) => assert_eq!(id, "A"),
        other => panic!("Expected NonPositiveWorkload, got: {:?}", other),
    }

    assert!(graph.is_empty());
    graph.add_node("A", Duration::from_nanos(1), Vec::<String>::new())?;
    graph.finalize()?;
    Ok(())
}

#[test]
fn forward_references_are_resolved_at_finalize() -> TestResult {
    let mut graph = DependencyGraph::new();
    graph.add_node("B", MS, ["A"])?;
    graph.add_node("A", MS, Vec::<String>::new())?;
    graph.finalize()?;

    assert_eq!(graph.topological_order()?, ["A", "B"]);
    assert_eq!(graph.prerequisites_of("B")?, ["A"]);
    assert_eq!(graph.dependents_of("A")?, ["B"]);
    Ok(())
}

#[test]
fn unknown_prerequisite_fails_finalize() -> TestResult {
    let mut graph = DependencyGraph::new();
    graph.add_node("A", MS, ["Missing"])?;

    match graph.finalize() {
        Err(FlowdagError::UnknownPrerequisite { node, prerequisite }) => {
            assert_eq!(node, "A");
            assert_eq!(prerequisite, "Missing");
        }
        other => panic!("Expected UnknownPrerequisite, got: {:?}", other),
    }
    Ok(())
}

#[test]
fn self_reference_is_a_cycle() -> TestResult {
    let mut graph = DependencyGraph::new();
    graph.add_node("A", MS, ["A"])?;

    match graph.finalize() {
        Err(FlowdagError::CyclicDependency(node)) => assert_eq!(node, "A"),
        other => panic!("Expected CyclicDependency, got: {:?}", other),
    }
    Ok(())
}

#[test]
fn mutual_cycle_names_a_node_on_the_cycle_and_poisons_the_graph() -> TestResult {
    let mut graph = DependencyGraph::new();
    graph.add_node("X", MS, Vec::<String>::new())?;
    graph.add_node("Y", MS, ["X", "Z"])?;
    graph.add_node("Z", MS, ["Y"])?;
    graph.add_node("W", MS, ["Z"])?;

    match graph.finalize() {
        Err(FlowdagError::CyclicDependency(node)) => {
            assert!(node == "Y" || node == "Z", "unexpected cycle node {node}");
        }
        other => panic!("Expected CyclicDependency, got: {:?}", other),
    }

    assert!(!graph.is_finalized());
    assert!(matches!(
        graph.topological_order(),
        Err(FlowdagError::GraphUnusable(_))
    ));
    assert!(matches!(
        graph.max_antichain_width(),
        Err(FlowdagError::GraphUnusable(_))
    ));
    assert!(matches!(
        graph.add_node("V", MS, Vec::<String>::new()),
        Err(FlowdagError::GraphUnusable(_))
    ));
    assert!(matches!(graph.finalize(), Err(FlowdagError::GraphUnusable(_))));
    Ok(())
}

#[test]
fn frozen_graph_rejects_new_nodes() -> TestResult {
    let mut graph = reference_graph(1);

    match graph.add_node("H", MS, ["G"]) {
        Err(FlowdagError::GraphFrozen(id)) => assert_eq!(id, "H"),
        other => panic!("Expected GraphFrozen, got: {:?}", other),
    }

    // Finalizing again is a no-op.
    graph.finalize()?;
    assert_eq!(graph.len(), 7);
    Ok(())
}

#[test]
fn queries_require_a_finalized_graph() -> TestResult {
    let graph = GraphBuilder::new()
        .node("A", 1, &[])
        .node("B", 1, &["A"])
        .build_unfinalized();

    assert!(matches!(graph.topological_order(), Err(FlowdagError::NotFinalized)));
    assert!(matches!(graph.dependents_of("A"), Err(FlowdagError::NotFinalized)));
    assert!(matches!(graph.max_antichain_width(), Err(FlowdagError::NotFinalized)));

    // Plain node data is available while building.
    assert_eq!(graph.node("B").map(|n| n.prerequisites.len()), Some(1));
    Ok(())
}

#[test]
fn unknown_ids_are_reported() -> TestResult {
    let graph = reference_graph(1);

    assert!(matches!(
        graph.dependents_of("nope"),
        Err(FlowdagError::NodeNotFound(id)) if id == "nope"
    ));
    assert!(graph.node("nope").is_none());
    Ok(())
}

#[test]
fn topological_order_breaks_ties_by_insertion_order() -> TestResult {
    let graph = reference_graph(1);
    assert_eq!(graph.topological_order()?, ["A", "B", "C", "D", "E", "F", "G"]);

    let graph = reference_graph_dependents_first(1);
    assert_eq!(graph.topological_order()?, ["A", "C", "B", "D", "G", "E", "F"]);
    Ok(())
}

#[test]
fn adjacency_and_in_degree_lookups() -> TestResult {
    let graph = reference_graph(1);

    assert_eq!(graph.prerequisites_of("D")?, ["A", "B"]);
    assert_eq!(graph.dependents_of("A")?, ["C", "D"]);
    assert_eq!(graph.dependents_of("B")?, ["D", "E", "F"]);
    assert!(graph.dependents_of("G")?.is_empty());

    assert_eq!(graph.in_degree("A")?, 0);
    assert_eq!(graph.in_degree("D")?, 2);

    let roots: Vec<&str> = graph.roots().map(|n| n.id.as_str()).collect();
    assert_eq!(roots, ["A", "B"]);
    Ok(())
}

#[test]
fn duplicate_prerequisites_collapse() -> TestResult {
    let mut graph = DependencyGraph::new();
    graph.add_node("A", MS, Vec::<String>::new())?;
    graph.add_node("B", MS, ["A", "A"])?;
    graph.finalize()?;

    assert_eq!(graph.prerequisites_of("B")?, ["A"]);
    assert_eq!(graph.dependents_of("A")?, ["B"]);
    Ok(())
}

#[test]
fn antichain_width_matches_graph_shape() -> TestResult {
    assert_eq!(reference_graph(1).max_antichain_width()?, 4);
    assert_eq!(reference_graph_dependents_first(1).max_antichain_width()?, 4);
    assert_eq!(chain_graph(5, 1).max_antichain_width()?, 1);

    let independent = GraphBuilder::new()
        .node("a", 1, &[])
        .node("b", 1, &[])
        .node("c", 1, &[])
        .build();
    assert_eq!(independent.max_antichain_width()?, 3);

    // Two parallel chains joined at the end.
    let ladder = GraphBuilder::new()
        .node("a1", 1, &[])
        .node("a2", 1, &["a1"])
        .node("b1", 1, &[])
        .node("b2", 1, &["b1"])
        .node("end", 1, &["a2", "b2"])
        .build();
    assert_eq!(ladder.max_antichain_width()?, 2);

    let mut empty = DependencyGraph::new();
    empty.finalize()?;
    assert_eq!(empty.max_antichain_width()?, 0);
    assert!(empty.topological_order()?.is_empty());
    Ok(())
}
