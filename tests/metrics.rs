// tests/metrics.rs

mod common;
use crate::common::builders::{GraphBuilder, chain_graph, reference_graph};

use std::error::Error;
use std::time::Duration;

use flowdag::dag::DependencyGraph;
use flowdag::errors::FlowdagError;
use flowdag::metrics::{GraphMetrics, critical_path, critical_path_length, total_work};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn reference_graph_metrics() -> TestResult {
    let graph = reference_graph(1000);

    assert_eq!(total_work(&graph), Duration::from_millis(7000));
    assert_eq!(critical_path_length(&graph)?, Duration::from_millis(3000));
    assert_eq!(critical_path(&graph)?, ["A", "D", "G"]);
    Ok(())
}

#[test]
fn graph_metrics_summary() -> TestResult {
    let metrics = GraphMetrics::compute(&reference_graph(1000))?;

    assert_eq!(metrics.total_work, Duration::from_millis(7000));
    assert_eq!(metrics.critical_path_length, Duration::from_millis(3000));
    assert_eq!(metrics.critical_path, ["A", "D", "G"]);
    assert_eq!(metrics.antichain_width, 4);
    assert!((metrics.parallelism - 7.0 / 3.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn chain_critical_path_is_the_whole_chain() -> TestResult {
    let graph = chain_graph(4, 250);

    assert_eq!(total_work(&graph), Duration::from_millis(1000));
    assert_eq!(critical_path_length(&graph)?, Duration::from_millis(1000));
    assert_eq!(critical_path(&graph)?, ["n0", "n1", "n2", "n3"]);
    Ok(())
}

#[test]
fn critical_path_follows_heaviest_prerequisite() -> TestResult {
    // start -> {cheap, heavy} -> join
    let graph = GraphBuilder::new()
        .node("start", 10, &[])
        .node("cheap", 20, &["start"])
        .node("heavy", 500, &["start"])
        .node("join", 10, &["cheap", "heavy"])
        .node("side", 100, &[])
        .build();

    assert_eq!(total_work(&graph), Duration::from_millis(640));
    assert_eq!(critical_path_length(&graph)?, Duration::from_millis(520));
    assert_eq!(critical_path(&graph)?, ["start", "heavy", "join"]);
    Ok(())
}

#[test]
fn isolated_heavy_node_dominates() -> TestResult {
    let graph = GraphBuilder::new()
        .node("a", 100, &[])
        .node("b", 100, &["a"])
        .node("solo", 900, &[])
        .build();

    assert_eq!(critical_path_length(&graph)?, Duration::from_millis(900));
    assert_eq!(critical_path(&graph)?, ["solo"]);
    Ok(())
}

#[test]
fn empty_graph_has_zero_metrics() -> TestResult {
    let mut graph = DependencyGraph::new();
    graph.finalize()?;

    let metrics = GraphMetrics::compute(&graph)?;
    assert_eq!(metrics.total_work, Duration::ZERO);
    assert_eq!(metrics.critical_path_length, Duration::ZERO);
    assert!(metrics.critical_path.is_empty());
    assert_eq!(metrics.antichain_width, 0);
    assert_eq!(metrics.parallelism, 0.0);
    Ok(())
}

#[test]
fn metrics_require_finalized_graph() {
    let graph = GraphBuilder::new().node("A", 1, &[]).build_unfinalized();

    assert!(matches!(
        critical_path_length(&graph),
        Err(FlowdagError::NotFinalized)
    ));
    assert!(matches!(GraphMetrics::compute(&graph), Err(FlowdagError::NotFinalized)));
}
