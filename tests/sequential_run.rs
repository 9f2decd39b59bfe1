// tests/sequential_run.rs

mod common;
use crate::common::builders::{GraphBuilder, reference_graph, reference_graph_dependents_first};
use crate::common::{RecordingWorkload, assert_edges_respected, init_tracing, with_timeout};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use flowdag::engine::{ExecutionMode, Scheduler, SchedulerConfig};
use flowdag::errors::FlowdagError;
use flowdag::metrics::total_work;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn sequential_follows_topological_order() -> TestResult {
    init_tracing();

    let graph = reference_graph(10);
    let workload = Arc::new(RecordingWorkload::new());
    let scheduler = Scheduler::with_shared_workload(Arc::clone(&workload), SchedulerConfig::default());

    let report = with_timeout(scheduler.run_sequential(&graph)).await?;

    assert!(report.is_success());
    assert_eq!(report.mode, ExecutionMode::Sequential);
    assert_eq!(report.pool_size, 1);
    assert_eq!(report.execution_order(), ["A", "B", "C", "D", "E", "F", "G"]);
    assert_eq!(workload.started(), ["A", "B", "C", "D", "E", "F", "G"]);
    assert_eq!(workload.max_concurrency(), 1);
    assert_edges_respected(&graph, &report);
    Ok(())
}

#[tokio::test]
async fn sequential_ignores_declaration_order() -> TestResult {
    init_tracing();

    let graph = reference_graph_dependents_first(5);
    let scheduler = Scheduler::new(RecordingWorkload::new(), SchedulerConfig::default());

    let report = with_timeout(scheduler.run(&graph, ExecutionMode::Sequential)).await?;

    assert!(report.is_success());
    assert_eq!(report.execution_order(), ["A", "C", "B", "D", "G", "E", "F"]);
    Ok(())
}

#[tokio::test]
async fn sequential_runtime_is_total_work() -> TestResult {
    init_tracing();

    let graph = reference_graph(50);
    let scheduler = Scheduler::new(RecordingWorkload::new(), SchedulerConfig::default());

    let report = with_timeout(scheduler.run_sequential(&graph)).await?;
    let total = total_work(&graph);

    assert!(report.elapsed >= total, "{:?} < {:?}", report.elapsed, total);
    assert!(report.elapsed < total + Duration::from_millis(200));

    // Nodes never overlap.
    let mut records: Vec<_> = report.records().iter().collect();
    records.sort_by_key(|r| r.start_seq);
    for pair in records.windows(2) {
        assert!(pair[1].started >= Some(pair[0].finished));
    }
    Ok(())
}

#[tokio::test]
async fn sequential_requires_finalized_graph() -> TestResult {
    let graph = GraphBuilder::new().node("A", 1, &[]).build_unfinalized();
    let scheduler = Scheduler::new(RecordingWorkload::new(), SchedulerConfig::default());

    assert!(matches!(
        scheduler.run_sequential(&graph).await,
        Err(FlowdagError::NotFinalized)
    ));
    Ok(())
}

#[tokio::test]
async fn parallel_then_sequential_on_same_graph() -> TestResult {
    init_tracing();

    let graph = reference_graph(20);
    let scheduler = Scheduler::new(RecordingWorkload::new(), SchedulerConfig::default());

    let parallel = with_timeout(scheduler.run(&graph, ExecutionMode::Parallel)).await?;
    let sequential = with_timeout(scheduler.run(&graph, ExecutionMode::Sequential)).await?;

    assert!(parallel.is_success());
    assert!(sequential.is_success());
    assert!(parallel.elapsed < sequential.elapsed);
    assert_eq!(scheduler.workload().run_count("G"), 2);
    Ok(())
}
