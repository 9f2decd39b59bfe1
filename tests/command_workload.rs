// tests/command_workload.rs
#![cfg(unix)]

mod common;
use crate::common::builders::{GraphFileBuilder, NodeConfigBuilder};
use crate::common::{init_tracing, with_timeout};

use std::collections::HashMap;
use std::error::Error;
use std::time::Duration;

use flowdag::dag::WorkNode;
use flowdag::engine::{FailureReason, NodeStatus, Scheduler};
use flowdag::errors::WorkloadError;
use flowdag::exec::{CommandWorkload, Workload};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn command_exit_status_decides_outcome() -> TestResult {
    init_tracing();

    let commands = HashMap::from([
        ("ok".to_string(), "echo hello".to_string()),
        ("bad".to_string(), "exit 3".to_string()),
    ]);
    let workload = CommandWorkload::new(commands);

    let ok = WorkNode::new("ok".to_string(), Duration::from_millis(1), vec![]);
    let bad = WorkNode::new("bad".to_string(), Duration::from_millis(1), vec![]);

    workload.run(&ok).await?;
    match workload.run(&bad).await {
        Err(WorkloadError::ExitStatus(code)) => assert_eq!(code, 3),
        other => panic!("Expected ExitStatus, got: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn nodes_without_command_sleep() -> TestResult {
    let workload = CommandWorkload::default();
    assert!(workload.command_for("idle").is_none());

    let idle = WorkNode::new("idle".to_string(), Duration::from_millis(30), vec![]);
    let start = tokio::time::Instant::now();
    workload.run(&idle).await?;
    assert!(start.elapsed() >= Duration::from_millis(30));
    Ok(())
}

#[tokio::test]
async fn commands_see_prerequisite_side_effects() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let marker = dir.path().join("marker");
    let marker = marker.display();

    let cfg = GraphFileBuilder::new()
        .with_node(
            NodeConfigBuilder::new("check", 1)
                .after("write")
                .cmd(&format!("test -f {marker}"))
                .build(),
        )
        .with_node(
            NodeConfigBuilder::new("write", 1)
                .cmd(&format!("sleep 0.05 && touch {marker}"))
                .build(),
        )
        .build();

    let scheduler = Scheduler::new(CommandWorkload::new(cfg.commands), cfg.scheduler);
    let report = with_timeout(scheduler.run_parallel(&cfg.graph)).await?;

    assert!(report.is_success(), "report:\n{report}");
    assert_eq!(report.execution_order(), ["write", "check"]);
    Ok(())
}

#[tokio::test]
async fn failing_command_skips_dependents() -> TestResult {
    init_tracing();

    let cfg = GraphFileBuilder::new()
        .with_node(NodeConfigBuilder::new("fetch", 1).cmd("false").build())
        .with_node(NodeConfigBuilder::new("build", 1).after("fetch").cmd("true").build())
        .with_node(NodeConfigBuilder::new("lint", 1).cmd("true").build())
        .build();

    let scheduler = Scheduler::new(CommandWorkload::new(cfg.commands), cfg.scheduler);
    let report = with_timeout(scheduler.run_sequential(&cfg.graph)).await?;

    match &report.record("fetch").expect("record present").status {
        NodeStatus::Failed(FailureReason::Workload(reason)) => {
            assert!(reason.contains("status 1"), "reason: {reason}")
        }
        other => panic!("unexpected status: {:?}", other),
    }
    assert_eq!(report.skipped(), [("build", "fetch")]);
    assert_eq!(report.completed(), ["lint"]);
    Ok(())
}
