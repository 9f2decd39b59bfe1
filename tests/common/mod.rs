#![allow(dead_code)]

pub use flowdag_test_utils::builders;
pub use flowdag_test_utils::fake_workload::RecordingWorkload;
pub use flowdag_test_utils::{init_tracing, with_timeout};

use std::sync::Arc;

use flowdag::dag::DependencyGraph;
use flowdag::engine::RunReport;

/// Shared recording workload that fails the given nodes.
pub fn fake_workload_for(failing: &[&str]) -> Arc<RecordingWorkload> {
    Arc::new(RecordingWorkload::failing(failing))
}

/// Assert that every dependent started no earlier than each of its
/// prerequisites finished, for every node that actually ran.
pub fn assert_edges_respected(graph: &DependencyGraph, report: &RunReport) {
    for node in graph.nodes() {
        let Some(started) = report.record(&node.id).and_then(|r| r.started) else {
            continue;
        };
        for prerequisite in &node.prerequisites {
            let prereq = report
                .record(prerequisite)
                .expect("prerequisite missing from report");
            assert!(
                prereq.is_completed(),
                "{} ran although prerequisite {} did not complete",
                node.id,
                prerequisite
            );
            assert!(
                started >= prereq.finished,
                "{} started at {:?} before prerequisite {} finished at {:?}",
                node.id,
                started,
                prerequisite,
                prereq.finished
            );
        }
    }
}
