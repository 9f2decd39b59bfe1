// src/engine/sequential.rs

//! Sequential execution in topological order.

use std::collections::HashMap;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::dag::{DependencyGraph, NodeId};
use crate::engine::report::{FailureReason, NodeRecord, RunReport};
use crate::engine::scheduler::Scheduler;
use crate::errors::{FlowdagError, Result};
use crate::exec::Workload;
use crate::types::{ExecutionMode, FailurePolicy};

impl<W: Workload + 'static> Scheduler<W> {
    /// Execute nodes one at a time in the graph's topological order.
    ///
    /// No signalling is involved: by the time a node runs, every
    /// prerequisite has already finished. Dependents of a failed node are
    /// skipped; under [`FailurePolicy::FailFast`] the run stops at the first
    /// failure.
    pub async fn run_sequential(&self, graph: &DependencyGraph) -> Result<RunReport> {
        let order = graph.topological_order()?;
        info!(nodes = graph.len(), ?order, "starting sequential run");

        let run_start = Instant::now();
        let mut records: HashMap<NodeId, NodeRecord> = HashMap::with_capacity(graph.len());
        let mut seq = 0usize;

        for id in order {
            let node = graph
                .node(id)
                .ok_or_else(|| FlowdagError::NodeNotFound(id.clone()))?;

            // Prerequisites precede `node` in the order, so they all have a record.
            let upstream = node
                .prerequisites
                .iter()
                .find(|p| records.get(p.as_str()).is_some_and(|r| !r.is_completed()));

            if let Some(upstream) = upstream {
                info!(node = %id, upstream = %upstream, "prerequisite failed; skipping node");
                let record = NodeRecord::skipped(id.clone(), upstream.clone(), run_start.elapsed());
                records.insert(id.clone(), record);
                continue;
            }

            let started = run_start.elapsed();
            info!(node = %id, at_ms = started.as_millis() as u64, "node started");

            let outcome = self.workload.run(node).await;
            let finished = run_start.elapsed();

            let record = match outcome {
                Ok(()) => {
                    info!(
                        node = %id,
                        elapsed_ms = (finished - started).as_millis() as u64,
                        "node finished"
                    );
                    NodeRecord::completed(id.clone(), seq, started, finished)
                }
                Err(err) => {
                    warn!(node = %id, error = %err, "node workload failed");
                    if self.config.failure_policy == FailurePolicy::FailFast {
                        return Err(FlowdagError::WorkloadFailed {
                            node: id.clone(),
                            reason: err.to_string(),
                        });
                    }
                    NodeRecord::failed(
                        id.clone(),
                        FailureReason::Workload(err.to_string()),
                        Some((seq, started)),
                        finished,
                    )
                }
            };

            seq += 1;
            records.insert(id.clone(), record);
        }

        let elapsed = run_start.elapsed();
        let report = RunReport::from_records(ExecutionMode::Sequential, 1, elapsed, graph, records)?;

        info!(
            elapsed_ms = elapsed.as_millis() as u64,
            completed = report.completed().len(),
            failed = report.failed().len(),
            skipped = report.skipped().len(),
            "sequential run finished"
        );

        self.apply_failure_policy(report)
    }
}
