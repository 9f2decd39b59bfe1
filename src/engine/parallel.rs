// src/engine/parallel.rs

//! Parallel execution: one task per node, gated by completion signals.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::dag::{DependencyGraph, NodeId, WorkNode};
use crate::engine::pool::plan_pool;
use crate::engine::report::{FailureReason, NodeRecord, RunReport};
use crate::engine::scheduler::Scheduler;
use crate::errors::{FlowdagError, Result};
use crate::exec::Workload;
use crate::signal::{Completion, CompletionSignal};
use crate::types::ExecutionMode;

/// Everything a node task needs, owned so the task is `'static`.
struct NodeTask<W: Workload + 'static> {
    node: WorkNode,
    prerequisites: Vec<CompletionSignal>,
    signal: CompletionSignal,
    workload: Arc<W>,
    run_start: Instant,
    start_seq: Arc<AtomicUsize>,
    timeout: Option<Duration>,
    /// Held for the whole lifetime of the task.
    _slot: OwnedSemaphorePermit,
}

impl<W: Workload + 'static> Scheduler<W> {
    /// Execute every node concurrently, each as soon as its prerequisites
    /// are done.
    ///
    /// Returns once every node task has finished. A node whose workload
    /// fails, or whose prerequisite wait times out, arrives failed; its
    /// dependents are skipped. Internal errors abort the remaining tasks and
    /// are returned directly.
    pub async fn run_parallel(&self, graph: &DependencyGraph) -> Result<RunReport> {
        let plan = plan_pool(graph, &self.config)?;

        info!(
            nodes = graph.len(),
            pool_size = plan.slots,
            floor = ?plan.floor,
            antichain_width = ?plan.antichain_width,
            "starting parallel run"
        );

        // Signals are scoped to this run only.
        let signals: HashMap<NodeId, CompletionSignal> = graph
            .nodes()
            .map(|n| (n.id.clone(), CompletionSignal::new(n.id.clone())))
            .collect();

        let slots = Arc::new(Semaphore::new(plan.slots));
        let start_seq = Arc::new(AtomicUsize::new(0));
        let run_start = Instant::now();
        let mut tasks: JoinSet<Result<NodeRecord>> = JoinSet::new();

        for id in &plan.launch_order {
            let slot = Arc::clone(&slots).acquire_owned().await?;
            debug!(node = %id, "slot claimed; launching node task");

            let node = graph
                .node(id)
                .cloned()
                .ok_or_else(|| FlowdagError::NodeNotFound(id.clone()))?;
            let prerequisites = node
                .prerequisites
                .iter()
                .map(|p| lookup_signal(&signals, p))
                .collect::<Result<Vec<_>>>()?;

            let task = NodeTask {
                signal: lookup_signal(&signals, id)?,
                node,
                prerequisites,
                workload: Arc::clone(&self.workload),
                run_start,
                start_seq: Arc::clone(&start_seq),
                timeout: self.config.node_timeout,
                _slot: slot,
            };

            tasks.spawn(task.run());
        }

        let mut records = HashMap::with_capacity(graph.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(record)) => {
                    records.insert(record.node.clone(), record);
                }
                Ok(Err(err)) => {
                    error!(error = %err, "node task hit an internal error; aborting run");
                    tasks.abort_all();
                    return Err(err);
                }
                Err(join_err) => {
                    error!(error = %join_err, "node task panicked; aborting run");
                    tasks.abort_all();
                    return Err(join_err.into());
                }
            }
        }

        let elapsed = run_start.elapsed();
        let report =
            RunReport::from_records(ExecutionMode::Parallel, plan.slots, elapsed, graph, records)?;

        info!(
            elapsed_ms = elapsed.as_millis() as u64,
            completed = report.completed().len(),
            failed = report.failed().len(),
            skipped = report.skipped().len(),
            "parallel run finished"
        );

        self.apply_failure_policy(report)
    }
}

fn lookup_signal(signals: &HashMap<NodeId, CompletionSignal>, id: &str) -> Result<CompletionSignal> {
    signals
        .get(id)
        .cloned()
        .ok_or_else(|| FlowdagError::NodeNotFound(id.to_string()))
}

impl<W: Workload + 'static> NodeTask<W> {
    async fn run(self) -> Result<NodeRecord> {
        let id = self.node.id.clone();
        let deadline = self.timeout.map(|t| Instant::now() + t);

        // Order of checking is irrelevant: all of them must be done.
        for prerequisite in &self.prerequisites {
            let waited = match deadline {
                Some(deadline) => prerequisite.await_done_until(&id, deadline).await,
                None => prerequisite.await_done().await,
            };

            match waited {
                Ok(Completion::Succeeded) => {}
                Ok(Completion::Failed) => {
                    let upstream = prerequisite.node().to_string();
                    info!(node = %id, upstream = %upstream, "prerequisite failed; skipping node");
                    self.signal.arrive(Completion::Failed)?;
                    return Ok(NodeRecord::skipped(id, upstream, self.run_start.elapsed()));
                }
                Err(FlowdagError::Timeout {
                    prerequisite,
                    after,
                    ..
                }) => {
                    warn!(
                        node = %id,
                        prerequisite = %prerequisite,
                        waited_ms = after.as_millis() as u64,
                        "timed out waiting for prerequisite"
                    );
                    self.signal.arrive(Completion::Failed)?;
                    return Ok(NodeRecord::failed(
                        id,
                        FailureReason::Timeout {
                            prerequisite,
                            after,
                        },
                        None,
                        self.run_start.elapsed(),
                    ));
                }
                Err(err) => return Err(err),
            }
        }

        let seq = self.start_seq.fetch_add(1, Ordering::SeqCst);
        let started = self.run_start.elapsed();
        info!(node = %id, at_ms = started.as_millis() as u64, "node started");

        let outcome = self.workload.run(&self.node).await;
        let finished = self.run_start.elapsed();

        match outcome {
            Ok(()) => {
                info!(
                    node = %id,
                    elapsed_ms = (finished - started).as_millis() as u64,
                    "node finished"
                );
                self.signal.arrive(Completion::Succeeded)?;
                Ok(NodeRecord::completed(id, seq, started, finished))
            }
            Err(err) => {
                warn!(node = %id, error = %err, "node workload failed");
                self.signal.arrive(Completion::Failed)?;
                Ok(NodeRecord::failed(
                    id,
                    FailureReason::Workload(err.to_string()),
                    Some((seq, started)),
                    finished,
                ))
            }
        }
    }
}
