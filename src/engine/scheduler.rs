// src/engine/scheduler.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::dag::DependencyGraph;
use crate::engine::report::RunReport;
use crate::errors::Result;
use crate::exec::Workload;
use crate::types::{ExecutionMode, FailurePolicy, LaunchOrder};

/// Knobs for a [`Scheduler`].
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    /// Worker slots for parallel runs; `None` means one slot per node.
    pub pool_size: Option<usize>,
    /// Keep a `pool_size` below the starvation-free floor instead of raising
    /// it. Only useful to demonstrate starvation.
    pub allow_undersized_pool: bool,
    pub launch_order: LaunchOrder,
    pub failure_policy: FailurePolicy,
    /// Deadline for a node to see all its prerequisites done, measured from
    /// the moment its task starts waiting. `None` waits forever.
    pub node_timeout: Option<Duration>,
}

/// Drives every node of a frozen [`DependencyGraph`] through a [`Workload`].
///
/// The scheduler holds no per-run state: each call to
/// [`run_parallel`](Self::run_parallel) or [`run_sequential`](Self::run_sequential)
/// allocates its own completion signals, so the same graph can be scheduled
/// any number of times.
pub struct Scheduler<W: Workload + 'static> {
    pub(crate) workload: Arc<W>,
    pub(crate) config: SchedulerConfig,
}

impl<W: Workload + 'static> fmt::Debug for Scheduler<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<W: Workload + 'static> Scheduler<W> {
    pub fn new(workload: W, config: SchedulerConfig) -> Self {
        Self::with_shared_workload(Arc::new(workload), config)
    }

    /// Build a scheduler around a workload the caller keeps a handle to.
    pub fn with_shared_workload(workload: Arc<W>, config: SchedulerConfig) -> Self {
        Self { workload, config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn workload(&self) -> &W {
        &self.workload
    }

    /// Run the graph in the given mode.
    pub async fn run(&self, graph: &DependencyGraph, mode: ExecutionMode) -> Result<RunReport> {
        match mode {
            ExecutionMode::Parallel => self.run_parallel(graph).await,
            ExecutionMode::Sequential => self.run_sequential(graph).await,
        }
    }

    /// Turn a settled report into an error under [`FailurePolicy::FailFast`].
    pub(crate) fn apply_failure_policy(&self, report: RunReport) -> Result<RunReport> {
        match self.config.failure_policy {
            FailurePolicy::Propagate => Ok(report),
            FailurePolicy::FailFast => match report.first_failure().and_then(|r| r.to_error()) {
                Some(err) => {
                    warn!(mode = %report.mode, error = %err, "run failed under fail_fast policy");
                    Err(err)
                }
                None => Ok(report),
            },
        }
    }
}
