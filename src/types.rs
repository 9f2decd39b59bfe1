use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Which scheduler runs to perform for a graph file.
///
/// `Both` runs the parallel schedule first and the sequential one second,
/// reusing the same frozen graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    Parallel,
    Sequential,
    Both,
}

impl Default for ScheduleMode {
    fn default() -> Self {
        ScheduleMode::Parallel
    }
}

impl FromStr for ScheduleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "parallel" => Ok(ScheduleMode::Parallel),
            "sequential" => Ok(ScheduleMode::Sequential),
            "both" => Ok(ScheduleMode::Both),
            other => Err(format!(
                "invalid mode: {other} (expected \"parallel\", \"sequential\" or \"both\")"
            )),
        }
    }
}

/// Order in which node tasks claim worker slots in a parallel run.
///
/// - `Topological`: claim slots in the graph's topological order. Every
///   claimed task's prerequisites were claimed before it.
/// - `Declaration`: claim slots in insertion order, like handing every node
///   to a fixed thread pool as it was declared. With forward references this
///   can park dependents in slots before their prerequisites start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchOrder {
    Topological,
    Declaration,
}

impl Default for LaunchOrder {
    fn default() -> Self {
        LaunchOrder::Topological
    }
}

impl FromStr for LaunchOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "topological" => Ok(LaunchOrder::Topological),
            "declaration" => Ok(LaunchOrder::Declaration),
            other => Err(format!(
                "invalid launch_order: {other} (expected \"topological\" or \"declaration\")"
            )),
        }
    }
}

/// What a run does when a node fails (workload error or prerequisite timeout).
///
/// In both policies the failed node's signal arrives in the failed state and
/// its dependents are skipped without running their workload.
///
/// - `Propagate`: the run finishes normally and the failures are listed in
///   the [`crate::engine::RunReport`].
/// - `FailFast`: the first failure is returned as an error once the run has
///   settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    Propagate,
    FailFast,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Propagate
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "propagate" => Ok(FailurePolicy::Propagate),
            "fail_fast" => Ok(FailurePolicy::FailFast),
            other => Err(format!(
                "invalid failure_policy: {other} (expected \"propagate\" or \"fail_fast\")"
            )),
        }
    }
}

/// Execution mode recorded in a run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Parallel,
    Sequential,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Parallel => f.write_str("parallel"),
            ExecutionMode::Sequential => f.write_str("sequential"),
        }
    }
}
