// src/engine/report.rs

//! Per-run results.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use anyhow::anyhow;

use crate::dag::{DependencyGraph, NodeId};
use crate::errors::{FlowdagError, Result};
use crate::types::ExecutionMode;

/// Why a node failed directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The workload itself returned an error.
    Workload(String),
    /// Waiting for a prerequisite exceeded the node deadline.
    Timeout { prerequisite: NodeId, after: Duration },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Workload(reason) => write!(f, "workload failed: {reason}"),
            FailureReason::Timeout {
                prerequisite,
                after,
            } => write!(f, "timed out after {after:?} waiting for '{prerequisite}'"),
        }
    }
}

/// Terminal state of a node in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeStatus {
    Completed,
    Failed(FailureReason),
    /// Not executed because `upstream` (a direct prerequisite) did not
    /// complete successfully.
    Skipped { upstream: NodeId },
}

/// What happened to a single node during a run.
///
/// Times are offsets from the start of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub node: NodeId,
    pub status: NodeStatus,
    /// When the workload started; `None` if it never did.
    pub started: Option<Duration>,
    /// When the node reached its terminal state.
    pub finished: Duration,
    /// Position among the nodes whose workload started in this run.
    pub start_seq: Option<usize>,
}

impl NodeRecord {
    pub fn completed(node: NodeId, start_seq: usize, started: Duration, finished: Duration) -> Self {
        Self {
            node,
            status: NodeStatus::Completed,
            started: Some(started),
            finished,
            start_seq: Some(start_seq),
        }
    }

    pub fn failed(
        node: NodeId,
        reason: FailureReason,
        start: Option<(usize, Duration)>,
        finished: Duration,
    ) -> Self {
        Self {
            node,
            status: NodeStatus::Failed(reason),
            started: start.map(|(_, t)| t),
            finished,
            start_seq: start.map(|(seq, _)| seq),
        }
    }

    pub fn skipped(node: NodeId, upstream: NodeId, finished: Duration) -> Self {
        Self {
            node,
            status: NodeStatus::Skipped { upstream },
            started: None,
            finished,
            start_seq: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, NodeStatus::Completed)
    }

    /// Time spent in the workload, if it ran.
    pub fn duration(&self) -> Option<Duration> {
        self.started.map(|s| self.finished.saturating_sub(s))
    }

    /// Error equivalent of a direct failure; `None` for other statuses.
    pub fn to_error(&self) -> Option<FlowdagError> {
        match &self.status {
            NodeStatus::Failed(FailureReason::Workload(reason)) => {
                Some(FlowdagError::WorkloadFailed {
                    node: self.node.clone(),
                    reason: reason.clone(),
                })
            }
            NodeStatus::Failed(FailureReason::Timeout {
                prerequisite,
                after,
            }) => Some(FlowdagError::Timeout {
                node: self.node.clone(),
                prerequisite: prerequisite.clone(),
                after: *after,
            }),
            NodeStatus::Completed | NodeStatus::Skipped { .. } => None,
        }
    }
}

/// Aggregate result of one scheduler run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: ExecutionMode,
    /// Number of worker slots used (1 for sequential runs).
    pub pool_size: usize,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
    /// One record per node, in graph insertion order.
    records: Vec<NodeRecord>,
}

impl RunReport {
    /// Assemble a report; every node of `graph` must have a record.
    pub fn from_records(
        mode: ExecutionMode,
        pool_size: usize,
        elapsed: Duration,
        graph: &DependencyGraph,
        mut records: HashMap<NodeId, NodeRecord>,
    ) -> Result<Self> {
        let mut ordered = Vec::with_capacity(graph.len());
        for node in graph.nodes() {
            let record = records
                .remove(&node.id)
                .ok_or_else(|| anyhow!("run finished without a record for node '{}'", node.id))?;
            ordered.push(record);
        }

        Ok(Self {
            mode,
            pool_size,
            elapsed,
            records: ordered,
        })
    }

    pub fn records(&self) -> &[NodeRecord] {
        &self.records
    }

    pub fn record(&self, node: &str) -> Option<&NodeRecord> {
        self.records.iter().find(|r| r.node == node)
    }

    pub fn completed(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.is_completed())
            .map(|r| r.node.as_str())
            .collect()
    }

    /// Nodes that failed directly, with the reason.
    pub fn failed(&self) -> Vec<(&str, &FailureReason)> {
        self.records
            .iter()
            .filter_map(|r| match &r.status {
                NodeStatus::Failed(reason) => Some((r.node.as_str(), reason)),
                _ => None,
            })
            .collect()
    }

    /// Nodes skipped because of an upstream failure, with that upstream node.
    pub fn skipped(&self) -> Vec<(&str, &str)> {
        self.records
            .iter()
            .filter_map(|r| match &r.status {
                NodeStatus::Skipped { upstream } => Some((r.node.as_str(), upstream.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.records.iter().all(NodeRecord::is_completed)
    }

    /// Nodes whose workload started, in the order they started.
    pub fn execution_order(&self) -> Vec<&str> {
        let mut started: Vec<&NodeRecord> =
            self.records.iter().filter(|r| r.start_seq.is_some()).collect();
        started.sort_by_key(|r| r.start_seq);
        started.into_iter().map(|r| r.node.as_str()).collect()
    }

    /// Earliest direct failure of the run.
    pub fn first_failure(&self) -> Option<&NodeRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.status, NodeStatus::Failed(_)))
            .min_by_key(|r| r.finished)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} run: {} ms (pool size {})",
            self.mode,
            self.elapsed.as_millis(),
            self.pool_size
        )?;

        for record in &self.records {
            match &record.status {
                NodeStatus::Completed => writeln!(
                    f,
                    "  {:<12} completed  start {:>6} ms  end {:>6} ms",
                    record.node,
                    record.started.unwrap_or_default().as_millis(),
                    record.finished.as_millis()
                )?,
                NodeStatus::Failed(reason) => {
                    writeln!(f, "  {:<12} failed     {reason}", record.node)?
                }
                NodeStatus::Skipped { upstream } => {
                    writeln!(f, "  {:<12} skipped    upstream '{upstream}' failed", record.node)?
                }
            }
        }

        Ok(())
    }
}
