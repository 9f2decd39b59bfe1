// src/metrics.rs

//! Static schedule metrics.
//!
//! Everything here is derived from the frozen graph alone; nothing is
//! executed. For any run of a graph:
//!
//! `critical_path_length <= parallel wall-clock <= total_work`

use std::collections::HashMap;
use std::time::Duration;

use crate::dag::{DependencyGraph, NodeId};
use crate::errors::{FlowdagError, Result};

/// Sum of every node's workload, i.e. the sequential runtime.
pub fn total_work(graph: &DependencyGraph) -> Duration {
    graph.nodes().map(|n| n.workload).sum()
}

/// Length of the longest workload-weighted path through the graph.
///
/// This is the minimum possible wall-clock time of a parallel run with
/// unlimited workers.
pub fn critical_path_length(graph: &DependencyGraph) -> Result<Duration> {
    let finish = earliest_finish(graph)?;
    Ok(finish.values().map(|(t, _)| *t).max().unwrap_or_default())
}

/// Node ids along one longest path, from its root to its last node.
///
/// Ties between equally long predecessors go to the one declared first.
pub fn critical_path(graph: &DependencyGraph) -> Result<Vec<NodeId>> {
    let finish = earliest_finish(graph)?;

    // First node (in topological order) that reaches the maximum finish time.
    let mut tail: Option<(&str, Duration)> = None;
    for id in graph.topological_order()? {
        let t = finish.get(id.as_str()).map(|(t, _)| *t).unwrap_or_default();
        if tail.is_none_or(|(_, best)| t > best) {
            tail = Some((id.as_str(), t));
        }
    }

    let mut path = Vec::new();
    let mut cursor = tail.map(|(id, _)| id);
    while let Some(id) = cursor {
        path.push(id.to_string());
        cursor = finish.get(id).and_then(|(_, via)| *via);
    }
    path.reverse();
    Ok(path)
}

/// Earliest finish time of every node under unlimited parallelism, together
/// with the prerequisite that determined it.
fn earliest_finish(graph: &DependencyGraph) -> Result<HashMap<&str, (Duration, Option<&str>)>> {
    let mut finish: HashMap<&str, (Duration, Option<&str>)> = HashMap::with_capacity(graph.len());

    for id in graph.topological_order()? {
        let node = graph
            .node(id)
            .ok_or_else(|| FlowdagError::NodeNotFound(id.clone()))?;

        let mut ready_at = Duration::ZERO;
        let mut via = None;
        for prerequisite in &node.prerequisites {
            let (t, _) = finish
                .get(prerequisite.as_str())
                .copied()
                .ok_or_else(|| FlowdagError::NodeNotFound(prerequisite.clone()))?;
            if via.is_none() || t > ready_at {
                ready_at = t;
                via = Some(prerequisite.as_str());
            }
        }

        finish.insert(id.as_str(), (ready_at + node.workload, via));
    }

    Ok(finish)
}

/// Summary of the static metrics of a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphMetrics {
    pub total_work: Duration,
    pub critical_path_length: Duration,
    pub critical_path: Vec<NodeId>,
    pub antichain_width: usize,
    /// `total_work / critical_path_length`: the best speed-up any pool size
    /// can reach.
    pub parallelism: f64,
}

impl GraphMetrics {
    pub fn compute(graph: &DependencyGraph) -> Result<Self> {
        let total_work = total_work(graph);
        let critical_path_length = critical_path_length(graph)?;
        let parallelism = if critical_path_length.is_zero() {
            0.0
        } else {
            total_work.as_secs_f64() / critical_path_length.as_secs_f64()
        };

        Ok(Self {
            total_work,
            critical_path_length,
            critical_path: critical_path(graph)?,
            antichain_width: graph.max_antichain_width()?,
            parallelism,
        })
    }
}
