// src/dag/node.rs

use std::time::Duration;

/// Canonical node identifier used throughout the crate.
pub type NodeId = String;

/// A single unit of work in a [`super::DependencyGraph`].
///
/// Nodes are plain data: they never hold references to other nodes, only the
/// ids of their prerequisites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkNode {
    pub id: NodeId,
    /// Declared cost of the node. Sleep-based workloads run for exactly this
    /// long; metrics are computed from it.
    pub workload: Duration,
    /// Nodes that must finish before this one may start.
    pub prerequisites: Vec<NodeId>,
}

impl WorkNode {
    pub fn new(id: impl Into<NodeId>, workload: Duration, prerequisites: Vec<NodeId>) -> Self {
        let mut deduped: Vec<NodeId> = Vec::with_capacity(prerequisites.len());
        for p in prerequisites {
            if !deduped.contains(&p) {
                deduped.push(p);
            }
        }

        Self {
            id: id.into(),
            workload,
            prerequisites: deduped,
        }
    }

    pub fn is_root(&self) -> bool {
        self.prerequisites.is_empty()
    }
}
