// src/config/model.rs

use std::collections::HashMap;

use serde::Deserialize;

use crate::dag::{DependencyGraph, NodeId};
use crate::engine::SchedulerConfig;
use crate::types::{FailurePolicy, LaunchOrder, ScheduleMode};

/// Graph file as read from TOML, before validation.
///
/// ```toml
/// [scheduler]
/// mode = "both"
/// pool_size = 7
///
/// [[node]]
/// id = "A"
/// workload_ms = 1000
///
/// [[node]]
/// id = "C"
/// workload_ms = 1000
/// after = ["A"]
/// ```
///
/// Nodes are an array of tables so that declaration order survives
/// deserialization; it breaks ties in the topological order.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGraphFile {
    #[serde(default)]
    pub scheduler: SchedulerSection,

    #[serde(default)]
    pub node: Vec<NodeConfig>,
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulerSection {
    #[serde(default)]
    pub mode: ScheduleMode,

    /// Worker slots for parallel runs; defaults to one per node.
    #[serde(default)]
    pub pool_size: Option<usize>,

    #[serde(default)]
    pub allow_undersized_pool: bool,

    #[serde(default)]
    pub launch_order: LaunchOrder,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Prerequisite deadline per node, in milliseconds.
    #[serde(default)]
    pub node_timeout_ms: Option<u64>,
}

/// `[[node]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    pub id: String,

    /// Declared cost in milliseconds. Must be positive.
    pub workload_ms: u64,

    /// Prerequisites: this node waits for every node listed here.
    #[serde(default)]
    pub after: Vec<String>,

    /// Optional shell command run as the node's workload. Without one the
    /// node sleeps for `workload_ms`.
    #[serde(default)]
    pub cmd: Option<String>,
}

/// A validated graph file: the frozen graph plus everything needed to run it.
#[derive(Debug, Clone)]
pub struct GraphFile {
    pub mode: ScheduleMode,
    pub scheduler: SchedulerConfig,
    pub graph: DependencyGraph,
    /// Shell commands keyed by node id.
    pub commands: HashMap<NodeId, String>,
}
