use std::time::Duration;

use flowdag::config::{GraphFile, NodeConfig, RawGraphFile, SchedulerSection};
use flowdag::dag::DependencyGraph;
use flowdag::types::{FailurePolicy, LaunchOrder};

/// Fluent wrapper around [`DependencyGraph`] that panics on invalid input.
pub struct GraphBuilder {
    graph: DependencyGraph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: DependencyGraph::new(),
        }
    }

    pub fn node(mut self, id: &str, workload_ms: u64, after: &[&str]) -> Self {
        self.graph
            .add_node(id, Duration::from_millis(workload_ms), after.iter().copied())
            .expect("Failed to add node in builder");
        self
    }

    /// Finalize and return the frozen graph.
    pub fn build(mut self) -> DependencyGraph {
        self.graph
            .finalize()
            .expect("Failed to finalize graph from builder");
        self.graph
    }

    /// Return the graph without finalizing it.
    pub fn build_unfinalized(self) -> DependencyGraph {
        self.graph
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The seven node data-flow diagram, every node costing `unit_ms`:
///
/// ```text
///     A       B
///    / \    / | \
///   C   D  E   F
///       |
///       G
/// ```
///
/// Total work is `7 * unit_ms`, the critical path `A -> D -> G` is
/// `3 * unit_ms`.
pub fn reference_graph(unit_ms: u64) -> DependencyGraph {
    GraphBuilder::new()
        .node("A", unit_ms, &[])
        .node("B", unit_ms, &[])
        .node("C", unit_ms, &["A"])
        .node("D", unit_ms, &["A", "B"])
        .node("E", unit_ms, &["B"])
        .node("F", unit_ms, &["B"])
        .node("G", unit_ms, &["D"])
        .build()
}

/// Same shape as [`reference_graph`] but declared dependents first, so
/// declaration order is the worst possible slot-claim order.
pub fn reference_graph_dependents_first(unit_ms: u64) -> DependencyGraph {
    GraphBuilder::new()
        .node("G", unit_ms, &["D"])
        .node("D", unit_ms, &["A", "B"])
        .node("C", unit_ms, &["A"])
        .node("E", unit_ms, &["B"])
        .node("F", unit_ms, &["B"])
        .node("A", unit_ms, &[])
        .node("B", unit_ms, &[])
        .build()
}

/// `n0 -> n1 -> ... -> n{len-1}`.
pub fn chain_graph(len: usize, unit_ms: u64) -> DependencyGraph {
    let mut builder = GraphBuilder::new();
    for i in 0..len {
        let id = format!("n{i}");
        builder = if i == 0 {
            builder.node(&id, unit_ms, &[])
        } else {
            builder.node(&id, unit_ms, &[format!("n{}", i - 1).as_str()])
        };
    }
    builder.build()
}

/// Builder for `GraphFile` to simplify config test setup.
pub struct GraphFileBuilder {
    raw: RawGraphFile,
}

impl GraphFileBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawGraphFile {
                scheduler: SchedulerSection::default(),
                node: Vec::new(),
            },
        }
    }

    pub fn with_node(mut self, node: NodeConfig) -> Self {
        self.raw.node.push(node);
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.raw.scheduler.pool_size = Some(pool_size);
        self
    }

    pub fn with_launch_order(mut self, order: LaunchOrder) -> Self {
        self.raw.scheduler.launch_order = order;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.raw.scheduler.failure_policy = policy;
        self
    }

    pub fn with_node_timeout_ms(mut self, ms: u64) -> Self {
        self.raw.scheduler.node_timeout_ms = Some(ms);
        self
    }

    pub fn raw(self) -> RawGraphFile {
        self.raw
    }

    pub fn build(self) -> GraphFile {
        GraphFile::try_from(self.raw).expect("Failed to build valid graph file from builder")
    }
}

impl Default for GraphFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `NodeConfig`.
pub struct NodeConfigBuilder {
    node: NodeConfig,
}

impl NodeConfigBuilder {
    pub fn new(id: &str, workload_ms: u64) -> Self {
        Self {
            node: NodeConfig {
                id: id.to_string(),
                workload_ms,
                after: vec![],
                cmd: None,
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.node.after.push(dep.to_string());
        self
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.node.cmd = Some(cmd.to_string());
        self
    }

    pub fn build(self) -> NodeConfig {
        self.node
    }
}
