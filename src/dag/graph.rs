// src/dag/graph.rs

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;
use std::time::Duration;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::dag::node::{NodeId, WorkNode};
use crate::dag::width;
use crate::errors::{FlowdagError, Result};

/// Derived structure computed by [`DependencyGraph::finalize`].
#[derive(Debug, Clone)]
struct Topology {
    /// Topological order, ties broken by insertion order.
    order: Vec<NodeId>,
    /// Direct dependents, indexed by insertion position.
    dependents: Vec<Vec<NodeId>>,
    /// Antichain width, computed the first time somebody asks for it.
    width: OnceLock<usize>,
}

#[derive(Debug, Clone)]
enum GraphState {
    Building,
    Frozen(Topology),
    /// A previous `finalize()` failed; the message is the original error.
    Poisoned(String),
}

/// A DAG of [`WorkNode`]s keyed by id.
///
/// Nodes are added with [`add_node`](Self::add_node) (forward references are
/// allowed) and the graph is validated once by [`finalize`](Self::finalize).
/// After a successful finalize the graph is frozen and can be scheduled any
/// number of times; after a failed one it is unusable.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: Vec<WorkNode>,
    index: HashMap<NodeId, usize>,
    state: GraphState,
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            state: GraphState::Building,
        }
    }

    /// Add a node. Prerequisites are only checked by [`finalize`](Self::finalize).
    ///
    /// The workload must be non-zero.
    pub fn add_node<I, P>(&mut self, id: I, workload: Duration, prerequisites: P) -> Result<()>
    where
        I: Into<NodeId>,
        P: IntoIterator,
        P::Item: Into<NodeId>,
    {
        let id = id.into();

        match &self.state {
            GraphState::Building => {}
            GraphState::Frozen(_) => return Err(FlowdagError::GraphFrozen(id)),
            GraphState::Poisoned(reason) => {
                return Err(FlowdagError::GraphUnusable(reason.clone()));
            }
        }

        if self.index.contains_key(&id) {
            return Err(FlowdagError::DuplicateNode(id));
        }
        if workload.is_zero() {
            return Err(FlowdagError::NonPositiveWorkload(id));
        }

        let prerequisites = prerequisites.into_iter().map(Into::into).collect();
        let node = WorkNode::new(id.clone(), workload, prerequisites);

        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Validate references and acyclicity, then freeze the graph.
    ///
    /// Calling this on an already frozen graph is a no-op.
    pub fn finalize(&mut self) -> Result<()> {
        match &self.state {
            GraphState::Frozen(_) => return Ok(()),
            GraphState::Poisoned(reason) => {
                return Err(FlowdagError::GraphUnusable(reason.clone()));
            }
            GraphState::Building => {}
        }

        match self.build_topology() {
            Ok(topology) => {
                debug!(
                    nodes = self.nodes.len(),
                    order = ?topology.order,
                    "dependency graph finalized"
                );
                self.state = GraphState::Frozen(topology);
                Ok(())
            }
            Err(err) => {
                self.state = GraphState::Poisoned(err.to_string());
                Err(err)
            }
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, GraphState::Frozen(_))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&WorkNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &WorkNode> {
        self.nodes.iter()
    }

    /// Nodes without prerequisites, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &WorkNode> {
        self.nodes.iter().filter(|n| n.is_root())
    }

    pub fn topological_order(&self) -> Result<&[NodeId]> {
        Ok(self.topology()?.order.as_slice())
    }

    pub fn prerequisites_of(&self, id: &str) -> Result<&[NodeId]> {
        self.topology()?;
        let i = self.position(id)?;
        Ok(self.nodes[i].prerequisites.as_slice())
    }

    pub fn dependents_of(&self, id: &str) -> Result<&[NodeId]> {
        let topology = self.topology()?;
        let i = self.position(id)?;
        Ok(topology.dependents[i].as_slice())
    }

    /// Number of prerequisites a node waits for at the start of a run.
    pub fn in_degree(&self, id: &str) -> Result<usize> {
        Ok(self.prerequisites_of(id)?.len())
    }

    /// Size of the largest set of nodes with no dependency path between any
    /// two of them.
    pub fn max_antichain_width(&self) -> Result<usize> {
        let topology = self.topology()?;
        Ok(*topology
            .width
            .get_or_init(|| self.compute_width(topology)))
    }

    /// Insertion position of a node.
    pub(crate) fn position(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| FlowdagError::NodeNotFound(id.to_string()))
    }

    fn topology(&self) -> Result<&Topology> {
        match &self.state {
            GraphState::Frozen(topology) => Ok(topology),
            GraphState::Building => Err(FlowdagError::NotFinalized),
            GraphState::Poisoned(reason) => Err(FlowdagError::GraphUnusable(reason.clone())),
        }
    }

    fn build_topology(&self) -> Result<Topology> {
        let n = self.nodes.len();

        for node in &self.nodes {
            for prerequisite in &node.prerequisites {
                if prerequisite == &node.id {
                    return Err(FlowdagError::CyclicDependency(node.id.clone()));
                }
                if !self.index.contains_key(prerequisite) {
                    return Err(FlowdagError::UnknownPrerequisite {
                        node: node.id.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                }
            }
        }

        // Edge direction: prerequisite -> dependent.
        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(n, n);
        let handles: Vec<NodeIndex> = (0..n).map(|i| graph.add_node(i)).collect();
        let mut dependents: Vec<Vec<NodeId>> = vec![Vec::new(); n];

        for (i, node) in self.nodes.iter().enumerate() {
            for prerequisite in &node.prerequisites {
                let p = self.index[prerequisite];
                graph.add_edge(handles[p], handles[i], ());
                dependents[p].push(node.id.clone());
            }
        }

        // A topological sort will fail if there is a cycle.
        if let Err(cycle) = toposort(&graph, None) {
            let i = graph[cycle.node_id()];
            return Err(FlowdagError::CyclicDependency(self.nodes[i].id.clone()));
        }

        // Kahn's algorithm over insertion positions so that ties resolve
        // deterministically to the node declared first.
        let mut remaining: Vec<usize> = self.nodes.iter().map(|n| n.prerequisites.len()).collect();
        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| remaining[i] == 0).collect();
        let mut order = Vec::with_capacity(n);

        while let Some(i) = ready.pop_first() {
            order.push(self.nodes[i].id.clone());
            for dependent in &dependents[i] {
                let d = self.index[dependent];
                remaining[d] -= 1;
                if remaining[d] == 0 {
                    ready.insert(d);
                }
            }
        }

        Ok(Topology {
            order,
            dependents,
            width: OnceLock::new(),
        })
    }

    fn compute_width(&self, topology: &Topology) -> usize {
        let order: Vec<usize> = topology.order.iter().map(|id| self.index[id]).collect();
        let dependents: Vec<Vec<usize>> = topology
            .dependents
            .iter()
            .map(|ids| ids.iter().map(|id| self.index[id]).collect())
            .collect();

        let width = width::antichain_width(&order, &dependents);
        debug!(nodes = order.len(), width, "antichain width computed");
        width
    }
}
