// src/engine/pool.rs

//! Worker pool sizing for parallel runs.
//!
//! A node task claims its slot before it waits for its prerequisites and
//! keeps it until it ends, exactly like a blocked worker thread. If every
//! slot is held by a node whose prerequisites have not been claimed yet, the
//! run can never make progress. The floor computed here rules that out.

use tracing::{debug, warn};

use crate::dag::{DependencyGraph, NodeId};
use crate::engine::SchedulerConfig;
use crate::errors::Result;
use crate::types::LaunchOrder;

/// Resolved pool layout for one parallel run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolPlan {
    /// Slots the run will actually use.
    pub slots: usize,
    /// Smallest slot count that is starvation-free for `launch_order` and
    /// lets every antichain run at once. `None` when the requested size
    /// already covers every node, since no floor can exceed the node count.
    pub floor: Option<usize>,
    /// Only computed together with `floor`.
    pub antichain_width: Option<usize>,
    /// Order in which node tasks claim slots.
    pub launch_order: Vec<NodeId>,
}

/// Order in which node tasks claim their slots.
pub fn launch_order(graph: &DependencyGraph, order: LaunchOrder) -> Result<Vec<NodeId>> {
    match order {
        LaunchOrder::Topological => Ok(graph.topological_order()?.to_vec()),
        LaunchOrder::Declaration => {
            // Validates that the graph is finalized.
            graph.topological_order()?;
            Ok(graph.nodes().map(|n| n.id.clone()).collect())
        }
    }
}

/// Minimum number of slots that guarantees progress when slots are claimed
/// in `order`.
///
/// A claimed node "settles" once all its prerequisites have settled; such a
/// node eventually finishes and frees its slot. Claimed nodes that have not
/// settled are parked. Before each claim there must be a free slot beyond
/// the parked ones.
pub fn min_slots_for_order(graph: &DependencyGraph, order: &[NodeId]) -> Result<usize> {
    if order.is_empty() {
        return Ok(0);
    }

    let n = graph.len();
    let mut claimed = vec![false; n];
    let mut settles = vec![false; n];
    let mut claimed_count = 0usize;
    let mut settled_count = 0usize;
    let mut needed = 1usize;

    for id in order {
        needed = needed.max(claimed_count - settled_count + 1);

        let i = graph.position(id)?;
        if claimed[i] {
            continue;
        }
        claimed[i] = true;
        claimed_count += 1;

        let mut stack: Vec<&str> = vec![id.as_str()];
        while let Some(current) = stack.pop() {
            let c = graph.position(current)?;
            if settles[c] || !claimed[c] {
                continue;
            }

            let mut ready = true;
            for prerequisite in graph.prerequisites_of(current)? {
                if !settles[graph.position(prerequisite)?] {
                    ready = false;
                    break;
                }
            }

            if ready {
                settles[c] = true;
                settled_count += 1;
                stack.extend(graph.dependents_of(current)?.iter().map(String::as_str));
            }
        }
    }

    Ok(needed)
}

/// Decide how many slots a parallel run gets.
///
/// Defaults to one slot per node. A configured size below the floor is
/// raised to the floor unless `allow_undersized_pool` is set. The floor is
/// only computed for sizes below the node count.
pub fn plan_pool(graph: &DependencyGraph, config: &SchedulerConfig) -> Result<PoolPlan> {
    let launch_order = launch_order(graph, config.launch_order)?;
    let requested = config.pool_size.unwrap_or(graph.len()).max(1);

    if requested >= graph.len() {
        debug!(
            slots = requested,
            launch_order = ?config.launch_order,
            "worker pool planned; one slot per node available"
        );
        return Ok(PoolPlan {
            slots: requested,
            floor: None,
            antichain_width: None,
            launch_order,
        });
    }

    let antichain_width = graph.max_antichain_width()?;
    let floor = antichain_width.max(min_slots_for_order(graph, &launch_order)?);

    let slots = if requested >= floor {
        requested
    } else if config.allow_undersized_pool {
        warn!(
            requested,
            floor,
            "pool is below the starvation-free floor; the run may never finish"
        );
        requested
    } else {
        warn!(requested, floor, "raising pool size to the starvation-free floor");
        floor
    };

    debug!(
        slots,
        floor,
        antichain_width,
        launch_order = ?config.launch_order,
        "worker pool planned"
    );

    Ok(PoolPlan {
        slots,
        floor: Some(floor),
        antichain_width: Some(antichain_width),
        launch_order,
    })
}
