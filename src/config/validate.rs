// src/config/validate.rs

use std::collections::HashMap;
use std::time::Duration;

use crate::config::model::{GraphFile, RawGraphFile};
use crate::dag::DependencyGraph;
use crate::engine::SchedulerConfig;
use crate::errors::{FlowdagError, Result};

impl TryFrom<RawGraphFile> for GraphFile {
    type Error = FlowdagError;

    fn try_from(raw: RawGraphFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let mut graph = DependencyGraph::new();
        let mut commands = HashMap::new();

        for node in raw.node {
            graph.add_node(
                node.id.clone(),
                Duration::from_millis(node.workload_ms),
                node.after,
            )?;
            if let Some(cmd) = node.cmd {
                commands.insert(node.id, cmd);
            }
        }

        // Reference, self-dependency and cycle checks.
        graph.finalize()?;

        let section = raw.scheduler;
        let scheduler = SchedulerConfig {
            pool_size: section.pool_size,
            allow_undersized_pool: section.allow_undersized_pool,
            launch_order: section.launch_order,
            failure_policy: section.failure_policy,
            node_timeout: section.node_timeout_ms.map(Duration::from_millis),
        };

        Ok(GraphFile {
            mode: section.mode,
            scheduler,
            graph,
            commands,
        })
    }
}

fn validate_raw_config(cfg: &RawGraphFile) -> Result<()> {
    ensure_has_nodes(cfg)?;
    validate_scheduler_section(cfg)?;
    validate_workloads(cfg)?;
    Ok(())
}

fn ensure_has_nodes(cfg: &RawGraphFile) -> Result<()> {
    if cfg.node.is_empty() {
        return Err(FlowdagError::ConfigError(
            "graph file must contain at least one [[node]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_scheduler_section(cfg: &RawGraphFile) -> Result<()> {
    if cfg.scheduler.pool_size == Some(0) {
        return Err(FlowdagError::ConfigError(
            "[scheduler].pool_size must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.scheduler.node_timeout_ms == Some(0) {
        return Err(FlowdagError::ConfigError(
            "[scheduler].node_timeout_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_workloads(cfg: &RawGraphFile) -> Result<()> {
    for node in &cfg.node {
        if node.id.trim().is_empty() {
            return Err(FlowdagError::ConfigError(
                "node ids must not be empty".to_string(),
            ));
        }
        if node.workload_ms == 0 {
            return Err(FlowdagError::ConfigError(format!(
                "node '{}' must have a positive workload_ms",
                node.id
            )));
        }
    }
    Ok(())
}
