// src/errors.rs

//! Crate-wide error type.

use std::time::Duration;

use thiserror::Error;

use crate::dag::NodeId;

#[derive(Error, Debug)]
pub enum FlowdagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Duplicate node: '{0}' is already part of the graph")]
    DuplicateNode(NodeId),

    #[error("Unknown prerequisite: node '{node}' depends on missing node '{prerequisite}'")]
    UnknownPrerequisite { node: NodeId, prerequisite: NodeId },

    #[error("Cyclic dependency detected involving node '{0}'")]
    CyclicDependency(NodeId),

    #[error("Node '{0}' must have a positive workload")]
    NonPositiveWorkload(NodeId),

    #[error("Graph is frozen; cannot add node '{0}'")]
    GraphFrozen(NodeId),

    #[error("Graph is unusable after a failed finalize: {0}")]
    GraphUnusable(String),

    #[error("Graph has not been finalized")]
    NotFinalized,

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Completion signal of node '{0}' arrived twice")]
    DoubleArrival(NodeId),

    #[error("Node '{node}' timed out after {after:?} waiting for prerequisite '{prerequisite}'")]
    Timeout {
        node: NodeId,
        prerequisite: NodeId,
        after: Duration,
    },

    #[error("Workload of node '{node}' failed: {reason}")]
    WorkloadFailed { node: NodeId, reason: String },

    #[error("Completion signal of node '{0}' was dropped while awaited")]
    SignalClosed(NodeId),

    #[error("Worker pool closed: {0}")]
    PoolClosed(#[from] tokio::sync::AcquireError),

    #[error("Node task failed to join: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure reported by a [`crate::exec::Workload`].
#[derive(Error, Debug)]
pub enum WorkloadError {
    #[error("command exited with status {0}")]
    ExitStatus(i32),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Message(String),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FlowdagError>;
