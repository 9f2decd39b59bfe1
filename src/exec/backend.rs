// src/exec/backend.rs

//! Pluggable workload abstraction.
//!
//! The scheduler never interprets what a node does; it hands the node to a
//! [`Workload`] and measures how long the returned future takes.
//!
//! - [`SleepWorkload`] sleeps for the node's declared workload.
//! - [`super::CommandWorkload`] runs a shell command per node.
//! - Tests can provide their own implementation that records invocations or
//!   fails selected nodes.

use std::future::Future;
use std::pin::Pin;

use crate::dag::WorkNode;
use crate::errors::WorkloadError;

/// Boxed future returned by [`Workload::run`].
pub type WorkloadFuture<'a> =
    Pin<Box<dyn Future<Output = std::result::Result<(), WorkloadError>> + Send + 'a>>;

/// Trait abstracting what "running a node" means.
///
/// Implementations are shared between all node tasks of a run, so they must
/// be `Send + Sync`.
pub trait Workload: Send + Sync {
    fn run<'a>(&'a self, node: &'a WorkNode) -> WorkloadFuture<'a>;
}

/// Sleep for exactly the declared workload of each node.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepWorkload;

impl Workload for SleepWorkload {
    fn run<'a>(&'a self, node: &'a WorkNode) -> WorkloadFuture<'a> {
        Box::pin(async move {
            tokio::time::sleep(node.workload).await;
            Ok(())
        })
    }
}
