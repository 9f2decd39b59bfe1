// src/engine/mod.rs

//! Scheduling engine.
//!
//! - [`scheduler`] holds the [`Scheduler`] and its configuration.
//! - [`parallel`] runs one task per node, gated by completion signals.
//! - [`sequential`] runs nodes one at a time in topological order.
//! - [`pool`] sizes the worker pool so parallel runs cannot starve.
//! - [`report`] describes what happened to every node in a run.

pub mod parallel;
pub mod pool;
pub mod report;
pub mod scheduler;
pub mod sequential;

pub use pool::{PoolPlan, launch_order, min_slots_for_order, plan_pool};
pub use report::{FailureReason, NodeRecord, NodeStatus, RunReport};
pub use scheduler::{Scheduler, SchedulerConfig};
pub use crate::types::{ExecutionMode, FailurePolicy, LaunchOrder};
