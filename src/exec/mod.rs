// src/exec/mod.rs

//! Workload execution layer.
//!
//! - [`backend`] defines the [`Workload`] trait and the sleep-based default.
//! - [`command`] runs per-node shell commands via `tokio::process::Command`.

pub mod backend;
pub mod command;

pub use backend::{SleepWorkload, Workload, WorkloadFuture};
pub use command::CommandWorkload;
