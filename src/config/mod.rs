// src/config/mod.rs

//! Graph file loading and validation.
//!
//! - [`model`] defines the TOML-backed data model.
//! - [`loader`] reads a graph file from disk.
//! - [`validate`] turns a raw file into a frozen [`crate::dag::DependencyGraph`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_graph_path, load_and_validate, load_from_path, load_from_str};
pub use model::{GraphFile, NodeConfig, RawGraphFile, SchedulerSection};
