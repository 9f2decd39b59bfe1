// src/dag/mod.rs

//! DAG representation.
//!
//! - [`node`] holds the plain-data [`WorkNode`].
//! - [`graph`] owns the nodes, validates them once and answers ordering
//!   queries (topological order, adjacency, antichain width).
//! - `width` computes the antichain width of a frozen graph.

pub mod graph;
pub mod node;
mod width;

pub use graph::DependencyGraph;
pub use node::{NodeId, WorkNode};
