// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{GraphFile, RawGraphFile};
use crate::errors::Result;

/// Load a graph file from a given path and return the raw `RawGraphFile`.
///
/// This only performs TOML deserialization; it does **not** build or
/// validate the graph. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawGraphFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    load_from_str(&contents)
}

/// Parse a graph file from TOML text.
pub fn load_from_str(contents: &str) -> Result<RawGraphFile> {
    let raw: RawGraphFile = toml::from_str(contents)?;
    Ok(raw)
}

/// Load a graph file and turn it into a frozen, validated [`GraphFile`].
///
/// Checks, in order: at least one node, sane `[scheduler]` values, positive
/// workloads, duplicate ids, unknown prerequisites, self-dependencies and
/// cycles. Any failure aborts before a node could run.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<GraphFile> {
    let raw = load_from_path(path)?;
    GraphFile::try_from(raw)
}

/// Graph file used when `--graph` is not given.
pub fn default_graph_path() -> PathBuf {
    PathBuf::from("Flowdag.toml")
}
